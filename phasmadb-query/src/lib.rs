//! The client-side query language: build a [`Select`] tree with plaintext
//! column names and values, then [`compile_select`] it against a table's
//! [`Schema`] and a [`Keyring`] into the hashed, encoded [`WireFilter`] the
//! server accepts (spec §4.2, §4.7).

mod cell;
mod compile;
mod error;
mod schema;
mod select;

pub use cell::Cell;
pub use compile::{compile_select, compile_sort, encode_row};
pub use error::QueryError;
pub use phasmadb_crypto::{Keyring, TextMode};
pub use schema::Schema;
pub use select::{and, not, or, Column, Operand, Select};

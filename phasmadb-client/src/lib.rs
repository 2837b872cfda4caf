//! The PhasmaDB session client: handshake, a strictly-ordered one-at-a-time
//! command queue, and typed operations built on `phasmadb-query` and
//! `phasmadb-crypto` (spec §4.1-§4.7).
//!
//! Callers own their [`phasmadb_crypto::Keyring`] and [`phasmadb_query::Schema`]
//! per table; this crate never persists either, so losing the keyring means
//! losing access to everything stored under it, same as the server-side
//! story in `phasmadb-crypto`.

mod client;
mod connection;
mod error;
mod frame;
mod row;

pub use client::Client;
pub use connection::Connection;
pub use error::{ClientError, Result};
pub use row::{DecodedValue, Row};

pub use phasmadb_crypto::Keyring;
pub use phasmadb_query::{and, not, or, Cell, Column, Schema, Select};

//! Client-side cryptography for PhasmaDB (spec §4.1, §4.3, §4.5, §4.6, §8).
//!
//! Nothing in this crate talks to a socket; it only turns plaintext names,
//! integers and payloads into the hashed/encoded/encrypted forms the wire
//! protocol carries, and back. `phasmadb-query` uses it to compile queries,
//! `phasmadb-client` uses it to prepare commands and decode responses, and
//! `phasmadb-server` uses the RSA half of [`auth`] (never the keyring — the
//! server never sees a user's AES key, OPE key or salt).

pub mod auth;
mod envelope;
mod error;
mod keyring;
mod name_hash;
mod ope;
mod text;

pub use error::{CryptoError, Result};
pub use keyring::Keyring;
pub use name_hash::hash_name;
pub use ope::{decode as ope_decode, encode as ope_encode, CIPHERTEXT_MAX, PLAINTEXT_MAX};
pub use text::{encode_text_cell, prefixes, words, TextMode};

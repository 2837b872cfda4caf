//! The client keyring: the AES envelope key, the OPE key and the name salt
//! a single user needs to talk to PhasmaDB (spec §4.1).
//!
//! The keyring is the only client-side secret besides the RSA identity used
//! for authentication (see [`crate::auth`]); losing it means every indexed
//! value and every encrypted payload the user has ever stored becomes
//! unrecoverable, since nothing server-side can reconstruct it.

use crate::envelope;
use crate::error::Result;
use crate::name_hash::hash_name;
use crate::ope;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Self-describing, versioned on-disk/on-wire form of a [`Keyring`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct KeyringFile {
	version: u8,
	cipher_key: String,
	ope_key: String,
	name_salt: String,
}

const CURRENT_VERSION: u8 = 1;

/// A user's key material: one AES-256 key for payload envelopes, one HMAC
/// key driving order-preserving encoding, and one salt for name hashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyring {
	pub cipher_key: [u8; 32],
	pub ope_key: [u8; 32],
	pub name_salt: [u8; 32],
}

impl Keyring {
	/// Generate a fresh keyring with random key material.
	pub fn create() -> Self {
		let mut cipher_key = [0u8; 32];
		let mut ope_key = [0u8; 32];
		let mut name_salt = [0u8; 32];
		let mut rng = rand::thread_rng();
		rng.fill_bytes(&mut cipher_key);
		rng.fill_bytes(&mut ope_key);
		rng.fill_bytes(&mut name_salt);
		Keyring { cipher_key, ope_key, name_salt }
	}

	/// Serialize to the self-describing JSON form used for on-disk storage.
	pub fn to_json(&self) -> Result<String> {
		let file = KeyringFile {
			version: CURRENT_VERSION,
			cipher_key: hex::encode(self.cipher_key),
			ope_key: hex::encode(self.ope_key),
			name_salt: hex::encode(self.name_salt),
		};
		Ok(serde_json::to_string_pretty(&file)?)
	}

	/// Parse the JSON form produced by [`Keyring::to_json`].
	pub fn from_json(json: &str) -> Result<Self> {
		let file: KeyringFile = serde_json::from_str(json)?;
		Ok(Keyring {
			cipher_key: decode_hex_32(&file.cipher_key)?,
			ope_key: decode_hex_32(&file.ope_key)?,
			name_salt: decode_hex_32(&file.name_salt)?,
		})
	}

	/// Hash `name` with this keyring's salt (spec §4.5).
	pub fn hash_name(&self, name: &str) -> String {
		hash_name(&self.name_salt, name)
	}

	/// Order-preserving encode an integer cell (spec §4.1).
	pub fn ope_encode(&self, value: u64) -> Result<u64> {
		Ok(ope::encode(&self.ope_key, value)?)
	}

	/// Order-preserving decode a stored integer cell.
	pub fn ope_decode(&self, value: u64) -> Result<u64> {
		Ok(ope::decode(&self.ope_key, value)?)
	}

	/// Seal an opaque payload into its envelope.
	pub fn seal(&self, plaintext: &[u8]) -> String {
		envelope::seal(&self.cipher_key, plaintext)
	}

	/// Open an envelope produced by [`Keyring::seal`].
	pub fn open(&self, sealed: &str) -> Result<Vec<u8>> {
		envelope::open(&self.cipher_key, sealed)
	}
}

fn decode_hex_32(s: &str) -> Result<[u8; 32]> {
	let bytes = hex::decode(s)
		.map_err(|_| crate::error::CryptoError::InvalidKeyMaterial("not valid hex".into()))?;
	bytes
		.try_into()
		.map_err(|_| crate::error::CryptoError::InvalidKeyMaterial("expected 32 bytes".into()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trips_through_json() {
		let keyring = Keyring::create();
		let json = keyring.to_json().unwrap();
		let parsed = Keyring::from_json(&json).unwrap();
		assert_eq!(keyring, parsed);
	}

	#[test]
	fn distinct_keyrings_have_distinct_keys() {
		assert_ne!(Keyring::create(), Keyring::create());
	}

	#[test]
	fn wraps_name_hash_and_ope() {
		let keyring = Keyring::create();
		assert_eq!(keyring.hash_name("officers").len(), 64);
		let c = keyring.ope_encode(42).unwrap();
		assert_eq!(keyring.ope_decode(c).unwrap(), 42);
	}

	#[test]
	fn wraps_envelope() {
		let keyring = Keyring::create();
		let sealed = keyring.seal(b"payload");
		assert_eq!(keyring.open(&sealed).unwrap(), b"payload");
	}

	#[test]
	fn rejects_malformed_hex() {
		let bad = r#"{"version":1,"cipher_key":"zz","ope_key":"00","name_salt":"00"}"#;
		assert!(Keyring::from_json(bad).is_err());
	}
}

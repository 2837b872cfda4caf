//! RSA identity and challenge-response authentication (spec §4.3, §4.6).
//!
//! Each user has an RSA keypair: the public half lives on the server as
//! `public_keys/<username>.pem`, the private half stays with the client.
//! Login is a single PKCS#1 v1.5 round trip: the server draws a random
//! nonce, encrypts it to the user's public key as the challenge, and the
//! session advances to `AuthedIdle` only if the client's response decrypts
//! back to that same nonce under the matching private key.

use crate::error::{CryptoError, Result};
use pkcs1::{DecodeRsaPublicKey, EncodeRsaPublicKey, LineEnding};
use pkcs8::{DecodePrivateKey, EncodePrivateKey};
use rand::rngs::OsRng;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};

/// Nonces are 64 random bytes (spec §4.3).
pub const CHALLENGE_LEN: usize = 64;

/// Generate a fresh RSA keypair for a new user (spec §4.6's `new_user` flow).
pub fn generate_keypair(bits: usize) -> Result<(RsaPrivateKey, RsaPublicKey)> {
	let private_key = RsaPrivateKey::new(&mut OsRng, bits)
		.map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
	let public_key = RsaPublicKey::from(&private_key);
	Ok((private_key, public_key))
}

/// PEM-encode a private key for on-disk storage (PKCS#8).
pub fn private_key_to_pem(key: &RsaPrivateKey) -> Result<String> {
	key.to_pkcs8_pem(LineEnding::LF)
		.map(|s| s.to_string())
		.map_err(|e| CryptoError::InvalidKey(e.to_string()))
}

/// Parse a PKCS#8 PEM private key.
pub fn private_key_from_pem(pem: &str) -> Result<RsaPrivateKey> {
	RsaPrivateKey::from_pkcs8_pem(pem).map_err(|e| CryptoError::InvalidKey(e.to_string()))
}

/// PEM-encode a public key for `public_keys/<username>.pem` (PKCS#1, matching
/// the format the original `new_user` tool wrote).
pub fn public_key_to_pem(key: &RsaPublicKey) -> Result<String> {
	key.to_pkcs1_pem(LineEnding::LF).map_err(|e| CryptoError::InvalidKey(e.to_string()))
}

/// Parse a PKCS#1 PEM public key.
pub fn public_key_from_pem(pem: &str) -> Result<RsaPublicKey> {
	RsaPublicKey::from_pkcs1_pem(pem).map_err(|e| CryptoError::InvalidKey(e.to_string()))
}

/// Draw a fresh random challenge nonce.
pub fn random_nonce() -> [u8; CHALLENGE_LEN] {
	use rand::RngCore;
	let mut nonce = [0u8; CHALLENGE_LEN];
	rand::thread_rng().fill_bytes(&mut nonce);
	nonce
}

/// Server side: encrypt `nonce` to the user's public key, hex-framed for the
/// wire (spec §4.3's `challenge` field).
pub fn encrypt_challenge(public_key: &RsaPublicKey, nonce: &[u8]) -> Result<String> {
	let ciphertext = public_key
		.encrypt(&mut OsRng, Pkcs1v15Encrypt, nonce)
		.map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
	Ok(hex::encode(ciphertext))
}

/// Client side: decrypt a hex-framed challenge with the private key.
pub fn decrypt_challenge(private_key: &RsaPrivateKey, challenge: &str) -> Result<Vec<u8>> {
	let ciphertext = hex::decode(challenge).map_err(|_| CryptoError::InvalidKeyMaterial("challenge is not valid hex".into()))?;
	private_key
		.decrypt(Pkcs1v15Encrypt, &ciphertext)
		.map_err(|e| CryptoError::InvalidKey(e.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn challenge_round_trips() {
		let (private_key, public_key) = generate_keypair(2048).unwrap();
		let nonce = random_nonce();
		let challenge = encrypt_challenge(&public_key, &nonce).unwrap();
		let recovered = decrypt_challenge(&private_key, &challenge).unwrap();
		assert_eq!(recovered, nonce);
	}

	#[test]
	fn wrong_key_fails_to_recover_nonce() {
		let (_, public_key) = generate_keypair(2048).unwrap();
		let (other_private_key, _) = generate_keypair(2048).unwrap();
		let nonce = random_nonce();
		let challenge = encrypt_challenge(&public_key, &nonce).unwrap();
		assert!(decrypt_challenge(&other_private_key, &challenge).is_err());
	}

	#[test]
	fn keys_round_trip_through_pem() {
		let (private_key, public_key) = generate_keypair(2048).unwrap();
		let private_pem = private_key_to_pem(&private_key).unwrap();
		let public_pem = public_key_to_pem(&public_key).unwrap();
		assert!(private_pem.contains("PRIVATE KEY"));
		assert!(public_pem.contains("RSA PUBLIC KEY"));
		let parsed_private = private_key_from_pem(&private_pem).unwrap();
		let parsed_public = public_key_from_pem(&public_pem).unwrap();
		assert_eq!(parsed_private.to_public_key(), public_key);
		assert_eq!(parsed_public, public_key);
	}
}

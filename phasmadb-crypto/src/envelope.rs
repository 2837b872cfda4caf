//! The payload envelope: AES-256-CBC with ANSI X9.23 padding and a random
//! per-message IV (spec §4.1).
//!
//! Every encrypted payload on the wire is `base64(iv || ciphertext)`, where
//! `iv` is 16 random bytes generated fresh for each call to [`seal`]. ANSI
//! X9.23 padding (zero bytes followed by a final length byte) is what the
//! original implementation used, so it's kept here rather than switching to
//! the more common PKCS#7 scheme.

use crate::error::{CryptoError, Result};
use aes::Aes256;
use base64::{engine::general_purpose::STANDARD, Engine};
use cbc::cipher::block_padding::AnsiX923;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

const IV_LEN: usize = 16;

/// Encrypt `plaintext` under `key` (32 bytes) with a fresh random IV,
/// returning the base64-framed envelope.
pub fn seal(key: &[u8; 32], plaintext: &[u8]) -> String {
	let mut iv = [0u8; IV_LEN];
	rand::thread_rng().fill_bytes(&mut iv);
	let ciphertext = Aes256CbcEnc::new(key.into(), &iv.into())
		.encrypt_padded_vec_mut::<AnsiX923>(plaintext);
	let mut framed = Vec::with_capacity(IV_LEN + ciphertext.len());
	framed.extend_from_slice(&iv);
	framed.extend_from_slice(&ciphertext);
	STANDARD.encode(framed)
}

/// Decrypt a base64-framed envelope produced by [`seal`].
pub fn open(key: &[u8; 32], envelope: &str) -> Result<Vec<u8>> {
	let framed = STANDARD.decode(envelope)?;
	if framed.len() < IV_LEN {
		return Err(CryptoError::Truncated);
	}
	let (iv, ciphertext) = framed.split_at(IV_LEN);
	if ciphertext.len() % 16 != 0 {
		return Err(CryptoError::Unaligned);
	}
	let iv: [u8; IV_LEN] = iv.try_into().expect("split_at guarantees the length");
	Aes256CbcDec::new(key.into(), &iv.into())
		.decrypt_padded_vec_mut::<AnsiX923>(ciphertext)
		.map_err(|_| CryptoError::BadPadding)
}

//! Errors internal to the crypto layer.
//!
//! These never cross the wire directly; callers in `phasmadb-server` and
//! `phasmadb-client` map them onto `phasmadb_protocol::ErrorCode` (usually
//! `Malformed`) at the session boundary.

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
	#[error("keyring file is not valid JSON: {0}")]
	InvalidKeyring(#[from] serde_json::Error),
	#[error("keyring key material is malformed: {0}")]
	InvalidKeyMaterial(String),
	#[error("ciphertext is not valid base64: {0}")]
	InvalidBase64(#[from] base64::DecodeError),
	#[error("ciphertext is shorter than one IV block")]
	Truncated,
	#[error("ciphertext length is not a multiple of the block size")]
	Unaligned,
	#[error("padding is malformed or was tampered with")]
	BadPadding,
	#[error("integer {0} is outside the order-preserving plaintext domain")]
	OutOfDomain(u64),
	#[error("ciphertext {0} is outside the order-preserving ciphertext range")]
	OutOfRange(u64),
	#[error("RSA key material is malformed: {0}")]
	InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;

//! Domain-separated name hashing (spec §4.1, §4.5).
//!
//! Column names, table names and plain text index values are all hashed the
//! same way: SHA3-256 over the UTF-8 bytes of the name followed by the
//! keyring's per-user salt, hex-encoded. Salting means two users with the
//! same table name, or the same indexed word, get unrelated hashes on the
//! backing store.

use sha3::{Digest, Sha3_256};

/// Hash `name` with `salt`, producing the lowercase hex digest carried on
/// the wire and used as a backing-store key component.
pub fn hash_name(salt: &[u8], name: &str) -> String {
	let mut hasher = Sha3_256::new();
	hasher.update(name.as_bytes());
	hasher.update(salt);
	hex::encode(hasher.finalize())
}

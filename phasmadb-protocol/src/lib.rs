//! Wire types shared by PhasmaDB clients and servers.
//!
//! This crate has no I/O and no cryptography: it only knows how to encode
//! and decode the JSON shapes the session protocol carries (spec §4.2,
//! §4.4, §6). Name hashing, order-preserving encoding and the payload
//! envelope live in `phasmadb-crypto`.

mod command;
mod error;
mod filter;
mod index_type;
mod value;

pub use command::{
	err, farewell, insert_results, ok, ok_with, with_cmd_id, Command, QueryEnvelope, RowPayload,
	SortDirection,
};
pub use error::{ErrorCode, UnknownErrorCode};
pub use filter::{GroupType, LeafOp, WireFilter};
pub use index_type::IndexType;
pub use value::IndexValue;

/// Usernames and index-name components must match `[0-9A-Za-z_]+` (spec §3, §4.5).
pub fn is_valid_username(s: &str) -> bool {
	!s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Declared index/column short-name components must match `[0-9a-z_]+` (spec §4.5).
pub fn is_valid_index_name(s: &str) -> bool {
	!s.is_empty() && s.chars().all(|c| (c.is_ascii_lowercase() || c.is_ascii_digit()) || c == '_')
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn username_validation() {
		assert!(is_valid_username("alice_42"));
		assert!(!is_valid_username(""));
		assert!(!is_valid_username("al ice"));
		assert!(!is_valid_username("alice-42"));
	}

	#[test]
	fn index_name_validation() {
		assert!(is_valid_index_name("officer_rank"));
		assert!(!is_valid_index_name("Officer"));
		assert!(!is_valid_index_name(""));
	}
}

//! The indexed-cell value sum type (spec §3, design note in §9).

use serde::{Deserialize, Serialize};

/// An indexed column's wire value: an order-preserving-encoded integer, a
/// single name-hash (plain/`eq` text), or a token set (`text` list).
///
/// `serde(untagged)` is what the wire actually carries — a bare JSON number,
/// string, or array of strings — but the type itself is a proper tagged Rust
/// enum, so mismatches are caught by pattern matching rather than by probing
/// a `serde_json::Value` at every call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexValue {
	/// `sort`/`unique` column value, already order-preserving-encoded.
	Int(u64),
	/// `text`/`unique_text` single-token value (a name-hash, hex-encoded).
	Text(String),
	/// `text`/`unique_text` multi-token value (a set of name-hashes).
	TextList(Vec<String>),
}

impl IndexValue {
	/// True if this value could satisfy a `sort`/`unique` column.
	pub fn is_int(&self) -> bool {
		matches!(self, IndexValue::Int(_))
	}

	/// True if this value could satisfy a `text`/`unique_text` column.
	pub fn is_text_like(&self) -> bool {
		matches!(self, IndexValue::Text(_) | IndexValue::TextList(_))
	}

	/// The token set this value represents, for `text`/`unique_text` columns.
	/// A single token is treated as a one-element set.
	pub fn tokens(&self) -> Option<Vec<&str>> {
		match self {
			IndexValue::Text(t) => Some(vec![t.as_str()]),
			IndexValue::TextList(ts) => Some(ts.iter().map(String::as_str).collect()),
			IndexValue::Int(_) => None,
		}
	}
}

//! Plaintext indexed cell values supplied at insert time (spec §3, §4.1).

use phasmadb_crypto::TextMode;

/// One column's plaintext value for a single row, before encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
	Int(u64),
	Text(TextMode, String),
}

impl Cell {
	pub fn int(value: u64) -> Self {
		Cell::Int(value)
	}

	/// A whole-value text cell (matches `eq`/`neq` and unique-text storage).
	pub fn plain_text(value: impl Into<String>) -> Self {
		Cell::Text(TextMode::Plain, value.into())
	}

	/// A prefix-tokenized text cell (matches `text` queries against any
	/// non-empty prefix of the stored value).
	pub fn prefix_text(value: impl Into<String>) -> Self {
		Cell::Text(TextMode::Prefix, value.into())
	}

	/// A word-tokenized text cell (matches `text` queries against any
	/// `[0-9A-Za-z]+` run in the stored value).
	pub fn word_text(value: impl Into<String>) -> Self {
		Cell::Text(TextMode::Word, value.into())
	}
}

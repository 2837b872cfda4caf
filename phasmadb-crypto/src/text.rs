//! Text tokenization for `text`/`unique_text` indexed columns (spec §4.1, §4.5).
//!
//! A text column can be indexed three ways:
//! - plain: the whole string is hashed as one name.
//! - prefix: every non-empty prefix is hashed, so `lt("w")`-style `text`
//!   queries against a stored value can match by prefix.
//! - word: the string is split into maximal runs of `[0-9A-Za-z]` and each
//!   run is hashed independently, so a query can match on any contained
//!   word regardless of position.
//!
//! `unique_text` columns are always plain-mode: uniqueness is only
//! meaningful against the whole value.

use crate::name_hash::hash_name;

/// How a text-typed cell's value is broken into the name hashes actually
/// stored on the backing collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMode {
	Plain,
	Prefix,
	Word,
}

impl TextMode {
	pub fn as_str(self) -> &'static str {
		match self {
			TextMode::Plain => "plain",
			TextMode::Prefix => "prefix",
			TextMode::Word => "word",
		}
	}

	pub fn from_str(s: &str) -> Option<Self> {
		match s {
			"plain" => Some(TextMode::Plain),
			"prefix" => Some(TextMode::Prefix),
			"word" => Some(TextMode::Word),
			_ => None,
		}
	}
}

/// Every non-empty prefix of `s`, shortest first, by character (not byte).
pub fn prefixes(s: &str) -> Vec<&str> {
	let mut out = Vec::new();
	for (i, _) in s.char_indices().skip(1) {
		out.push(&s[..i]);
	}
	if !s.is_empty() {
		out.push(s);
	}
	out
}

/// Every maximal run of ASCII alphanumerics in `s`.
pub fn words(s: &str) -> Vec<&str> {
	let mut out = Vec::new();
	let mut start: Option<usize> = None;
	for (i, c) in s.char_indices() {
		if c.is_ascii_alphanumeric() {
			start.get_or_insert(i);
		} else if let Some(from) = start.take() {
			out.push(&s[from..i]);
		}
	}
	if let Some(from) = start {
		out.push(&s[from..]);
	}
	out
}

/// Hash `value` under `mode`, producing every name hash that should be
/// stored on the backing collection for this cell.
pub fn encode_text_cell(salt: &[u8], mode: TextMode, value: &str) -> Vec<String> {
	match mode {
		TextMode::Plain => vec![hash_name(salt, value)],
		TextMode::Prefix => prefixes(value).into_iter().map(|p| hash_name(salt, p)).collect(),
		TextMode::Word => words(value).into_iter().map(|w| hash_name(salt, w)).collect(),
	}
}

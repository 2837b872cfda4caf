//! Decoding a row the server returned back into plaintext column names and
//! an opened payload (spec §3, §4.7). Indexed text values stay as token
//! hashes — `hash_name` is one-way, so a `text`/`unique_text` column's
//! stored value can be matched against but never recovered in the clear.

use crate::error::{ClientError, Result};
use phasmadb_crypto::Keyring;
use phasmadb_protocol::IndexValue;
use phasmadb_query::Schema;
use std::collections::BTreeMap;

/// One indexed column's decoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedValue {
	Int(u64),
	TextHash(String),
	TextHashes(Vec<String>),
}

/// A fully decoded row: plaintext column names, decoded indexed values, and
/// the opened `extra` payload.
#[derive(Debug, Clone)]
pub struct Row {
	pub row_id: String,
	pub indexed: BTreeMap<String, DecodedValue>,
	pub extra: Vec<u8>,
}

/// Invert `schema`'s plaintext column names through `keyring.hash_name` so a
/// server-returned `indexed` map (keyed by hashed column) can be read back
/// under its plaintext name.
pub(crate) fn reverse_schema(schema: &Schema, keyring: &Keyring) -> BTreeMap<String, String> {
	schema.keys().map(|column| (keyring.hash_name(column), column.clone())).collect()
}

pub(crate) fn decode_row(
	row_id: &str,
	row_json: &serde_json::Value,
	schema: &Schema,
	keyring: &Keyring,
) -> Result<Row> {
	let reverse = reverse_schema(schema, keyring);
	let raw_indexed: BTreeMap<String, IndexValue> =
		serde_json::from_value(row_json.get("indexed").cloned().unwrap_or_default())
			.map_err(|e| ClientError::Protocol(format!("bad indexed map: {e}")))?;
	let mut indexed = BTreeMap::new();
	for (hashed_column, value) in raw_indexed {
		let column = reverse.get(&hashed_column).cloned().unwrap_or(hashed_column);
		let decoded = match value {
			IndexValue::Int(v) => DecodedValue::Int(keyring.ope_decode(v)?),
			IndexValue::Text(h) => DecodedValue::TextHash(h),
			IndexValue::TextList(hs) => DecodedValue::TextHashes(hs),
		};
		indexed.insert(column, decoded);
	}
	let sealed = row_json
		.get("extra")
		.and_then(serde_json::Value::as_str)
		.ok_or_else(|| ClientError::Protocol("row is missing extra payload".into()))?;
	let extra = keyring.open(sealed)?;
	Ok(Row { row_id: row_id.to_string(), indexed, extra })
}

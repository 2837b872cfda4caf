//! Command and response envelopes (spec §4.4, §6).

use crate::error::ErrorCode;
use crate::value::IndexValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Sort direction for a `(hashed_column, direction)` sort key (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
	Asc,
	Desc,
}

/// A row's indexed cells plus its opaque encrypted payload (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowPayload {
	pub indexed: BTreeMap<String, IndexValue>,
	pub extra: String,
}

/// The `query` field of a `query_data` command (spec §4.2, §4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryEnvelope {
	/// The wire predicate, in the shape `WireFilter::to_json` produces.
	pub filter: Value,
	#[serde(default)]
	pub sort: Vec<(String, SortDirection)>,
	#[serde(default)]
	pub limit: Option<u64>,
}

/// A decoded client command (spec §4.4's dispatch table).
///
/// `cmd_id` passthrough (spec §4.3) is handled above this layer: the session
/// reads the raw JSON object, pulls `cmd_id` out if present, deserializes the
/// remainder into `Command`, and re-attaches `cmd_id` to the outgoing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
	CreateTable {
		name: String,
		indices: BTreeMap<String, String>,
	},
	InsertData {
		table: String,
		data: BTreeMap<String, RowPayload>,
	},
	QueryById {
		table: String,
		row_id: String,
	},
	QueryData {
		table: String,
		query: QueryEnvelope,
	},
	DeleteById {
		table: String,
		row_id: String,
	},
	DeleteData {
		table: String,
		filter: Value,
	},
	DropTable {
		table: String,
	},
	Exit,
}

/// Build `{"success": true}`.
pub fn ok() -> Value {
	serde_json::json!({"success": true})
}

/// Build `{"success": true, <key>: <value>}`.
pub fn ok_with(key: &str, value: Value) -> Value {
	let mut map = serde_json::Map::new();
	map.insert("success".to_string(), Value::Bool(true));
	map.insert(key.to_string(), value);
	Value::Object(map)
}

/// Build `{"success": false, "error": <code>}`.
pub fn err(code: ErrorCode) -> Value {
	serde_json::json!({"success": false, "error": code.code()})
}

/// Build the per-datum result map for `insert_data` (spec §4.4).
pub fn insert_results(results: BTreeMap<String, Result<(), ErrorCode>>) -> Value {
	let map: serde_json::Map<String, Value> = results
		.into_iter()
		.map(|(row_id, result)| {
			let value = match result {
				Ok(()) => serde_json::json!({"success": true}),
				Err(code) => serde_json::json!({"success": false, "error": code.code()}),
			};
			(row_id, value)
		})
		.collect();
	serde_json::json!({"results": Value::Object(map)})
}

/// The `exit` command's farewell response.
pub fn farewell() -> Value {
	serde_json::json!({"farewell": true})
}

/// Re-attach a client-supplied `cmd_id` to an outgoing response, if present.
pub fn with_cmd_id(mut response: Value, cmd_id: Option<Value>) -> Value {
	if let (Some(id), Value::Object(map)) = (cmd_id, &mut response) {
		map.insert("cmd_id".to_string(), id);
	}
	response
}

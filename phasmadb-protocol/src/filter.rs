//! The boolean predicate's wire form (spec §4.2, §4.7, design note §9).
//!
//! The wire encoding discriminates group-vs-leaf nodes by which single key a
//! JSON object carries (`and`/`or`/`not_and`/`not_or` for groups, anything
//! else for a leaf naming a hashed column). That shape doesn't map onto a
//! `#[serde(tag = "...")]` enum, so `WireFilter` converts to and from
//! `serde_json::Value` explicitly instead of deriving `Serialize`/`Deserialize`.

use crate::{error::ErrorCode, value::IndexValue};
use serde_json::{Map, Value};

/// Boolean combinator applied to a group's children (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupType {
	And,
	Or,
	NotAnd,
	NotOr,
}

impl GroupType {
	pub fn as_str(self) -> &'static str {
		match self {
			GroupType::And => "and",
			GroupType::Or => "or",
			GroupType::NotAnd => "not_and",
			GroupType::NotOr => "not_or",
		}
	}

	pub fn from_str(s: &str) -> Option<Self> {
		match s {
			"and" => Some(GroupType::And),
			"or" => Some(GroupType::Or),
			"not_and" => Some(GroupType::NotAnd),
			"not_or" => Some(GroupType::NotOr),
			_ => None,
		}
	}

	/// Flip `X` to `not_X` and vice versa, as negation of a group (spec §4.2).
	pub fn negate(self) -> Self {
		match self {
			GroupType::And => GroupType::NotAnd,
			GroupType::NotAnd => GroupType::And,
			GroupType::Or => GroupType::NotOr,
			GroupType::NotOr => GroupType::Or,
		}
	}
}

/// A leaf's comparison operator (spec §4.2, §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafOp {
	Eq,
	Neq,
	Lt,
	Lte,
	Gt,
	Gte,
	Text,
}

impl LeafOp {
	pub fn as_str(self) -> &'static str {
		match self {
			LeafOp::Eq => "eq",
			LeafOp::Neq => "neq",
			LeafOp::Lt => "lt",
			LeafOp::Lte => "lte",
			LeafOp::Gt => "gt",
			LeafOp::Gte => "gte",
			LeafOp::Text => "text",
		}
	}

	pub fn from_str(s: &str) -> Option<Self> {
		match s {
			"eq" => Some(LeafOp::Eq),
			"neq" => Some(LeafOp::Neq),
			"lt" => Some(LeafOp::Lt),
			"lte" => Some(LeafOp::Lte),
			"gt" => Some(LeafOp::Gt),
			"gte" => Some(LeafOp::Gte),
			"text" => Some(LeafOp::Text),
			_ => None,
		}
	}

	/// `text` requires a `text`/`unique_text` column; every other operator
	/// requires a `sort`/`unique` column (spec §4.7).
	pub fn is_text_op(self) -> bool {
		matches!(self, LeafOp::Text)
	}
}

/// A query predicate over hashed column names, in its wire shape.
#[derive(Debug, Clone, PartialEq)]
pub enum WireFilter {
	/// The distinguished sentinel that matches every row.
	SelectAll,
	/// `{node_type: [children...]}`.
	Group(GroupType, Vec<WireFilter>),
	/// `{hashed_column: {op: operand}}`.
	Leaf { column: String, op: LeafOp, operand: IndexValue },
}

impl WireFilter {
	/// Serialize to the JSON shape described in spec §4.2/§9.
	pub fn to_json(&self) -> Value {
		match self {
			WireFilter::SelectAll => Value::Object(Map::new()),
			WireFilter::Group(node_type, children) => {
				let mut map = Map::new();
				map.insert(
					node_type.as_str().to_string(),
					Value::Array(children.iter().map(WireFilter::to_json).collect()),
				);
				Value::Object(map)
			},
			WireFilter::Leaf { column, op, operand } => {
				let mut inner = Map::new();
				inner.insert(op.as_str().to_string(), serde_json::to_value(operand).unwrap());
				let mut outer = Map::new();
				outer.insert(column.clone(), Value::Object(inner));
				Value::Object(outer)
			},
		}
	}

	/// Parse the JSON shape described in spec §4.2/§9, rejecting anything
	/// that isn't a single-key object (spec §4.4, §9).
	pub fn from_json(value: &Value) -> Result<Self, ErrorCode> {
		let obj = value.as_object().ok_or(ErrorCode::Malformed)?;
		if obj.is_empty() {
			return Ok(WireFilter::SelectAll);
		}
		let mut iter = obj.iter();
		let (key, val) = iter.next().ok_or(ErrorCode::Malformed)?;
		if iter.next().is_some() {
			return Err(ErrorCode::Malformed);
		}

		if let Some(node_type) = GroupType::from_str(key) {
			let children = val.as_array().ok_or(ErrorCode::Malformed)?;
			let children = children
				.iter()
				.map(WireFilter::from_json)
				.collect::<Result<Vec<_>, _>>()?;
			return Ok(WireFilter::Group(node_type, children));
		}

		let op_obj = val.as_object().ok_or(ErrorCode::Malformed)?;
		let mut op_iter = op_obj.iter();
		let (op_key, operand_val) = op_iter.next().ok_or(ErrorCode::Malformed)?;
		if op_iter.next().is_some() {
			return Err(ErrorCode::Malformed);
		}
		let op = LeafOp::from_str(op_key).ok_or(ErrorCode::Malformed)?;
		let operand: IndexValue =
			serde_json::from_value(operand_val.clone()).map_err(|_| ErrorCode::Malformed)?;

		Ok(WireFilter::Leaf { column: key.clone(), op, operand })
	}
}

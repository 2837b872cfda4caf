//! Server-side compilation of a wire filter/sort spec into a [`store::Filter`]
//! (spec §4.7).

use crate::error::ServerError;
use crate::store::Filter;
use phasmadb_protocol::{ErrorCode, IndexType, SortDirection, WireFilter};
use serde_json::Value;
use std::collections::BTreeMap;

/// Compile a raw `filter` JSON value against `indices` (spec §4.7).
pub fn compile_filter(
	indices: &BTreeMap<String, IndexType>,
	filter: &Value,
) -> Result<Filter, ServerError> {
	let wire = WireFilter::from_json(filter).map_err(|e| malformed(e))?;
	compile_wire(indices, &wire)
}

fn compile_wire(indices: &BTreeMap<String, IndexType>, wire: &WireFilter) -> Result<Filter, ServerError> {
	match wire {
		WireFilter::SelectAll => Ok(Filter::All),
		WireFilter::Group(group, children) => {
			let children =
				children.iter().map(|c| compile_wire(indices, c)).collect::<Result<Vec<_>, _>>()?;
			Ok(Filter::Group(*group, children))
		},
		WireFilter::Leaf { column, op, operand } => {
			if column.starts_with('$') {
				return Err(ServerError::Malformed("column names may not start with '$'".into()));
			}
			let index_type =
				indices.get(column).ok_or_else(|| ServerError::ExtraIndexedColumns(column.clone()))?;
			let compatible = if op.is_text_op() { index_type.is_text() } else { index_type.is_numeric() };
			if !compatible {
				return Err(ServerError::OperandTypeMismatch(column.clone()));
			}
			Ok(Filter::Leaf { field: column.clone(), op: *op, operand: operand.clone() })
		},
	}
}

/// Compile a `sort` list against `indices` (spec §4.7's "Sort compilation";
/// expansion note on applying the `$`-prefix rejection here too).
pub fn compile_sort(
	indices: &BTreeMap<String, IndexType>,
	sort: &[(String, SortDirection)],
) -> Result<Vec<(String, SortDirection)>, ServerError> {
	sort.iter()
		.map(|(column, direction)| {
			if column.starts_with('$') {
				return Err(ServerError::Malformed("column names may not start with '$'".into()));
			}
			let index_type =
				indices.get(column).ok_or_else(|| ServerError::ExtraIndexedColumns(column.clone()))?;
			if !index_type.is_numeric() {
				return Err(ServerError::OperandTypeMismatch(column.clone()));
			}
			Ok((column.clone(), *direction))
		})
		.collect()
}

fn malformed(_code: ErrorCode) -> ServerError {
	ServerError::Malformed("filter is not a valid predicate".into())
}

#[cfg(test)]
mod tests {
	use super::*;
	use phasmadb_protocol::IndexValue;

	fn indices() -> BTreeMap<String, IndexType> {
		let mut m = BTreeMap::new();
		m.insert("aa".to_string(), IndexType::Sort);
		m.insert("bb".to_string(), IndexType::Text);
		m
	}

	#[test]
	fn compiles_select_all() {
		assert_eq!(compile_filter(&indices(), &serde_json::json!({})).unwrap(), Filter::All);
	}

	#[test]
	fn rejects_undeclared_column() {
		let filter = serde_json::json!({"zz": {"eq": 1}});
		assert_eq!(
			compile_filter(&indices(), &filter),
			Err(ServerError::ExtraIndexedColumns("zz".into()))
		);
	}

	#[test]
	fn rejects_dollar_prefix() {
		let filter = serde_json::json!({"$zz": {"eq": 1}});
		assert!(matches!(compile_filter(&indices(), &filter), Err(ServerError::Malformed(_))));
	}

	#[test]
	fn rejects_mismatched_operator() {
		let filter = serde_json::json!({"bb": {"gt": 1}});
		assert_eq!(
			compile_filter(&indices(), &filter),
			Err(ServerError::OperandTypeMismatch("bb".into()))
		);
	}

	#[test]
	fn compiles_leaf() {
		let filter = serde_json::json!({"aa": {"gte": 5}});
		assert_eq!(
			compile_filter(&indices(), &filter).unwrap(),
			Filter::Leaf {
				field: "aa".into(),
				op: phasmadb_protocol::LeafOp::Gte,
				operand: IndexValue::Int(5)
			}
		);
	}

	#[test]
	fn sort_rejects_text_column() {
		let sort = vec![("bb".to_string(), SortDirection::Asc)];
		assert_eq!(compile_sort(&indices(), &sort), Err(ServerError::OperandTypeMismatch("bb".into())));
	}

	#[test]
	fn sort_rejects_unknown_column() {
		let sort = vec![("zz".to_string(), SortDirection::Asc)];
		assert_eq!(compile_sort(&indices(), &sort), Err(ServerError::ExtraIndexedColumns("zz".into())));
	}
}

//! Compiling the client-side AST into the wire shapes the server accepts
//! (spec §4.2, §4.7).

use crate::cell::Cell;
use crate::error::QueryError;
use crate::schema::{self, Schema};
use crate::select::{Operand, Select};
use phasmadb_crypto::{Keyring, TextMode};
use phasmadb_protocol::{IndexType, IndexValue, RowPayload, SortDirection, WireFilter};
use std::collections::BTreeMap;

/// Compile a [`Select`] tree into the [`WireFilter`] the `query_data` and
/// `delete_data` commands carry, validating every leaf's column and
/// operator/index-type compatibility along the way (spec §4.7).
pub fn compile_select(
	schema: &Schema,
	keyring: &Keyring,
	select: &Select,
) -> Result<WireFilter, QueryError> {
	match select {
		Select::All => Ok(WireFilter::SelectAll),
		Select::Group(group, children) => {
			let children = children
				.iter()
				.map(|child| compile_select(schema, keyring, child))
				.collect::<Result<Vec<_>, _>>()?;
			Ok(WireFilter::Group(*group, children))
		},
		Select::Leaf { column, op, operand } => {
			let index_type = schema::lookup(schema, column)?;
			let operand = compile_operand(index_type, column, keyring, operand)?;
			Ok(WireFilter::Leaf { column: keyring.hash_name(column), op: *op, operand })
		},
	}
}

fn compile_operand(
	index_type: &IndexType,
	column: &str,
	keyring: &Keyring,
	operand: &Operand,
) -> Result<IndexValue, QueryError> {
	match operand {
		Operand::Int(value) => {
			if !index_type.is_numeric() {
				return Err(QueryError::OperandTypeMismatch(column.to_string()));
			}
			let encoded = keyring
				.ope_encode(*value)
				.map_err(|_| QueryError::OperandTypeMismatch(column.to_string()))?;
			Ok(IndexValue::Int(encoded))
		},
		Operand::Token(mode, value) => {
			if !index_type.is_text() {
				return Err(QueryError::OperandTypeMismatch(column.to_string()));
			}
			Ok(single_token_value(keyring, *mode, value))
		},
	}
}

/// A leaf's operand is always one token to match, even under `Prefix`/`Word`
/// mode: the query asks "does the stored token set contain this token",
/// which is itself just a plain name hash of the one value supplied.
fn single_token_value(keyring: &Keyring, mode: TextMode, value: &str) -> IndexValue {
	let _ = mode;
	IndexValue::Text(keyring.hash_name(value))
}

/// Compile a sort specification, rejecting `$`-prefixed and non-numeric
/// columns (spec §4.7's "Sort compilation").
pub fn compile_sort(
	schema: &Schema,
	keyring: &Keyring,
	sort: &[(String, SortDirection)],
) -> Result<Vec<(String, SortDirection)>, QueryError> {
	sort.iter()
		.map(|(column, direction)| {
			let index_type = schema::lookup(schema, column)?;
			if !index_type.is_numeric() {
				return Err(QueryError::OperandTypeMismatch(column.clone()));
			}
			Ok((keyring.hash_name(column), *direction))
		})
		.collect()
}

/// Encode a row's plaintext indexed cells and opaque payload into the
/// [`RowPayload`] an `insert_data` command carries (spec §3, §4.1).
///
/// Every column declared `unique`/`unique_text` in `schema` must be present
/// in `cells`, or upsert-driven column inheritance on the server can never
/// be satisfied for a first insert of that row id.
pub fn encode_row(
	schema: &Schema,
	keyring: &Keyring,
	cells: &BTreeMap<String, Cell>,
	extra: &[u8],
) -> Result<RowPayload, QueryError> {
	let mut indexed = BTreeMap::new();
	for (column, cell) in cells {
		let index_type = schema::lookup(schema, column)?;
		let value = encode_cell(keyring, *index_type, column, cell)?;
		indexed.insert(keyring.hash_name(column), value);
	}
	Ok(RowPayload { indexed, extra: keyring.seal(extra) })
}

fn encode_cell(
	keyring: &Keyring,
	index_type: IndexType,
	column: &str,
	cell: &Cell,
) -> Result<IndexValue, QueryError> {
	match cell {
		Cell::Int(value) => {
			if !index_type.is_numeric() {
				return Err(QueryError::OperandTypeMismatch(column.to_string()));
			}
			let encoded = keyring
				.ope_encode(*value)
				.map_err(|_| QueryError::OperandTypeMismatch(column.to_string()))?;
			Ok(IndexValue::Int(encoded))
		},
		Cell::Text(mode, value) => {
			if !index_type.is_text() {
				return Err(QueryError::OperandTypeMismatch(column.to_string()));
			}
			let hashes = phasmadb_crypto::encode_text_cell(&keyring.name_salt, *mode, value);
			Ok(match hashes.len() {
				1 => IndexValue::Text(hashes.into_iter().next().expect("len checked")),
				_ => IndexValue::TextList(hashes),
			})
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::select::Column;
	use phasmadb_protocol::LeafOp;

	fn schema() -> Schema {
		let mut schema = Schema::new();
		schema.insert("rank".into(), IndexType::Sort);
		schema.insert("callsign".into(), IndexType::UniqueText);
		schema
	}

	#[test]
	fn compiles_numeric_leaf() {
		let keyring = Keyring::create();
		let select = Column::new("rank").gte(5);
		let compiled = compile_select(&schema(), &keyring, &select).unwrap();
		match compiled {
			WireFilter::Leaf { column, op, operand } => {
				assert_eq!(column, keyring.hash_name("rank"));
				assert_eq!(op, LeafOp::Gte);
				assert!(matches!(operand, IndexValue::Int(_)));
			},
			_ => panic!("expected a leaf"),
		}
	}

	#[test]
	fn rejects_unknown_column() {
		let keyring = Keyring::create();
		let select = Column::new("nope").eq(1);
		assert_eq!(
			compile_select(&schema(), &keyring, &select),
			Err(QueryError::UnknownColumn("nope".into()))
		);
	}

	#[test]
	fn rejects_dollar_prefixed_column() {
		let keyring = Keyring::create();
		let select = Column::new("$rank").eq(1);
		assert_eq!(compile_select(&schema(), &keyring, &select), Err(QueryError::ReservedPrefix));
	}

	#[test]
	fn rejects_numeric_op_on_text_column() {
		let keyring = Keyring::create();
		let select = Column::new("callsign").eq(1);
		assert_eq!(
			compile_select(&schema(), &keyring, &select),
			Err(QueryError::OperandTypeMismatch("callsign".into()))
		);
	}

	#[test]
	fn encodes_row_cells() {
		let keyring = Keyring::create();
		let mut cells = BTreeMap::new();
		cells.insert("rank".to_string(), Cell::int(7));
		cells.insert("callsign".to_string(), Cell::plain_text("Ghost Actual"));
		let row = encode_row(&schema(), &keyring, &cells, b"payload").unwrap();
		assert_eq!(row.indexed.len(), 2);
		assert_eq!(keyring.open(&row.extra).unwrap(), b"payload");
	}

	#[test]
	fn sort_keys_must_be_numeric() {
		let keyring = Keyring::create();
		let sort = vec![("callsign".to_string(), SortDirection::Asc)];
		assert_eq!(
			compile_sort(&schema(), &keyring, &sort),
			Err(QueryError::OperandTypeMismatch("callsign".into()))
		);
	}

	#[test]
	fn sort_keys_reject_dollar_prefix() {
		let keyring = Keyring::create();
		let sort = vec![("$rank".to_string(), SortDirection::Asc)];
		assert_eq!(compile_sort(&schema(), &keyring, &sort), Err(QueryError::ReservedPrefix));
	}
}

//! The client's view of a table's declared indices (spec §3, §4.5).
//!
//! A `Schema` is exactly the `indices` map a table was created with:
//! column name to index type. Both the row encoder and the query compiler
//! need it to know whether a column is integer- or text-shaped, and
//! whether it's unique.

use phasmadb_protocol::IndexType;
use std::collections::BTreeMap;

pub type Schema = BTreeMap<String, IndexType>;

use crate::error::QueryError;

/// Look up `column` in `schema`, rejecting the reserved `$` prefix and
/// undeclared columns (spec §4.2, §4.7).
pub fn lookup<'a>(schema: &'a Schema, column: &str) -> Result<&'a IndexType, QueryError> {
	if column.starts_with('$') {
		return Err(QueryError::ReservedPrefix);
	}
	schema.get(column).ok_or_else(|| QueryError::UnknownColumn(column.to_string()))
}

//! Internal server errors and their mapping onto wire error codes
//! (spec §4.8).

use phasmadb_protocol::ErrorCode;

#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum ServerError {
	#[error("no table named {0:?} exists for this user")]
	NoSuchTable(String),
	#[error("table {0:?} already exists for this user")]
	TableExists(String),
	#[error("row {0:?} was not found")]
	RowNotFound(String),
	#[error("column {0:?} must be unique within this table")]
	UniqueViolation(String),
	#[error("row is missing a value for indexed column {0:?}")]
	MissingIndexedColumns(String),
	#[error("row has a value for undeclared column {0:?}")]
	ExtraIndexedColumns(String),
	#[error("operator is not valid for column {0:?}'s index type")]
	OperandTypeMismatch(String),
	#[error("malformed command: {0}")]
	Malformed(String),
}

impl ServerError {
	/// Map to the wire error code the session writes back to the client.
	pub fn code(&self) -> ErrorCode {
		match self {
			ServerError::NoSuchTable(_) => ErrorCode::NoSuchTable,
			ServerError::TableExists(_) => ErrorCode::TableExists,
			ServerError::RowNotFound(_) => ErrorCode::RowNotFound,
			ServerError::UniqueViolation(_) => ErrorCode::UniqueViolation,
			ServerError::MissingIndexedColumns(_) => ErrorCode::MissingIndexedColumns,
			ServerError::ExtraIndexedColumns(_) => ErrorCode::ExtraIndexedColumns,
			ServerError::OperandTypeMismatch(_) => ErrorCode::OperandTypeMismatch,
			ServerError::Malformed(_) => ErrorCode::Malformed,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn maps_to_expected_wire_codes() {
		assert_eq!(ServerError::NoSuchTable("t".into()).code(), ErrorCode::NoSuchTable);
		assert_eq!(ServerError::UniqueViolation("c".into()).code(), ErrorCode::UniqueViolation);
	}
}

//! Errors raised while compiling a client-side query or row against a schema.

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueryError {
	#[error("column {0:?} is not declared on this table")]
	UnknownColumn(String),
	#[error("column names may not start with '$'")]
	ReservedPrefix,
	#[error("operator is not valid for column {0:?}'s index type")]
	OperandTypeMismatch(String),
	#[error("column {0:?} is required by its index type but missing from this row")]
	MissingColumn(String),
}

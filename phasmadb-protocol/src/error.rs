//! Wire error codes (spec §6) and the `thiserror`-derived code behind them.

use serde::{Deserialize, Serialize};

/// A wire error code as sent in `{"success": false, "error": <code>}`.
///
/// Every fallible server-internal error type in this workspace converts into
/// one of these via `From`/`code()`; the dispatcher never invents new codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(into = "u16", try_from = "u16")]
pub enum ErrorCode {
	/// `cmd` does not name a known command.
	#[error("unknown command")]
	UnknownCommand,
	/// Request was missing fields, had the wrong types, or violated a
	/// single-key-object constraint.
	#[error("malformed request")]
	Malformed,
	/// No public key is registered for the claimed username.
	#[error("no such user")]
	NoSuchUser,
	/// The handshake response did not match the challenge token.
	#[error("authentication failure")]
	AuthFailure,
	/// `(owner, hashed_name)` has no catalog entry.
	#[error("no such table")]
	NoSuchTable,
	/// `(owner, hashed_name)` already has a catalog entry.
	#[error("table already exists")]
	TableExists,
	/// No row matched for a delete-by-id or point query.
	#[error("row not found")]
	RowNotFound,
	/// A `unique`/`unique_text` column value collided with another row.
	#[error("unique value collision")]
	UniqueViolation,
	/// First insert of a `row_id` is missing a declared indexed column.
	#[error("row lacks required indexed values")]
	MissingIndexedColumns,
	/// `indexed` carries a column not declared on the table.
	#[error("row has undeclared indexed values")]
	ExtraIndexedColumns,
	/// A query operator is incompatible with the column's declared index type.
	#[error("operand incompatible with index type")]
	OperandTypeMismatch,
}

impl ErrorCode {
	/// The numeric wire code, per spec §6.
	pub const fn code(self) -> u16 {
		match self {
			ErrorCode::UnknownCommand => 1,
			ErrorCode::Malformed => 2,
			ErrorCode::NoSuchUser => 101,
			ErrorCode::AuthFailure => 102,
			ErrorCode::NoSuchTable => 201,
			ErrorCode::TableExists => 202,
			ErrorCode::RowNotFound => 301,
			ErrorCode::UniqueViolation => 302,
			ErrorCode::MissingIndexedColumns => 303,
			ErrorCode::ExtraIndexedColumns => 304,
			ErrorCode::OperandTypeMismatch => 305,
		}
	}
}

impl From<ErrorCode> for u16 {
	fn from(code: ErrorCode) -> u16 {
		code.code()
	}
}

impl TryFrom<u16> for ErrorCode {
	type Error = UnknownErrorCode;

	fn try_from(value: u16) -> Result<Self, Self::Error> {
		Ok(match value {
			1 => ErrorCode::UnknownCommand,
			2 => ErrorCode::Malformed,
			101 => ErrorCode::NoSuchUser,
			102 => ErrorCode::AuthFailure,
			201 => ErrorCode::NoSuchTable,
			202 => ErrorCode::TableExists,
			301 => ErrorCode::RowNotFound,
			302 => ErrorCode::UniqueViolation,
			303 => ErrorCode::MissingIndexedColumns,
			304 => ErrorCode::ExtraIndexedColumns,
			305 => ErrorCode::OperandTypeMismatch,
			other => return Err(UnknownErrorCode(other)),
		})
	}
}

/// A wire error code that doesn't correspond to any known `ErrorCode` variant.
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("unknown PhasmaDB error code: {0}")]
pub struct UnknownErrorCode(pub u16);

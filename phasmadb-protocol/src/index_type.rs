//! Index type declarations (spec §3).

use serde::{Deserialize, Serialize};

/// The four index types a table column may be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexType {
	/// Integer-valued, order-preserving, non-unique.
	Sort,
	/// Integer-valued, order-preserving, column-wise unique.
	Unique,
	/// String or token-set valued, non-unique.
	Text,
	/// String-valued, column-wise unique.
	UniqueText,
}

impl IndexType {
	/// Whether this index type accepts the `text` query operator and
	/// text-shaped indexed values.
	pub fn is_text(self) -> bool {
		matches!(self, IndexType::Text | IndexType::UniqueText)
	}

	/// Whether this index type accepts numeric comparison operators and
	/// integer-shaped indexed values.
	pub fn is_numeric(self) -> bool {
		matches!(self, IndexType::Sort | IndexType::Unique)
	}

	/// Whether the backing collection must enforce column-wise uniqueness.
	pub fn is_unique(self) -> bool {
		matches!(self, IndexType::Unique | IndexType::UniqueText)
	}
}

impl std::str::FromStr for IndexType {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"sort" => Ok(IndexType::Sort),
			"unique" => Ok(IndexType::Unique),
			"text" => Ok(IndexType::Text),
			"unique_text" => Ok(IndexType::UniqueText),
			_ => Err(()),
		}
	}
}

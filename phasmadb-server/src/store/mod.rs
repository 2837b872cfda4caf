//! The backing-store abstraction (spec §1, §6): an external key/value or
//! document store that PhasmaDB treats as an opaque collaborator. Nothing
//! above this module assumes any particular backing technology — only that
//! it can store a row keyed by `row_id`, enforce per-column uniqueness, and
//! answer filtered/sorted/limited queries over already-hashed/encoded
//! index values.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use phasmadb_protocol::{GroupType, IndexType, IndexValue, LeafOp, SortDirection};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One stored row: already-hashed/encoded indexed cells plus the opaque
/// encrypted payload. The server never sees plaintext here.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
	pub row_id: String,
	pub indexed: BTreeMap<String, IndexValue>,
	pub extra: String,
}

/// An index to create on a collection (spec §4.5's create-table step).
#[derive(Debug, Clone)]
pub struct IndexField {
	pub name: String,
	pub kind: IndexType,
}

/// A compiled predicate over a row's indexed cells (spec §4.7's "compiled
/// forms"). Distinct from [`phasmadb_protocol::WireFilter`]: by the time a
/// `Filter` exists, every column name is already hashed and every operand
/// is already encoded, and row-id lookups are a dedicated variant rather
/// than a leaf, since `row_id` isn't one of the row's indexed cells.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
	All,
	RowId(String),
	Group(GroupType, Vec<Filter>),
	Leaf { field: String, op: LeafOp, operand: IndexValue },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
	#[error("value for {0:?} collides with an existing row")]
	UniqueViolation(String),
	#[error("row not found")]
	NotFound,
}

/// One table's rows.
#[async_trait]
pub trait Collection: Send + Sync {
	/// Fetch a row by primary key.
	async fn get(&self, row_id: &str) -> Option<StoredRow>;
	/// The first row matching `filter`, in unspecified order. Used for
	/// unique-column conflict pre-checks.
	async fn find_one(&self, filter: &Filter) -> Option<StoredRow>;
	/// Every row matching `filter`, sorted and truncated to `limit`.
	async fn find(
		&self,
		filter: &Filter,
		sort: &[(String, SortDirection)],
		limit: Option<usize>,
	) -> Vec<StoredRow>;
	/// Insert a brand-new row, enforcing every unique index.
	async fn insert(&self, row: StoredRow) -> Result<(), StoreError>;
	/// Replace an existing row (or insert it if absent), enforcing every
	/// unique index against rows other than `row_id` itself.
	async fn replace(&self, row_id: &str, row: StoredRow) -> Result<(), StoreError>;
	/// Remove a row by primary key; `true` if a row was removed.
	async fn delete_one(&self, row_id: &str) -> bool;
	/// Remove every row matching `filter`; returns the count removed.
	async fn delete_many(&self, filter: &Filter) -> usize;
	/// Declare a secondary index (no-op for a store with no index structures
	/// of its own, but a uniqueness-tracking store must start enforcing it).
	async fn create_index(&self, field: IndexField, unique: bool) -> Result<(), StoreError>;
}

/// The keyspace of tables; one [`Collection`] per backing collection name.
pub trait Store: Send + Sync {
	fn collection(&self, name: &str) -> Arc<dyn Collection>;
	fn drop_collection(&self, name: &str);
}

/// Evaluate `filter` against `row` (spec §4.7's compiled predicate forms).
pub fn matches(row: &StoredRow, filter: &Filter) -> bool {
	match filter {
		Filter::All => true,
		Filter::RowId(id) => &row.row_id == id,
		Filter::Group(group, children) => match group {
			GroupType::And => children.iter().all(|c| matches(row, c)),
			GroupType::Or => children.iter().any(|c| matches(row, c)),
			GroupType::NotAnd => !children.iter().all(|c| matches(row, c)),
			GroupType::NotOr => !children.iter().any(|c| matches(row, c)),
		},
		Filter::Leaf { field, op, operand } => match row.indexed.get(field) {
			Some(stored) => leaf_matches(stored, *op, operand),
			None => false,
		},
	}
}

fn leaf_matches(stored: &IndexValue, op: LeafOp, operand: &IndexValue) -> bool {
	match op {
		LeafOp::Eq | LeafOp::Text => values_equal(stored, operand),
		LeafOp::Neq => !values_equal(stored, operand),
		LeafOp::Lt => numeric_cmp(stored, operand, |a, b| a < b),
		LeafOp::Lte => numeric_cmp(stored, operand, |a, b| a <= b),
		LeafOp::Gt => numeric_cmp(stored, operand, |a, b| a > b),
		LeafOp::Gte => numeric_cmp(stored, operand, |a, b| a >= b),
	}
}

fn values_equal(stored: &IndexValue, operand: &IndexValue) -> bool {
	match (stored, operand) {
		(IndexValue::Int(a), IndexValue::Int(b)) => a == b,
		(IndexValue::Text(a), IndexValue::Text(b)) => a == b,
		(IndexValue::TextList(list), IndexValue::Text(needle)) => list.contains(needle),
		(IndexValue::Text(value), IndexValue::TextList(needles)) => needles.iter().all(|n| n == value),
		(IndexValue::TextList(list), IndexValue::TextList(needles)) => {
			needles.iter().all(|n| list.contains(n))
		},
		_ => false,
	}
}

fn numeric_cmp(stored: &IndexValue, operand: &IndexValue, cmp: fn(u64, u64) -> bool) -> bool {
	match (stored, operand) {
		(IndexValue::Int(a), IndexValue::Int(b)) => cmp(*a, *b),
		_ => false,
	}
}

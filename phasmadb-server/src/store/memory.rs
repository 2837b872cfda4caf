//! In-process backing store, grounded in the same lock discipline as the
//! teacher's `HopDataPool`: a `parking_lot::RwLock`-guarded map, short-held
//! guards, nothing held across an `.await`.

use super::{matches, Collection, Filter, IndexField, Store, StoreError, StoredRow};
use async_trait::async_trait;
use parking_lot::RwLock;
use phasmadb_protocol::{IndexValue, SortDirection};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

/// Order two indexed cells. Sort columns are always numeric by the time a
/// table declares them (spec §4.7's compiler rejects `sort`/`unique` on
/// anything else), but this stays total over every `IndexValue` shape so a
/// stray text cell under a malformed sort key degrades to a stable
/// lexicographic order instead of panicking.
fn compare_indexed(a: Option<&IndexValue>, b: Option<&IndexValue>) -> Ordering {
	match (a, b) {
		(Some(IndexValue::Int(x)), Some(IndexValue::Int(y))) => x.cmp(y),
		(Some(IndexValue::Text(x)), Some(IndexValue::Text(y))) => x.cmp(y),
		(Some(IndexValue::TextList(x)), Some(IndexValue::TextList(y))) => x.cmp(y),
		(None, None) => Ordering::Equal,
		(None, Some(_)) => Ordering::Less,
		(Some(_), None) => Ordering::Greater,
		_ => Ordering::Equal,
	}
}

#[derive(Default)]
struct Table {
	rows: RwLock<HashMap<String, StoredRow>>,
	unique_fields: RwLock<Vec<String>>,
}

impl Table {
	fn conflicting_row(&self, row: &StoredRow, ignore_row_id: Option<&str>) -> Option<String> {
		let unique_fields = self.unique_fields.read();
		let rows = self.rows.read();
		for field in unique_fields.iter() {
			let Some(candidate) = row.indexed.get(field) else { continue };
			let collides = rows.values().any(|existing| {
				if Some(existing.row_id.as_str()) == ignore_row_id {
					return false;
				}
				existing.indexed.get(field) == Some(candidate)
			});
			if collides {
				return Some(field.clone());
			}
		}
		None
	}
}

#[async_trait]
impl Collection for Table {
	async fn get(&self, row_id: &str) -> Option<StoredRow> {
		self.rows.read().get(row_id).cloned()
	}

	async fn find_one(&self, filter: &Filter) -> Option<StoredRow> {
		self.rows.read().values().find(|row| matches(row, filter)).cloned()
	}

	async fn find(
		&self,
		filter: &Filter,
		sort: &[(String, SortDirection)],
		limit: Option<usize>,
	) -> Vec<StoredRow> {
		let mut found: Vec<StoredRow> =
			self.rows.read().values().filter(|row| matches(row, filter)).cloned().collect();
		for (field, direction) in sort.iter().rev() {
			found.sort_by(|a, b| {
				let ordering = compare_indexed(a.indexed.get(field), b.indexed.get(field));
				match direction {
					SortDirection::Asc => ordering,
					SortDirection::Desc => ordering.reverse(),
				}
			});
		}
		if let Some(limit) = limit {
			found.truncate(limit);
		}
		found
	}

	async fn insert(&self, row: StoredRow) -> Result<(), StoreError> {
		if let Some(field) = self.conflicting_row(&row, None) {
			return Err(StoreError::UniqueViolation(field));
		}
		self.rows.write().insert(row.row_id.clone(), row);
		Ok(())
	}

	async fn replace(&self, row_id: &str, row: StoredRow) -> Result<(), StoreError> {
		if let Some(field) = self.conflicting_row(&row, Some(row_id)) {
			return Err(StoreError::UniqueViolation(field));
		}
		self.rows.write().insert(row_id.to_string(), row);
		Ok(())
	}

	async fn delete_one(&self, row_id: &str) -> bool {
		self.rows.write().remove(row_id).is_some()
	}

	async fn delete_many(&self, filter: &Filter) -> usize {
		let to_remove: Vec<String> = {
			let rows = self.rows.read();
			rows.values().filter(|row| matches(row, filter)).map(|row| row.row_id.clone()).collect()
		};
		let mut rows = self.rows.write();
		for row_id in &to_remove {
			rows.remove(row_id);
		}
		to_remove.len()
	}

	async fn create_index(&self, field: IndexField, unique: bool) -> Result<(), StoreError> {
		tracing::debug!(target: "phasmadb::store", field = %field.name, kind = ?field.kind, unique, "index declared");
		if unique {
			self.unique_fields.write().push(field.name);
		}
		Ok(())
	}
}

/// An in-memory [`Store`]: every table is a [`Table`] behind an `Arc`, kept
/// in a single `RwLock<HashMap>` of collection name to table, exactly the
/// shape `HopDataPool` uses for its entry map.
#[derive(Default)]
pub struct MemoryStore {
	tables: RwLock<HashMap<String, Arc<Table>>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

impl Store for MemoryStore {
	fn collection(&self, name: &str) -> Arc<dyn Collection> {
		if let Some(table) = self.tables.read().get(name) {
			return table.clone();
		}
		let mut tables = self.tables.write();
		tables.entry(name.to_string()).or_insert_with(|| Arc::new(Table::default())).clone()
	}

	fn drop_collection(&self, name: &str) {
		self.tables.write().remove(name);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use phasmadb_protocol::IndexValue;
	use std::collections::BTreeMap;

	fn row(id: &str, rank: u64) -> StoredRow {
		let mut indexed = BTreeMap::new();
		indexed.insert("rank".to_string(), IndexValue::Int(rank));
		StoredRow { row_id: id.to_string(), indexed, extra: "x".into() }
	}

	#[tokio::test]
	async fn insert_then_get() {
		let store = MemoryStore::new();
		let table = store.collection("t");
		table.insert(row("r1", 5)).await.unwrap();
		assert_eq!(table.get("r1").await.unwrap().indexed["rank"], IndexValue::Int(5));
	}

	#[tokio::test]
	async fn unique_violation_on_insert() {
		let store = MemoryStore::new();
		let table = store.collection("t");
		table
			.create_index(IndexField { name: "rank".into(), kind: phasmadb_protocol::IndexType::Unique }, true)
			.await
			.unwrap();
		table.insert(row("r1", 5)).await.unwrap();
		let result = table.insert(row("r2", 5)).await;
		assert_eq!(result, Err(StoreError::UniqueViolation("rank".into())));
	}

	#[tokio::test]
	async fn replace_ignores_self_collision() {
		let store = MemoryStore::new();
		let table = store.collection("t");
		table
			.create_index(IndexField { name: "rank".into(), kind: phasmadb_protocol::IndexType::Unique }, true)
			.await
			.unwrap();
		table.insert(row("r1", 5)).await.unwrap();
		table.replace("r1", row("r1", 5)).await.unwrap();
	}

	#[tokio::test]
	async fn delete_many_removes_matches() {
		let store = MemoryStore::new();
		let table = store.collection("t");
		table.insert(row("r1", 5)).await.unwrap();
		table.insert(row("r2", 9)).await.unwrap();
		let filter = Filter::Leaf {
			field: "rank".into(),
			op: phasmadb_protocol::LeafOp::Gte,
			operand: IndexValue::Int(6),
		};
		assert_eq!(table.delete_many(&filter).await, 1);
		assert!(table.get("r1").await.is_some());
		assert!(table.get("r2").await.is_none());
	}

	#[tokio::test]
	async fn dropping_a_collection_discards_its_rows() {
		let store = MemoryStore::new();
		store.collection("t").insert(row("r1", 1)).await.unwrap();
		store.drop_collection("t");
		let fresh = store.collection("t");
		assert!(fresh.get("r1").await.is_none());
	}
}

//! Row-store semantics: upsert-with-inheritance insert, per-column
//! uniqueness pre-checks, and query/delete execution (spec §4.6, §4.7).

use crate::catalog::TableMeta;
use crate::error::ServerError;
use crate::store::{Collection, Filter, StoreError, StoredRow};
use futures::future::join_all;
use phasmadb_protocol::{IndexType, IndexValue, RowPayload, SortDirection};
use std::collections::BTreeMap;

/// Insert or upsert every datum in `data` concurrently against one catalog
/// snapshot (spec §4.6; expansion note on per-datum concurrency via
/// `futures::future::join_all`, mirroring the original's `asyncio.gather`).
pub async fn insert_batch(
	table: &TableMeta,
	collection: &dyn Collection,
	data: BTreeMap<String, RowPayload>,
) -> BTreeMap<String, Result<(), ServerError>> {
	let results = join_all(data.into_iter().map(|(row_id, payload)| async move {
		let result = insert_datum(table, collection, &row_id, payload).await;
		(row_id, result)
	}))
	.await;
	results.into_iter().collect()
}

async fn insert_datum(
	table: &TableMeta,
	collection: &dyn Collection,
	row_id: &str,
	payload: RowPayload,
) -> Result<(), ServerError> {
	let existing = collection.get(row_id).await;
	let mut indexed = payload.indexed;

	if let Some(existing) = &existing {
		for column in table.indices.keys() {
			if !indexed.contains_key(column) {
				if let Some(value) = existing.indexed.get(column) {
					indexed.insert(column.clone(), value.clone());
				}
			}
		}
	}

	for column in table.indices.keys() {
		if !indexed.contains_key(column) && existing.is_none() {
			return Err(ServerError::MissingIndexedColumns(column.clone()));
		}
	}

	for column in indexed.keys() {
		if !table.indices.contains_key(column) {
			return Err(ServerError::ExtraIndexedColumns(column.clone()));
		}
	}

	for (column, value) in &indexed {
		let index_type = table.indices.get(column).expect("checked above");
		validate_shape(*index_type, value).map_err(|_| ServerError::OperandTypeMismatch(column.clone()))?;
	}

	for column in table.indices.keys().filter(|c| table.indices[*c].is_unique()) {
		let Some(value) = indexed.get(column) else { continue };
		let conflict_filter = crate::store::Filter::Leaf {
			field: column.clone(),
			op: phasmadb_protocol::LeafOp::Eq,
			operand: value.clone(),
		};
		if let Some(conflict) = collection.find_one(&conflict_filter).await {
			if conflict.row_id != row_id {
				return Err(ServerError::UniqueViolation(column.clone()));
			}
		}
	}

	let row = StoredRow { row_id: row_id.to_string(), indexed, extra: payload.extra };
	let outcome = if existing.is_some() {
		collection.replace(row_id, row).await
	} else {
		collection.insert(row).await
	};
	outcome.map_err(|e| match e {
		StoreError::UniqueViolation(column) => ServerError::UniqueViolation(column),
		StoreError::NotFound => ServerError::RowNotFound(row_id.to_string()),
	})
}

fn validate_shape(index_type: IndexType, value: &IndexValue) -> Result<(), ()> {
	match (index_type.is_numeric(), value) {
		(true, IndexValue::Int(_)) => Ok(()),
		(false, IndexValue::Text(_) | IndexValue::TextList(_)) => Ok(()),
		_ => Err(()),
	}
}

/// `query_by_id` (spec §4.4's dispatch table).
pub async fn query_by_id(collection: &dyn Collection, row_id: &str) -> Option<StoredRow> {
	collection.get(row_id).await
}

/// `delete_by_id` (spec §4.6).
pub async fn delete_by_id(collection: &dyn Collection, row_id: &str) -> bool {
	collection.delete_one(row_id).await
}

/// `query_data` (spec §4.7's execution step).
pub async fn query_data(
	collection: &dyn Collection,
	filter: &Filter,
	sort: &[(String, SortDirection)],
	limit: Option<u64>,
) -> Vec<StoredRow> {
	collection.find(filter, sort, limit.map(|l| l as usize)).await
}

/// `delete_data` (spec §4.7's execution step).
pub async fn delete_data(collection: &dyn Collection, filter: &Filter) -> usize {
	collection.delete_many(filter).await
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::store::{MemoryStore, Store};
	use phasmadb_protocol::IndexType as IT;
	use std::collections::BTreeMap as Map;

	fn table(indices: &[(&str, IT)]) -> TableMeta {
		TableMeta {
			id: 1,
			owner: "alice".into(),
			hashed_name: "h".into(),
			indices: indices.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
		}
	}

	fn payload(cells: &[(&str, IndexValue)]) -> RowPayload {
		RowPayload {
			indexed: cells.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
			extra: "sealed".into(),
		}
	}

	#[tokio::test]
	async fn fresh_insert_requires_every_declared_column() {
		let store = MemoryStore::new();
		let collection = store.collection("t");
		let table = table(&[("rank", IT::Sort)]);
		let mut data = Map::new();
		data.insert("r1".to_string(), payload(&[]));
		let results = insert_batch(&table, &*collection, data).await;
		assert_eq!(results["r1"], Err(ServerError::MissingIndexedColumns("rank".into())));
	}

	#[tokio::test]
	async fn upsert_inherits_missing_columns() {
		let store = MemoryStore::new();
		let collection = store.collection("t");
		let table = table(&[("rank", IT::Sort), ("name", IT::Text)]);
		let mut first = Map::new();
		first.insert(
			"r1".to_string(),
			payload(&[("rank", IndexValue::Int(1)), ("name", IndexValue::Text("a".into()))]),
		);
		insert_batch(&table, &*collection, first).await;

		let mut second = Map::new();
		second.insert("r1".to_string(), payload(&[("rank", IndexValue::Int(2))]));
		let results = insert_batch(&table, &*collection, second).await;
		assert!(results["r1"].is_ok());
		let row = collection.get("r1").await.unwrap();
		assert_eq!(row.indexed["name"], IndexValue::Text("a".into()));
		assert_eq!(row.indexed["rank"], IndexValue::Int(2));
	}

	#[tokio::test]
	async fn extra_column_rejected() {
		let store = MemoryStore::new();
		let collection = store.collection("t");
		let table = table(&[("rank", IT::Sort)]);
		let mut data = Map::new();
		data.insert(
			"r1".to_string(),
			payload(&[("rank", IndexValue::Int(1)), ("ghost", IndexValue::Int(1))]),
		);
		let results = insert_batch(&table, &*collection, data).await;
		assert_eq!(results["r1"], Err(ServerError::ExtraIndexedColumns("ghost".into())));
	}

	#[tokio::test]
	async fn unique_column_conflict_is_rejected() {
		let store = MemoryStore::new();
		let collection = store.collection("t");
		let table = table(&[("email", IT::UniqueText)]);
		let mut first = Map::new();
		first.insert("r1".to_string(), payload(&[("email", IndexValue::Text("a@x".into()))]));
		insert_batch(&table, &*collection, first).await;

		let mut second = Map::new();
		second.insert("r2".to_string(), payload(&[("email", IndexValue::Text("a@x".into()))]));
		let results = insert_batch(&table, &*collection, second).await;
		assert_eq!(results["r2"], Err(ServerError::UniqueViolation("email".into())));
	}

	#[tokio::test]
	async fn same_row_id_does_not_collide_with_itself() {
		let store = MemoryStore::new();
		let collection = store.collection("t");
		let table = table(&[("email", IT::UniqueText)]);
		let mut data = Map::new();
		data.insert("r1".to_string(), payload(&[("email", IndexValue::Text("a@x".into()))]));
		insert_batch(&table, &*collection, data.clone()).await;
		let results = insert_batch(&table, &*collection, data).await;
		assert!(results["r1"].is_ok());
	}
}

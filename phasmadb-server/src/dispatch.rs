//! Routes a decoded [`Command`] to the catalog/row-store handlers and
//! builds the response envelope (spec §4.4's dispatch table).

use crate::catalog::Catalog;
use crate::query;
use crate::rows;
use crate::store::Store;
use futures::future::join_all;
use phasmadb_protocol::{err, farewell, insert_results, ok, ok_with, Command, ErrorCode, IndexType};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct Dispatcher {
	catalog: Arc<Catalog>,
	store: Arc<dyn Store>,
}

impl Dispatcher {
	pub fn new(catalog: Arc<Catalog>, store: Arc<dyn Store>) -> Self {
		Dispatcher { catalog, store }
	}

	/// Dispatch one command on behalf of `owner`. `exit` is handled by the
	/// caller (it needs to close the session, which this layer doesn't own).
	pub async fn dispatch(&self, owner: &str, command: Command) -> Value {
		match command {
			Command::CreateTable { name, indices } => self.create_table(owner, &name, indices).await,
			Command::InsertData { table, data } => self.insert_data(owner, &table, data).await,
			Command::QueryById { table, row_id } => self.query_by_id(owner, &table, &row_id).await,
			Command::QueryData { table, query } => self.query_data(owner, &table, query).await,
			Command::DeleteById { table, row_id } => self.delete_by_id(owner, &table, &row_id).await,
			Command::DeleteData { table, filter } => self.delete_data(owner, &table, filter).await,
			Command::DropTable { table } => self.drop_table(owner, &table),
			Command::Exit => farewell(),
		}
	}

	async fn create_table(&self, owner: &str, name: &str, raw_indices: BTreeMap<String, String>) -> Value {
		let mut indices = BTreeMap::new();
		for (column, kind) in &raw_indices {
			if !phasmadb_protocol::is_valid_index_name(column) {
				return err(ErrorCode::Malformed);
			}
			let Ok(kind) = kind.parse::<IndexType>() else { return err(ErrorCode::Malformed) };
			indices.insert(column.clone(), kind);
		}
		let Ok(meta) = self.catalog.create(owner, name, indices.clone()) else {
			return err(ErrorCode::TableExists);
		};
		let collection = self.store.collection(&meta.collection_name());
		let creations = indices.into_iter().map(|(column, kind)| {
			let collection = collection.clone();
			async move {
				collection
					.create_index(crate::store::IndexField { name: column, kind }, kind.is_unique())
					.await
			}
		});
		if join_all(creations).await.into_iter().any(|r| r.is_err()) {
			return err(ErrorCode::TableExists);
		}
		ok()
	}

	fn drop_table(&self, owner: &str, name: &str) -> Value {
		let Some(meta) = self.catalog.drop_table(owner, name) else {
			return err(ErrorCode::NoSuchTable);
		};
		self.store.drop_collection(&meta.collection_name());
		ok()
	}

	async fn insert_data(
		&self,
		owner: &str,
		table: &str,
		data: BTreeMap<String, phasmadb_protocol::RowPayload>,
	) -> Value {
		let Some(meta) = self.catalog.get(owner, table) else { return err(ErrorCode::NoSuchTable) };
		let collection = self.store.collection(&meta.collection_name());
		let results = rows::insert_batch(&meta, &*collection, data).await;
		insert_results(results.into_iter().map(|(id, r)| (id, r.map_err(|e| e.code()))).collect())
	}

	async fn query_by_id(&self, owner: &str, table: &str, row_id: &str) -> Value {
		let Some(meta) = self.catalog.get(owner, table) else { return err(ErrorCode::NoSuchTable) };
		let collection = self.store.collection(&meta.collection_name());
		match rows::query_by_id(&*collection, row_id).await {
			Some(row) => ok_with("row", row_to_json(&row)),
			None => err(ErrorCode::RowNotFound),
		}
	}

	async fn delete_by_id(&self, owner: &str, table: &str, row_id: &str) -> Value {
		let Some(meta) = self.catalog.get(owner, table) else { return err(ErrorCode::NoSuchTable) };
		let collection = self.store.collection(&meta.collection_name());
		if rows::delete_by_id(&*collection, row_id).await {
			ok()
		} else {
			err(ErrorCode::RowNotFound)
		}
	}

	async fn query_data(&self, owner: &str, table: &str, query: phasmadb_protocol::QueryEnvelope) -> Value {
		let Some(meta) = self.catalog.get(owner, table) else { return err(ErrorCode::NoSuchTable) };
		let filter = match query::compile_filter(&meta.indices, &query.filter) {
			Ok(filter) => filter,
			Err(e) => return err(e.code()),
		};
		let sort = match query::compile_sort(&meta.indices, &query.sort) {
			Ok(sort) => sort,
			Err(e) => return err(e.code()),
		};
		let collection = self.store.collection(&meta.collection_name());
		let found = rows::query_data(&*collection, &filter, &sort, query.limit).await;
		let data: serde_json::Map<String, Value> =
			found.iter().map(|row| (row.row_id.clone(), row_to_json(row))).collect();
		ok_with("data", Value::Object(data))
	}

	async fn delete_data(&self, owner: &str, table: &str, filter: Value) -> Value {
		let Some(meta) = self.catalog.get(owner, table) else { return err(ErrorCode::NoSuchTable) };
		let filter = match query::compile_filter(&meta.indices, &filter) {
			Ok(filter) => filter,
			Err(e) => return err(e.code()),
		};
		let collection = self.store.collection(&meta.collection_name());
		let count = rows::delete_data(&*collection, &filter).await;
		ok_with("count", Value::from(count))
	}
}

fn row_to_json(row: &crate::store::StoredRow) -> Value {
	let indexed: serde_json::Map<String, Value> = row
		.indexed
		.iter()
		.map(|(column, value)| (column.clone(), serde_json::to_value(value).expect("IndexValue always serializes")))
		.collect();
	serde_json::json!({"indexed": indexed, "extra": row.extra})
}

//! Typed operations over a [`Connection`] (spec §4.4's dispatch table),
//! compiled against a [`Schema`] and a [`Keyring`] the caller supplies per
//! table — this crate never persists either, mirroring the original
//! client's "you load your own keyring" design.

use crate::connection::Connection;
use crate::error::{ClientError, Result};
use crate::row::{decode_row, Row};
use phasmadb_crypto::Keyring;
use phasmadb_protocol::{Command, ErrorCode, QueryEnvelope, SortDirection};
use phasmadb_query::{compile_select, compile_sort, encode_row, Cell, Schema, Select};
use rsa::RsaPrivateKey;
use std::collections::BTreeMap;
use tokio::io::{AsyncRead, AsyncWrite};

/// A PhasmaDB session client: one authenticated connection, queueing
/// commands one at a time (spec §4.3).
#[derive(Clone)]
pub struct Client {
	connection: Connection,
}

impl Client {
	/// Run the handshake over `stream` and return a ready client.
	pub async fn connect<S>(stream: S, username: &str, private_key: &RsaPrivateKey) -> Result<Self>
	where
		S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
	{
		let connection = Connection::open(stream, username, private_key).await?;
		Ok(Client { connection })
	}

	async fn call(&self, command: Command) -> Result<serde_json::Value> {
		let body = serde_json::to_value(&command).expect("Command always serializes");
		let response = self.connection.call(body).await?;
		if response.get("success").and_then(serde_json::Value::as_bool) == Some(false) {
			let code = response.get("error").and_then(serde_json::Value::as_u64).unwrap_or(0);
			let code = ErrorCode::try_from(code as u16).map_err(|e| ClientError::Protocol(e.to_string()))?;
			return Err(ClientError::Server(code));
		}
		Ok(response)
	}

	/// Create a table with the given column schema (spec §4.5).
	pub async fn create_table(&self, keyring: &Keyring, name: &str, schema: &Schema) -> Result<()> {
		let indices = schema
			.iter()
			.map(|(column, kind)| (keyring.hash_name(column), index_type_wire(*kind)))
			.collect();
		self.call(Command::CreateTable { name: keyring.hash_name(name), indices }).await?;
		Ok(())
	}

	/// Drop a table (spec §4.5).
	pub async fn drop_table(&self, keyring: &Keyring, name: &str) -> Result<()> {
		self.call(Command::DropTable { table: keyring.hash_name(name) }).await?;
		Ok(())
	}

	/// Insert or upsert a batch of rows (spec §4.6). Returns the per-row
	/// outcome the server reported.
	pub async fn insert_data(
		&self,
		keyring: &Keyring,
		name: &str,
		schema: &Schema,
		rows: BTreeMap<String, (BTreeMap<String, Cell>, Vec<u8>)>,
	) -> Result<BTreeMap<String, std::result::Result<(), ErrorCode>>> {
		let mut data = BTreeMap::new();
		for (row_id, (cells, extra)) in rows {
			data.insert(row_id, encode_row(schema, keyring, &cells, &extra)?);
		}
		let response = self.call(Command::InsertData { table: keyring.hash_name(name), data }).await?;
		let results = response
			.get("results")
			.and_then(serde_json::Value::as_object)
			.ok_or_else(|| ClientError::Protocol("insert_data response missing results".into()))?;
		let mut outcomes = BTreeMap::new();
		for (row_id, result) in results {
			let outcome = if result.get("success").and_then(serde_json::Value::as_bool) == Some(true) {
				Ok(())
			} else {
				let code = result.get("error").and_then(serde_json::Value::as_u64).unwrap_or(0);
				Err(ErrorCode::try_from(code as u16).map_err(|e| ClientError::Protocol(e.to_string()))?)
			};
			outcomes.insert(row_id.clone(), outcome);
		}
		Ok(outcomes)
	}

	/// Look up one row by primary key (spec §4.6, §4.7). `None` if no row
	/// with that id exists.
	pub async fn query_by_id(
		&self,
		keyring: &Keyring,
		name: &str,
		schema: &Schema,
		row_id: &str,
	) -> Result<Option<Row>> {
		let command = Command::QueryById { table: keyring.hash_name(name), row_id: row_id.to_string() };
		match self.call(command).await {
			Ok(response) => {
				let row_json = response
					.get("row")
					.ok_or_else(|| ClientError::Protocol("query_by_id response missing row".into()))?;
				Ok(Some(decode_row(row_id, row_json, schema, keyring)?))
			},
			Err(ClientError::Server(ErrorCode::RowNotFound)) => Ok(None),
			Err(e) => Err(e),
		}
	}

	/// Delete one row by primary key. `false` if no row with that id existed.
	pub async fn delete_by_id(&self, keyring: &Keyring, name: &str, row_id: &str) -> Result<bool> {
		let command = Command::DeleteById { table: keyring.hash_name(name), row_id: row_id.to_string() };
		match self.call(command).await {
			Ok(_) => Ok(true),
			Err(ClientError::Server(ErrorCode::RowNotFound)) => Ok(false),
			Err(e) => Err(e),
		}
	}

	/// Run a predicate query, optionally sorted and limited (spec §4.7).
	pub async fn query_data(
		&self,
		keyring: &Keyring,
		name: &str,
		schema: &Schema,
		select: &Select,
		sort: Vec<(String, SortDirection)>,
		limit: Option<u64>,
	) -> Result<BTreeMap<String, Row>> {
		let filter = compile_select(schema, keyring, select)?.to_json();
		let sort = compile_sort(schema, keyring, &sort)?;
		let command = Command::QueryData {
			table: keyring.hash_name(name),
			query: QueryEnvelope { filter, sort, limit },
		};
		let response = self.call(command).await?;
		let data = response
			.get("data")
			.and_then(serde_json::Value::as_object)
			.ok_or_else(|| ClientError::Protocol("query_data response missing data".into()))?;
		data.iter().map(|(row_id, row_json)| Ok((row_id.clone(), decode_row(row_id, row_json, schema, keyring)?))).collect()
	}

	/// Delete every row matching a predicate (spec §4.7). Returns the count
	/// of rows removed.
	pub async fn delete_data(&self, keyring: &Keyring, name: &str, schema: &Schema, select: &Select) -> Result<u64> {
		let filter = compile_select(schema, keyring, select)?.to_json();
		let response = self.call(Command::DeleteData { table: keyring.hash_name(name), filter }).await?;
		Ok(response.get("count").and_then(serde_json::Value::as_u64).unwrap_or(0))
	}

	/// Close the session (spec §4.3's `exit` command).
	pub async fn close(&self) -> Result<()> {
		self.call(Command::Exit).await?;
		Ok(())
	}
}

fn index_type_wire(kind: phasmadb_protocol::IndexType) -> String {
	match kind {
		phasmadb_protocol::IndexType::Sort => "sort",
		phasmadb_protocol::IndexType::Unique => "unique",
		phasmadb_protocol::IndexType::Text => "text",
		phasmadb_protocol::IndexType::UniqueText => "unique_text",
	}
	.to_string()
}

//! Drives a full client session against an in-process server over an
//! in-memory duplex transport (spec §4.3-§4.7).

use phasmadb_client::{Cell, Client, Column, Keyring, Schema};
use phasmadb_crypto::auth;
use phasmadb_protocol::IndexType;
use phasmadb_server::{Catalog, Dispatcher, MemoryStore, UserDirectory};
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

struct StaticDirectory(HashMap<String, RsaPublicKey>);

impl UserDirectory for StaticDirectory {
	fn public_key(&self, username: &str) -> Option<RsaPublicKey> {
		self.0.get(username).cloned()
	}
}

async fn spawn_server() -> (tokio::io::DuplexStream, RsaPrivateKey) {
	let (server_side, client_side) = tokio::io::duplex(64 * 1024);
	let (private_key, public_key) = auth::generate_keypair(2048).unwrap();
	let mut users = HashMap::new();
	users.insert("alice".to_string(), public_key);
	let directory = Arc::new(StaticDirectory(users));
	let catalog = Arc::new(Catalog::new());
	let store = Arc::new(MemoryStore::new());
	let dispatcher = Dispatcher::new(catalog, store);

	tokio::spawn(async move {
		let mut server_side = server_side;
		phasmadb_server::conn::serve_connection(&mut server_side, directory, &dispatcher).await;
	});

	(client_side, private_key)
}

fn schema() -> Schema {
	let mut schema = Schema::new();
	schema.insert("rank".to_string(), IndexType::Sort);
	schema.insert("callsign".to_string(), IndexType::UniqueText);
	schema
}

#[tokio::test]
async fn full_client_lifecycle() {
	let (stream, private_key) = spawn_server().await;
	let client = Client::connect(stream, "alice", &private_key).await.unwrap();
	let keyring = Keyring::create();
	let schema = schema();

	client.create_table(&keyring, "officers", &schema).await.unwrap();

	let mut cells = BTreeMap::new();
	cells.insert("rank".to_string(), Cell::int(7));
	cells.insert("callsign".to_string(), Cell::plain_text("Ghost Actual"));
	let mut rows = BTreeMap::new();
	rows.insert("r1".to_string(), (cells, b"classified".to_vec()));
	let results = client.insert_data(&keyring, "officers", &schema, rows).await.unwrap();
	assert_eq!(results.get("r1"), Some(&Ok(())));

	let row = client.query_by_id(&keyring, "officers", &schema, "r1").await.unwrap().unwrap();
	assert_eq!(row.extra, b"classified");

	let select = Column::new("rank").gte(1);
	let found = client.query_data(&keyring, "officers", &schema, &select, Vec::new(), None).await.unwrap();
	assert_eq!(found.len(), 1);
	assert_eq!(found["r1"].extra, b"classified");

	assert!(client.delete_by_id(&keyring, "officers", "r1").await.unwrap());
	assert!(!client.delete_by_id(&keyring, "officers", "r1").await.unwrap());

	client.drop_table(&keyring, "officers").await.unwrap();
	client.close().await.unwrap();
}

#[tokio::test]
async fn wrong_table_lookup_fails() {
	let (stream, private_key) = spawn_server().await;
	let client = Client::connect(stream, "alice", &private_key).await.unwrap();
	let keyring = Keyring::create();
	let schema = schema();

	let err = client.query_by_id(&keyring, "ghost_table", &schema, "r1").await.unwrap_err();
	assert!(matches!(
		err,
		phasmadb_client::ClientError::Server(phasmadb_protocol::ErrorCode::NoSuchTable)
	));
}

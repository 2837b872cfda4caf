//! End-to-end session test: handshake, create_table, insert, query, delete,
//! drop (spec §4.3-§4.8), driven over an in-memory duplex transport.

use phasmadb_crypto::auth;
use phasmadb_server::{Catalog, Dispatcher, MemoryStore, UserDirectory};
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::collections::HashMap;
use std::sync::Arc;

struct StaticDirectory(HashMap<String, RsaPublicKey>);

impl UserDirectory for StaticDirectory {
	fn public_key(&self, username: &str) -> Option<RsaPublicKey> {
		self.0.get(username).cloned()
	}
}

fn directory_with(username: &str) -> (Arc<StaticDirectory>, RsaPrivateKey) {
	let (private_key, public_key) = auth::generate_keypair(2048).unwrap();
	let mut map = HashMap::new();
	map.insert(username.to_string(), public_key);
	(Arc::new(StaticDirectory(map)), private_key)
}

#[tokio::test]
async fn full_session_lifecycle() {
	use phasmadb_server::conn::{read_frame, write_frame};
	let (mut server_side, mut client_side) = tokio::io::duplex(64 * 1024);

	let (directory, private_key) = directory_with("alice");
	let catalog = Arc::new(Catalog::new());
	let store = Arc::new(MemoryStore::new());
	let dispatcher = Dispatcher::new(catalog, store);

	let server = tokio::spawn(async move {
		phasmadb_server::conn::serve_connection(&mut server_side, directory, &dispatcher).await;
	});

	write_frame(&mut client_side, &serde_json::json!({"username": "alice"})).await.unwrap();
	let hello = read_frame(&mut client_side).await.unwrap().unwrap();
	let challenge = hello["challenge"].as_str().unwrap();
	let nonce = auth::decrypt_challenge(&private_key, challenge).unwrap();

	write_frame(&mut client_side, &serde_json::json!({"response": hex::encode(&nonce)})).await.unwrap();
	let ack = read_frame(&mut client_side).await.unwrap().unwrap();
	assert_eq!(ack["success"], true);

	write_frame(
		&mut client_side,
		&serde_json::json!({"cmd": "create_table", "name": "t1", "indices": {"aa": "sort"}}),
	)
	.await
	.unwrap();
	let resp = read_frame(&mut client_side).await.unwrap().unwrap();
	assert_eq!(resp["success"], true);

	write_frame(
		&mut client_side,
		&serde_json::json!({
			"cmd": "insert_data",
			"table": "t1",
			"data": {"r1": {"indexed": {"aa": 5}, "extra": "sealed-payload"}}
		}),
	)
	.await
	.unwrap();
	let resp = read_frame(&mut client_side).await.unwrap().unwrap();
	assert_eq!(resp["results"]["r1"]["success"], true);

	write_frame(&mut client_side, &serde_json::json!({"cmd": "query_by_id", "table": "t1", "row_id": "r1"}))
		.await
		.unwrap();
	let resp = read_frame(&mut client_side).await.unwrap().unwrap();
	assert_eq!(resp["success"], true);
	assert_eq!(resp["row"]["extra"], "sealed-payload");

	write_frame(
		&mut client_side,
		&serde_json::json!({"cmd": "query_data", "table": "t1", "query": {"filter": {"aa": {"gte": 1}}}}),
	)
	.await
	.unwrap();
	let resp = read_frame(&mut client_side).await.unwrap().unwrap();
	assert_eq!(resp["data"]["r1"]["extra"], "sealed-payload");

	write_frame(&mut client_side, &serde_json::json!({"cmd": "delete_by_id", "table": "t1", "row_id": "r1"}))
		.await
		.unwrap();
	let resp = read_frame(&mut client_side).await.unwrap().unwrap();
	assert_eq!(resp["success"], true);

	write_frame(&mut client_side, &serde_json::json!({"cmd": "drop_table", "table": "t1"})).await.unwrap();
	let resp = read_frame(&mut client_side).await.unwrap().unwrap();
	assert_eq!(resp["success"], true);

	write_frame(&mut client_side, &serde_json::json!({"cmd": "exit"})).await.unwrap();
	let resp = read_frame(&mut client_side).await.unwrap().unwrap();
	assert_eq!(resp["farewell"], true);

	server.await.unwrap();
}

#[tokio::test]
async fn unknown_user_is_rejected_at_handshake() {
	use phasmadb_server::conn::{read_frame, write_frame};
	let (mut server_side, mut client_side) = tokio::io::duplex(4096);
	let (directory, _private_key) = directory_with("alice");
	let catalog = Arc::new(Catalog::new());
	let store = Arc::new(MemoryStore::new());
	let dispatcher = Dispatcher::new(catalog, store);

	let server = tokio::spawn(async move {
		phasmadb_server::conn::serve_connection(&mut server_side, directory, &dispatcher).await;
	});

	write_frame(&mut client_side, &serde_json::json!({"username": "mallory"})).await.unwrap();
	let resp = read_frame(&mut client_side).await.unwrap().unwrap();
	assert_eq!(resp["error"], 101);

	server.await.unwrap();
}

//! `phasmadb client`: a scriptable one-shot demonstration of the session
//! client (spec §4.3-§4.7), grounded in `original_source/client/phasmadb.py`'s
//! `PhasmaDBConnection` usage pattern (connect, `create_table`, `insert_data`,
//! query, close).

use clap::Args;
use phasmadb_client::{Cell, Client, Column, Keyring, Schema};
use phasmadb_protocol::IndexType;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(serde::Deserialize)]
struct PrivateKeyFile {
	username: String,
	private_key: String,
}

#[derive(Debug, Args)]
pub struct ClientArgs {
	/// Server address to connect to.
	#[arg(long, default_value = "127.0.0.1:9999")]
	pub addr: String,

	/// Private key file written by `new-user`.
	pub private_key_file: PathBuf,

	/// Keyring file; created fresh on first use and reused afterwards.
	#[arg(long, default_value = "keyring.json")]
	pub keyring_file: PathBuf,

	/// Name of the demo table to create and query.
	#[arg(long, default_value = "demo")]
	pub table: String,

	/// Row id to insert and then read back.
	#[arg(long, default_value = "row1")]
	pub row_id: String,

	/// Integer value stored in the demo table's `value` sort column.
	#[arg(long, default_value_t = 1)]
	pub value: u64,

	/// Plaintext payload to seal into the row's `extra` field.
	#[arg(long, default_value = "hello from phasmadb-cli")]
	pub payload: String,
}

pub async fn run(args: ClientArgs) -> anyhow::Result<()> {
	let credential: PrivateKeyFile =
		serde_json::from_str(&std::fs::read_to_string(&args.private_key_file)?)?;
	let private_key = phasmadb_crypto::auth::private_key_from_pem(&credential.private_key)?;

	let keyring = load_or_create_keyring(&args.keyring_file)?;

	let stream = tokio::net::TcpStream::connect(&args.addr).await?;
	let client = Client::connect(stream, &credential.username, &private_key).await?;

	let mut schema = Schema::new();
	schema.insert("value".to_string(), IndexType::Sort);

	match client.create_table(&keyring, &args.table, &schema).await {
		Ok(()) => println!("created table {:?}", args.table),
		Err(phasmadb_client::ClientError::Server(phasmadb_protocol::ErrorCode::TableExists)) => {
			println!("table {:?} already exists", args.table)
		},
		Err(e) => return Err(e.into()),
	}

	let mut cells = BTreeMap::new();
	cells.insert("value".to_string(), Cell::int(args.value));
	let mut rows = BTreeMap::new();
	rows.insert(args.row_id.clone(), (cells, args.payload.clone().into_bytes()));
	let results = client.insert_data(&keyring, &args.table, &schema, rows).await?;
	for (row_id, outcome) in &results {
		match outcome {
			Ok(()) => println!("inserted {row_id:?}"),
			Err(code) => println!("insert of {row_id:?} failed: {code:?}"),
		}
	}

	if let Some(row) = client.query_by_id(&keyring, &args.table, &schema, &args.row_id).await? {
		println!("row {:?}: {}", row.row_id, String::from_utf8_lossy(&row.extra));
	} else {
		println!("row {:?} not found", args.row_id);
	}

	let select = Column::new("value").gte(0);
	let found = client.query_data(&keyring, &args.table, &schema, &select, Vec::new(), None).await?;
	println!("query matched {} row(s)", found.len());

	client.close().await?;
	Ok(())
}

fn load_or_create_keyring(path: &PathBuf) -> anyhow::Result<Keyring> {
	if let Ok(json) = std::fs::read_to_string(path) {
		return Ok(Keyring::from_json(&json)?);
	}
	let keyring = Keyring::create();
	std::fs::write(path, keyring.to_json()?)?;
	println!("wrote fresh keyring to {}", path.display());
	Ok(keyring)
}

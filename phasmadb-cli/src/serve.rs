//! `phasmadb serve`: accept TCP connections and drive each one through
//! [`phasmadb_server::conn::serve_connection`] (spec §4.3, grounded in
//! `original_source/server/server.py`'s accept loop, adapted from aiohttp
//! websockets to a raw length-prefixed TCP transport per the ambient stack).

use crate::directory::FsUserDirectory;
use clap::Args;
use phasmadb_server::{Catalog, Dispatcher, MemoryStore};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Debug, Args)]
pub struct ServeArgs {
	/// Address to listen on.
	#[arg(long, default_value = "127.0.0.1:9999")]
	pub addr: String,

	/// Directory holding `<username>.pem` public keys.
	#[arg(long, default_value = "public_keys")]
	pub keys_dir: PathBuf,
}

pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
	let directory: Arc<dyn phasmadb_server::UserDirectory> =
		Arc::new(FsUserDirectory::new(args.keys_dir));
	let catalog = Arc::new(Catalog::new());
	let store = Arc::new(MemoryStore::new());
	let dispatcher = Arc::new(Dispatcher::new(catalog, store));

	let listener = TcpListener::bind(&args.addr).await?;
	tracing::info!(target: "phasmadb::serve", addr = %args.addr, "listening");

	loop {
		let (mut stream, peer) = listener.accept().await?;
		let directory = Arc::clone(&directory);
		let dispatcher = Arc::clone(&dispatcher);
		tokio::spawn(async move {
			tracing::debug!(target: "phasmadb::serve", %peer, "connection accepted");
			phasmadb_server::conn::serve_connection(&mut stream, directory, &dispatcher).await;
			tracing::debug!(target: "phasmadb::serve", %peer, "connection closed");
		});
	}
}

//! The table catalog: per-user table registry keyed by `(owner, hashed_name)`
//! (spec §3, §4.5).
//!
//! Each entry also carries a server-generated internal id, independent of
//! the `(owner, hashed_name)` key, used only to derive the backing
//! collection's name. This mirrors the original implementation's catalog
//! document, which carried its own opaque `_id` distinct from the
//! user-facing table name.

use parking_lot::RwLock;
use phasmadb_protocol::IndexType;
use rand::Rng;
use std::collections::BTreeMap;
use std::collections::HashMap;

/// One table's catalog entry.
#[derive(Debug, Clone)]
pub struct TableMeta {
	pub id: u64,
	pub owner: String,
	pub hashed_name: String,
	pub indices: BTreeMap<String, IndexType>,
}

impl TableMeta {
	/// The backing collection's name, `<owner>_<hashed_name>` (spec §6).
	pub fn collection_name(&self) -> String {
		format!("{}_{}", self.owner, self.hashed_name)
	}
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct Key {
	owner: String,
	hashed_name: String,
}

/// The server's table registry, one per running server (spans every user).
#[derive(Default)]
pub struct Catalog {
	tables: RwLock<HashMap<Key, TableMeta>>,
}

impl Catalog {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a new table. Fails if `(owner, hashed_name)` is already taken.
	pub fn create(
		&self,
		owner: &str,
		hashed_name: &str,
		indices: BTreeMap<String, IndexType>,
	) -> Result<TableMeta, ()> {
		let key = Key { owner: owner.to_string(), hashed_name: hashed_name.to_string() };
		let mut tables = self.tables.write();
		if tables.contains_key(&key) {
			return Err(());
		}
		let meta = TableMeta {
			id: rand::thread_rng().gen(),
			owner: owner.to_string(),
			hashed_name: hashed_name.to_string(),
			indices,
		};
		tables.insert(key, meta.clone());
		tracing::info!(
			target: "phasmadb::catalog",
			owner,
			table = %meta.collection_name(),
			"table created"
		);
		Ok(meta)
	}

	pub fn get(&self, owner: &str, hashed_name: &str) -> Option<TableMeta> {
		let key = Key { owner: owner.to_string(), hashed_name: hashed_name.to_string() };
		self.tables.read().get(&key).cloned()
	}

	/// Remove a table's catalog entry, returning it if one existed.
	pub fn drop_table(&self, owner: &str, hashed_name: &str) -> Option<TableMeta> {
		let key = Key { owner: owner.to_string(), hashed_name: hashed_name.to_string() };
		let removed = self.tables.write().remove(&key);
		if removed.is_some() {
			tracing::info!(target: "phasmadb::catalog", owner, hashed_name, "table dropped");
		}
		removed
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn create_then_get() {
		let catalog = Catalog::new();
		catalog.create("alice", "h1", BTreeMap::new()).unwrap();
		assert!(catalog.get("alice", "h1").is_some());
		assert!(catalog.get("bob", "h1").is_none());
	}

	#[test]
	fn duplicate_create_fails() {
		let catalog = Catalog::new();
		catalog.create("alice", "h1", BTreeMap::new()).unwrap();
		assert!(catalog.create("alice", "h1", BTreeMap::new()).is_err());
	}

	#[test]
	fn collection_name_combines_owner_and_hash() {
		let catalog = Catalog::new();
		let meta = catalog.create("alice", "h1", BTreeMap::new()).unwrap();
		assert_eq!(meta.collection_name(), "alice_h1");
	}

	#[test]
	fn drop_removes_entry() {
		let catalog = Catalog::new();
		catalog.create("alice", "h1", BTreeMap::new()).unwrap();
		assert!(catalog.drop_table("alice", "h1").is_some());
		assert!(catalog.get("alice", "h1").is_none());
	}
}

//! A filesystem-backed [`UserDirectory`]: one PKCS#1 PEM public key per
//! user at `<keys_dir>/<username>.pem`, matching the layout `new_user`
//! writes (spec §6's CLI surface, grounded in `original_source/server/new_user.py`).

use phasmadb_server::UserDirectory;
use rsa::RsaPublicKey;
use std::path::{Path, PathBuf};

pub struct FsUserDirectory {
	keys_dir: PathBuf,
}

impl FsUserDirectory {
	pub fn new(keys_dir: impl Into<PathBuf>) -> Self {
		FsUserDirectory { keys_dir: keys_dir.into() }
	}

	fn key_path(&self, username: &str) -> PathBuf {
		self.keys_dir.join(format!("{username}.pem"))
	}
}

impl UserDirectory for FsUserDirectory {
	fn public_key(&self, username: &str) -> Option<RsaPublicKey> {
		let path: &Path = &self.key_path(username);
		let pem = std::fs::read_to_string(path).ok()?;
		phasmadb_crypto::auth::public_key_from_pem(&pem).ok()
	}
}

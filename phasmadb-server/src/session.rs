//! The session state machine: `AwaitUser -> AwaitResponse -> AuthedIdle <->
//! Dispatching -> Closed` (spec §4.3).
//!
//! A session never holds more than one in-flight command: [`Session::begin_dispatch`]
//! only succeeds from `AuthedIdle`, and the caller must pair it with
//! [`Session::end_dispatch`] before the next command can be accepted.

use phasmadb_crypto::auth;
use phasmadb_protocol::{err, ok, ErrorCode};
use rsa::RsaPublicKey;
use serde_json::Value;
use std::sync::Arc;

/// Looks up a user's public key by username, so a server can swap in a
/// filesystem-backed directory, an in-memory one for tests, or anything
/// else without `Session` caring.
pub trait UserDirectory: Send + Sync {
	fn public_key(&self, username: &str) -> Option<RsaPublicKey>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
	AwaitUser,
	AwaitResponse { owner: String, expected_nonce: Vec<u8> },
	AuthedIdle { owner: String },
	Dispatching { owner: String },
	Closed,
}

pub struct Session {
	state: SessionState,
	directory: Arc<dyn UserDirectory>,
}

impl Session {
	pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
		Session { state: SessionState::AwaitUser, directory }
	}

	pub fn state(&self) -> &SessionState {
		&self.state
	}

	pub fn is_closed(&self) -> bool {
		matches!(self.state, SessionState::Closed)
	}

	/// The first message on a session: `{username: "..."}`. Replies with an
	/// encrypted challenge, or closes the session if the user is unknown
	/// (spec §4.3 step 1: `{challenge: null, error: 101}`).
	pub fn handle_hello(&mut self, username: &str) -> Value {
		if !matches!(self.state, SessionState::AwaitUser) {
			self.state = SessionState::Closed;
			return err(ErrorCode::Malformed);
		}
		let rejected = serde_json::json!({"challenge": Value::Null, "error": ErrorCode::NoSuchUser.code()});
		if !phasmadb_protocol::is_valid_username(username) {
			self.state = SessionState::Closed;
			return rejected;
		}
		let Some(public_key) = self.directory.public_key(username) else {
			self.state = SessionState::Closed;
			return rejected;
		};
		let nonce = auth::random_nonce();
		let Ok(challenge) = auth::encrypt_challenge(&public_key, &nonce) else {
			self.state = SessionState::Closed;
			return rejected;
		};
		self.state =
			SessionState::AwaitResponse { owner: username.to_string(), expected_nonce: nonce.to_vec() };
		serde_json::json!({"challenge": challenge})
	}

	/// The client's decrypted-nonce response. Advances to `AuthedIdle` on a
	/// match, otherwise closes with `102`.
	pub fn handle_response(&mut self, response: &[u8]) -> Value {
		let SessionState::AwaitResponse { owner, expected_nonce } = &self.state else {
			self.state = SessionState::Closed;
			return err(ErrorCode::AuthFailure);
		};
		if response == expected_nonce.as_slice() {
			let owner = owner.clone();
			self.state = SessionState::AuthedIdle { owner };
			ok()
		} else {
			self.state = SessionState::Closed;
			err(ErrorCode::AuthFailure)
		}
	}

	/// Claim the single in-flight dispatch slot, returning the owning
	/// username. `None` if the session isn't in `AuthedIdle`.
	pub fn begin_dispatch(&mut self) -> Option<String> {
		match &self.state {
			SessionState::AuthedIdle { owner } => {
				let owner = owner.clone();
				self.state = SessionState::Dispatching { owner: owner.clone() };
				Some(owner)
			},
			_ => None,
		}
	}

	/// Release the dispatch slot, returning to `AuthedIdle`.
	pub fn end_dispatch(&mut self) {
		if let SessionState::Dispatching { owner } = &self.state {
			self.state = SessionState::AuthedIdle { owner: owner.clone() };
		}
	}

	/// `exit` was dispatched, or the transport died: no further commands.
	pub fn close(&mut self) {
		self.state = SessionState::Closed;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use phasmadb_crypto::auth::generate_keypair;
	use std::collections::HashMap;

	struct TestDirectory(HashMap<String, RsaPublicKey>);

	impl UserDirectory for TestDirectory {
		fn public_key(&self, username: &str) -> Option<RsaPublicKey> {
			self.0.get(username).cloned()
		}
	}

	fn directory_with(username: &str) -> (Arc<TestDirectory>, rsa::RsaPrivateKey) {
		let (private_key, public_key) = generate_keypair(2048).unwrap();
		let mut map = HashMap::new();
		map.insert(username.to_string(), public_key);
		(Arc::new(TestDirectory(map)), private_key)
	}

	#[test]
	fn full_handshake_succeeds() {
		let (directory, private_key) = directory_with("alice");
		let mut session = Session::new(directory);
		let hello = session.handle_hello("alice");
		let challenge = hello["challenge"].as_str().unwrap();
		let nonce = auth::decrypt_challenge(&private_key, challenge).unwrap();
		let resp = session.handle_response(&nonce);
		assert_eq!(resp["success"], true);
		assert!(matches!(session.state(), SessionState::AuthedIdle { .. }));
	}

	#[test]
	fn unknown_user_closes_session() {
		let (directory, _) = directory_with("alice");
		let mut session = Session::new(directory);
		let resp = session.handle_hello("mallory");
		assert_eq!(resp["challenge"], Value::Null);
		assert_eq!(resp["error"], 101);
		assert!(session.is_closed());
	}

	#[test]
	fn wrong_response_closes_session() {
		let (directory, _) = directory_with("alice");
		let mut session = Session::new(directory);
		session.handle_hello("alice");
		let resp = session.handle_response(b"wrong nonce bytes!!");
		assert_eq!(resp["success"], false);
		assert!(session.is_closed());
	}

	#[test]
	fn dispatch_slot_is_exclusive() {
		let (directory, private_key) = directory_with("alice");
		let mut session = Session::new(directory);
		let hello = session.handle_hello("alice");
		let nonce = auth::decrypt_challenge(&private_key, hello["challenge"].as_str().unwrap()).unwrap();
		session.handle_response(&nonce);

		assert_eq!(session.begin_dispatch(), Some("alice".to_string()));
		assert_eq!(session.begin_dispatch(), None);
		session.end_dispatch();
		assert_eq!(session.begin_dispatch(), Some("alice".to_string()));
	}
}

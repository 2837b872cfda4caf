//! The connection task: one cooperative task owns the transport, pops one
//! `(command, completion)` pair at a time off an unbounded queue, writes it,
//! awaits exactly one response, and delivers it (spec §4.3's "Client side"
//! paragraph). Commands are never reordered and at most one is ever in
//! flight, so `cmd_id` is attached only as a sanity check, not for response
//! routing.

use crate::error::ClientError;
use crate::frame::{read_frame, write_frame};
use phasmadb_crypto::auth;
use rsa::RsaPrivateKey;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot};

struct Request {
	cmd_id: u64,
	body: Value,
	respond_to: oneshot::Sender<Result<Value, ClientError>>,
}

/// A live connection's outbound half: enqueue a command, get back exactly
/// one response. Cheaply cloneable; every clone shares the same command
/// loop and `cmd_id` counter.
#[derive(Clone)]
pub struct Connection {
	commands: mpsc::UnboundedSender<Request>,
	next_cmd_id: std::sync::Arc<AtomicU64>,
}

impl Connection {
	/// Perform the handshake (spec §4.3 steps 1-4) on `stream`, then spawn
	/// the command loop and return a handle to it.
	pub async fn open<S>(mut stream: S, username: &str, private_key: &RsaPrivateKey) -> Result<Self, ClientError>
	where
		S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
	{
		write_frame(&mut stream, &serde_json::json!({"username": username})).await?;
		let hello = read_frame(&mut stream)
			.await?
			.ok_or_else(|| ClientError::Protocol("connection closed during handshake".into()))?;
		let challenge = hello.get("challenge").and_then(Value::as_str).ok_or_else(|| {
			let code = hello.get("error").and_then(Value::as_u64).unwrap_or(0);
			ClientError::HandshakeRejected(
				phasmadb_protocol::ErrorCode::try_from(code as u16)
					.unwrap_or(phasmadb_protocol::ErrorCode::NoSuchUser),
			)
		})?;
		let nonce = auth::decrypt_challenge(private_key, challenge)?;

		write_frame(&mut stream, &serde_json::json!({"response": hex::encode(&nonce)})).await?;
		let ack = read_frame(&mut stream)
			.await?
			.ok_or_else(|| ClientError::Protocol("connection closed during handshake".into()))?;
		if ack.get("success").and_then(Value::as_bool) != Some(true) {
			let code = ack.get("error").and_then(Value::as_u64).unwrap_or(102);
			return Err(ClientError::HandshakeRejected(
				phasmadb_protocol::ErrorCode::try_from(code as u16)
					.unwrap_or(phasmadb_protocol::ErrorCode::AuthFailure),
			));
		}

		let (tx, rx) = mpsc::unbounded_channel();
		tokio::spawn(run_loop(stream, rx));
		Ok(Connection { commands: tx, next_cmd_id: std::sync::Arc::new(AtomicU64::new(0)) })
	}

	/// Enqueue `command`, returning the server's raw JSON response.
	pub async fn call(&self, mut command: Value) -> Result<Value, ClientError> {
		let cmd_id = self.next_cmd_id.fetch_add(1, Ordering::Relaxed);
		if let Value::Object(map) = &mut command {
			map.insert("cmd_id".to_string(), Value::from(cmd_id));
		}
		let (tx, rx) = oneshot::channel();
		self.commands
			.send(Request { cmd_id, body: command, respond_to: tx })
			.map_err(|_| ClientError::Closed)?;
		rx.await.map_err(|_| ClientError::Closed)?
	}
}

async fn run_loop<S>(mut stream: S, mut commands: mpsc::UnboundedReceiver<Request>)
where
	S: AsyncRead + AsyncWrite + Unpin,
{
	while let Some(request) = commands.recv().await {
		match round_trip(&mut stream, &request).await {
			Ok(response) => {
				let _ = request.respond_to.send(Ok(response));
			},
			Err(e) => {
				tracing::debug!(target: "phasmadb::client", error = %e, "transport failed, draining queue");
				let _ = request.respond_to.send(Err(e));
				drain(&mut commands);
				return;
			},
		}
	}
}

async fn round_trip<S>(stream: &mut S, request: &Request) -> Result<Value, ClientError>
where
	S: AsyncRead + AsyncWrite + Unpin,
{
	write_frame(stream, &request.body).await?;
	let response = read_frame(stream)
		.await?
		.ok_or_else(|| ClientError::Protocol("connection closed mid-response".into()))?;
	if let Some(echoed) = response.get("cmd_id").and_then(Value::as_u64) {
		if echoed != request.cmd_id {
			return Err(ClientError::Protocol(format!(
				"cmd_id mismatch: sent {}, received {echoed}",
				request.cmd_id
			)));
		}
	}
	Ok(response)
}

/// Transport died: fail every request still sitting in the queue with the
/// same "closed" signal future `call`s already get from the dropped sender.
fn drain(commands: &mut mpsc::UnboundedReceiver<Request>) {
	while let Ok(request) = commands.try_recv() {
		let _ = request.respond_to.send(Err(ClientError::Closed));
	}
}

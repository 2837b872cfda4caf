//! Frame codec and the per-connection driver loop (spec §4.3, §4.4).
//!
//! One frame is one JSON object, preceded by its length as a big-endian
//! `u32` (the "TCP + length-prefixed JSON" transport named by the ambient
//! stack). Nothing here is protocol-specific beyond that framing; the state
//! machine lives in [`crate::session`] and the routing in [`crate::dispatch`].

use crate::dispatch::Dispatcher;
use crate::session::{Session, UserDirectory};
use phasmadb_protocol::{err, with_cmd_id, Command, ErrorCode};
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

const MAX_FRAME_LEN: u32 = 16 * 1024 * 1024;

/// Read one length-prefixed JSON frame. `Ok(None)` on a clean EOF between
/// frames.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> std::io::Result<Option<Value>> {
	let mut len_buf = [0u8; 4];
	match reader.read_exact(&mut len_buf).await {
		Ok(_) => {},
		Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
		Err(e) => return Err(e),
	}
	let len = u32::from_be_bytes(len_buf);
	if len > MAX_FRAME_LEN {
		return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "frame too large"));
	}
	let mut buf = vec![0u8; len as usize];
	reader.read_exact(&mut buf).await?;
	let value = serde_json::from_slice(&buf)
		.map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
	Ok(Some(value))
}

/// Write one length-prefixed JSON frame.
pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, value: &Value) -> std::io::Result<()> {
	let bytes = serde_json::to_vec(value).expect("serde_json::Value always serializes");
	writer.write_all(&(bytes.len() as u32).to_be_bytes()).await?;
	writer.write_all(&bytes).await?;
	writer.flush().await
}

/// Drive one connection end to end: handshake, then the command loop, until
/// `exit`, a transport error, or a handshake failure closes the session.
pub async fn serve_connection<S: AsyncRead + AsyncWrite + Unpin>(
	stream: &mut S,
	directory: Arc<dyn UserDirectory>,
	dispatcher: &Dispatcher,
) {
	let mut session = Session::new(directory);

	let Ok(Some(hello)) = read_frame(stream).await else { return };
	let username = hello.get("username").and_then(Value::as_str).unwrap_or_default();
	let challenge = session.handle_hello(username);
	if write_frame(stream, &challenge).await.is_err() || session.is_closed() {
		return;
	}

	let Ok(Some(response_msg)) = read_frame(stream).await else { return };
	let response_hex = response_msg.get("response").and_then(Value::as_str).unwrap_or_default();
	let response_bytes = hex::decode(response_hex).unwrap_or_default();
	let ack = session.handle_response(&response_bytes);
	if write_frame(stream, &ack).await.is_err() || session.is_closed() {
		return;
	}

	tracing::info!(target: "phasmadb::session", username, "authenticated");

	loop {
		let Ok(Some(raw)) = read_frame(stream).await else {
			tracing::debug!(target: "phasmadb::session", username, "transport closed");
			return;
		};
		let cmd_id = raw.get("cmd_id").cloned();
		let response = match serde_json::from_value::<Command>(raw) {
			Ok(command) => match session.begin_dispatch() {
				// Never reachable with a well-behaved transport: reads are
				// sequential, so a second command can't arrive before the
				// first's response is written.
				None => err(ErrorCode::Malformed),
				Some(owner) => {
					let is_exit = matches!(command, Command::Exit);
					let response = dispatcher.dispatch(&owner, command).await;
					if is_exit {
						session.close();
					} else {
						session.end_dispatch();
					}
					response
				},
			},
			Err(_) => err(ErrorCode::UnknownCommand),
		};
		let response = with_cmd_id(response, cmd_id);
		let farewell = response.get("farewell").is_some();
		// A write failure here means the peer is already gone; there is no
		// one left to report a second error to, so it's dropped.
		let _ = write_frame(stream, &response).await;
		if farewell || session.is_closed() {
			return;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn frame_round_trips() {
		let mut buf = Vec::new();
		let value = serde_json::json!({"hello": "world"});
		write_frame(&mut buf, &value).await.unwrap();
		let mut cursor = std::io::Cursor::new(buf);
		let read_back = read_frame(&mut cursor).await.unwrap().unwrap();
		assert_eq!(read_back, value);
	}

	#[tokio::test]
	async fn empty_stream_is_clean_eof() {
		let mut cursor = std::io::Cursor::new(Vec::<u8>::new());
		assert_eq!(read_frame(&mut cursor).await.unwrap(), None);
	}
}

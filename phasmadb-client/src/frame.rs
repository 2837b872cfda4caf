//! Length-prefixed JSON framing, the client half of the wire transport
//! (spec §4.3). One frame is one JSON object preceded by its length as a
//! big-endian `u32`.

use serde_json::Value;
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

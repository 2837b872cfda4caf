//! Errors a [`crate::Client`] can return: transport failure, a rejected
//! handshake, a server-reported wire error, or a local query-compilation
//! failure (spec §4.3, §4.7).

use phasmadb_protocol::ErrorCode;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
	#[error("transport error: {0}")]
	Io(#[from] std::io::Error),
	#[error("malformed response from server: {0}")]
	Protocol(String),
	#[error("handshake rejected: {0:?}")]
	HandshakeRejected(ErrorCode),
	#[error("server returned {0:?}")]
	Server(ErrorCode),
	#[error(transparent)]
	Crypto(#[from] phasmadb_crypto::CryptoError),
	#[error(transparent)]
	Query(#[from] phasmadb_query::QueryError),
	#[error("connection's command loop has already shut down")]
	Closed,
}

pub type Result<T> = std::result::Result<T, ClientError>;

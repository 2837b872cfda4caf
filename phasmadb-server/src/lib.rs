//! The PhasmaDB server: catalog, row store, query compiler, session state
//! machine and command dispatcher (spec §4.3-§4.8).
//!
//! Nothing here holds client key material — the server only ever sees
//! hashed names, order-preserving integer codes, and opaque encrypted
//! payloads. `phasmadb-cli` wires this crate to a TCP listener and a
//! filesystem-backed [`session::UserDirectory`].

pub mod catalog;
pub mod conn;
pub mod dispatch;
pub mod error;
pub mod query;
pub mod rows;
pub mod session;
pub mod store;

pub use catalog::Catalog;
pub use dispatch::Dispatcher;
pub use error::ServerError;
pub use session::{Session, SessionState, UserDirectory};
pub use store::{MemoryStore, Store};

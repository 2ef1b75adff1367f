//! Storage collaborators.
//!
//! The tracker depends on two capabilities, both injected as trait objects:
//!
//! - [`RecordStore`]: remote create/update/list of [`Session`] records.
//! - [`KeyValueStore`]: durable per-device strings, used for the active
//!   session pointer.
//!
//! In-memory implementations back the tests; [`RestRecordStore`] and
//! [`FileKeyValueStore`] are used by the binary.

mod file;
mod memory;
mod rest;

pub use file::FileKeyValueStore;
pub use memory::{MemoryKeyValueStore, MemoryRecordStore};
pub use rest::{RestConfig, RestRecordStore};

use async_trait::async_trait;
use thiserror::Error;

use crate::session::{Session, SessionClose, SessionId};

/// Key under which the active session id is persisted.
pub const ACTIVE_SESSION_KEY: &str = "active_session_id";

/// Errors reported by storage collaborators.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The addressed record does not exist.
    #[error("record not found: {0}")]
    NotFound(String),

    /// The addressed record was closed earlier and cannot be closed again.
    #[error("record already closed: {0}")]
    AlreadyClosed(String),

    /// The remote rejected the request.
    #[error("request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The remote could not be reached.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A stored or received payload could not be decoded.
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed(e.to_string())
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Remote storage for session records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create an open session starting now and return its assigned id.
    async fn create(&self, user_id: Option<&str>) -> StoreResult<SessionId>;

    /// Close the identified session.
    ///
    /// Only an open record is touched. Fails with [`StoreError::NotFound`] if
    /// no such record exists and [`StoreError::AlreadyClosed`] if it has an
    /// end time. A store that cannot tell the two apart reports `NotFound`.
    async fn update(&self, id: &SessionId, close: &SessionClose) -> StoreResult<()>;

    /// All sessions, newest `start_time` first.
    async fn list(&self) -> StoreResult<Vec<Session>>;
}

/// Durable per-device string storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Remove a key. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> StoreResult<()>;
}

//! # play-ledger
//!
//! Zero-effort recording of timed play sessions with running balance totals.
//!
//! A session is started with one action and closed with two amounts: what was
//! put in (investment) and what came out (recovery). At most one session is
//! open per device, and the open session survives process restarts through a
//! small pointer kept in device-local storage.
//!
//! ## Components
//!
//! - [`ActiveSessionTracker`]: the idle/recording state machine
//! - [`ledger::summarize`]: totals over a session list
//! - [`RefreshSignal`]: tells list views to re-fetch after a close
//! - [`store`]: the record store and key-value store collaborators
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use play_ledger::store::{MemoryKeyValueStore, MemoryRecordStore};
//! use play_ledger::ActiveSessionTracker;
//!
//! #[tokio::main]
//! async fn main() -> play_ledger::Result<()> {
//!     play_ledger::logging::try_init().ok();
//!
//!     let tracker = ActiveSessionTracker::new(
//!         Arc::new(MemoryRecordStore::new()),
//!         Arc::new(MemoryKeyValueStore::new()),
//!     );
//!     tracker.restore().await?;
//!
//!     tracker.start().await?;
//!     tracker.end("20000", "50000").await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use error::{PlayLedgerError, Result, ValidationError};
pub use ledger::{summarize, SessionListView, Summary};
pub use session::{
    ActiveSessionTracker, CloseAmounts, Outcome, RefreshSignal, Session, SessionId, TrackerState,
};
pub use store::{KeyValueStore, RecordStore};

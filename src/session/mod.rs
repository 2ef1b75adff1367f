//! Session lifecycle.
//!
//! This module holds the session record types, the close-amount parser, and
//! the [`ActiveSessionTracker`] that enforces one open session per device.

mod amount;
mod id;
mod record;
mod refresh;
mod state;
mod tracker;

pub use amount::parse_amount;
pub use id::{InvalidSessionId, SessionId};
pub use record::{CloseAmounts, Session, SessionClose};
pub use refresh::RefreshSignal;
pub use state::TrackerState;
pub use tracker::{ActiveSessionTracker, Outcome};

//! API layer for play-ledger.
//!
//! A thin JSON surface over the tracker and the session list, for a client
//! that renders one toggle button and a list.
//!
//! ## Endpoints
//!
//! ### Health & Info
//! - `GET /health` - Health check
//! - `GET /api/v1/` - API information
//!
//! ### Tracker
//! - `GET /api/v1/tracker` - Current state, busy flag and refresh counter
//! - `POST /api/v1/tracker/start` - Open a session
//! - `POST /api/v1/tracker/end` - Close the open session with amounts
//! - `POST /api/v1/tracker/toggle` - Start or end, depending on state
//!
//! ### Sessions
//! - `GET /api/v1/sessions` - All sessions, newest first, with totals
//!
//! ## Example
//!
//! ```no_run
//! use play_ledger::api::{serve_with_state, AppState, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> play_ledger::Result<()> {
//!     let config = ServerConfig::new("127.0.0.1", 3000);
//!     serve_with_state(config, AppState::in_memory()).await
//! }
//! ```

pub mod handlers;
pub mod router;
pub mod types;

pub use handlers::AppState;
pub use router::{create_router, create_router_with_state, serve_with_state, ServerConfig};
pub use types::{
    AmountInput, EndSessionRequest, ErrorResponse, ListSessionsResponse, SessionEntry,
    ToggleRequest, TrackerStatusResponse, TransitionResponse,
};

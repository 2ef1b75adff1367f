//! REST API handlers.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::StatusCode, Json};

use super::types::{
    EndSessionRequest, ErrorResponse, ListSessionsResponse, ToggleRequest, TrackerStatusResponse,
    TransitionResponse,
};
use crate::error::PlayLedgerError;
use crate::ledger::SessionListView;
use crate::session::{ActiveSessionTracker, Outcome};
use crate::store::{KeyValueStore, MemoryKeyValueStore, MemoryRecordStore, RecordStore};

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<ActiveSessionTracker>,
    pub view: Arc<SessionListView>,
}

impl AppState {
    /// Wire a tracker and list view over the same record store.
    pub fn new(records: Arc<dyn RecordStore>, device: Arc<dyn KeyValueStore>) -> Self {
        Self::from_tracker(ActiveSessionTracker::new(Arc::clone(&records), device), records)
    }

    pub fn from_tracker(tracker: ActiveSessionTracker, records: Arc<dyn RecordStore>) -> Self {
        Self {
            tracker: Arc::new(tracker),
            view: Arc::new(SessionListView::new(records)),
        }
    }

    /// State over fresh in-memory stores.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryRecordStore::new()),
            Arc::new(MemoryKeyValueStore::new()),
        )
    }

    /// Keep the list view following the tracker's refresh signal.
    pub fn spawn_list_watcher(&self) -> tokio::task::JoinHandle<()> {
        let signal = self.tracker.refresh_signal().subscribe();
        tokio::spawn(Arc::clone(&self.view).watch(signal))
    }
}

fn error_response(err: PlayLedgerError) -> ApiError {
    let (status, body) = match &err {
        PlayLedgerError::Validation(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            ErrorResponse::validation(e.to_string()),
        ),
        PlayLedgerError::Network(_) => (
            StatusCode::BAD_GATEWAY,
            ErrorResponse::network(err.to_string()),
        ),
        PlayLedgerError::InvalidTransition(state) => {
            (StatusCode::CONFLICT, ErrorResponse::invalid_state(state))
        }
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::internal_error(err.to_string()),
        ),
    };
    (status, Json(body))
}

fn transition(
    outcome: Outcome,
    status: StatusCode,
) -> Result<(StatusCode, Json<TransitionResponse>), ApiError> {
    match TransitionResponse::from_outcome(outcome) {
        Some(body) => Ok((status, Json(body))),
        None => Err((StatusCode::CONFLICT, Json(ErrorResponse::busy()))),
    }
}

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}

/// API information endpoint.
pub async fn api_info() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "play-ledger",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

/// Current tracker state.
pub async fn tracker_status(
    State(state): State<AppState>,
) -> Result<Json<TrackerStatusResponse>, ApiError> {
    let current = state.tracker.state().map_err(error_response)?;
    Ok(Json(TrackerStatusResponse::new(
        &current,
        state.tracker.is_busy(),
        state.tracker.refresh_signal().current(),
    )))
}

/// Open a new session.
pub async fn start_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<TransitionResponse>), ApiError> {
    let outcome = state.tracker.start().await.map_err(error_response)?;
    transition(outcome, StatusCode::CREATED)
}

/// Close the recording session.
pub async fn end_session(
    State(state): State<AppState>,
    Json(req): Json<EndSessionRequest>,
) -> Result<(StatusCode, Json<TransitionResponse>), ApiError> {
    let outcome = state
        .tracker
        .end(&req.investment.as_raw(), &req.recovery.as_raw())
        .await
        .map_err(error_response)?;
    transition(outcome, StatusCode::OK)
}

/// Start when idle, end when recording.
///
/// The body is optional; starting needs no amounts.
pub async fn toggle_session(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<TransitionResponse>), ApiError> {
    let req: ToggleRequest = if body.iter().all(u8::is_ascii_whitespace) {
        ToggleRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("BAD_REQUEST", e.to_string())),
            )
        })?
    };
    let investment = req.investment.as_ref().map(|a| a.as_raw());
    let recovery = req.recovery.as_ref().map(|a| a.as_raw());

    let amounts = match (&investment, &recovery) {
        (Some(i), Some(r)) => Some((i.as_str(), r.as_str())),
        (Some(i), None) => Some((i.as_str(), "")),
        (None, Some(r)) => Some(("", r.as_str())),
        (None, None) => None,
    };

    let outcome = state.tracker.toggle(amounts).await.map_err(error_response)?;
    let status = match outcome {
        Outcome::Started { .. } => StatusCode::CREATED,
        _ => StatusCode::OK,
    };
    transition(outcome, status)
}

/// List all sessions with running totals.
pub async fn list_sessions(State(state): State<AppState>) -> Json<ListSessionsResponse> {
    let generation = state.tracker.refresh_signal().current();
    let snapshot = state.view.snapshot_at(generation).await;
    Json(ListSessionsResponse::from(&snapshot))
}

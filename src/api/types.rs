//! API request and response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::{Snapshot, Summary};
use crate::session::{Outcome, Session, TrackerState};

/// A close amount as entered by the user: either a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(serde_json::Number),
    Text(String),
}

impl AmountInput {
    /// Raw text handed to the amount parser.
    pub fn as_raw(&self) -> String {
        match self {
            AmountInput::Number(n) => n.to_string(),
            AmountInput::Text(s) => s.clone(),
        }
    }
}

/// Request to close the recording session.
#[derive(Debug, Clone, Deserialize)]
pub struct EndSessionRequest {
    pub investment: AmountInput,
    pub recovery: AmountInput,
}

/// Request body for the single toggle control.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToggleRequest {
    #[serde(default)]
    pub investment: Option<AmountInput>,
    #[serde(default)]
    pub recovery: Option<AmountInput>,
}

/// Tracker status.
#[derive(Debug, Clone, Serialize)]
pub struct TrackerStatusResponse {
    /// `idle` or `recording`.
    pub state: String,
    /// The open session, when recording.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Whether a transition is in flight; clients disable the toggle.
    pub busy: bool,
    /// Current refresh counter.
    pub refresh: u64,
}

impl TrackerStatusResponse {
    pub fn new(state: &TrackerState, busy: bool, refresh: u64) -> Self {
        Self {
            state: state.name().to_string(),
            session_id: state.active().map(|id| id.to_string()),
            busy,
            refresh,
        }
    }
}

/// Result of a start/end/toggle call.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TransitionResponse {
    Started {
        session_id: String,
    },
    Ended {
        session_id: String,
        end_time: DateTime<Utc>,
        investment: i64,
        recovery: i64,
        balance: i64,
    },
}

impl TransitionResponse {
    /// `None` for [`Outcome::Ignored`].
    pub fn from_outcome(outcome: Outcome) -> Option<Self> {
        match outcome {
            Outcome::Started { id } => Some(Self::Started {
                session_id: id.into_inner(),
            }),
            Outcome::Ended { id, close } => Some(Self::Ended {
                session_id: id.into_inner(),
                end_time: close.end_time,
                investment: close.investment,
                recovery: close.recovery,
                balance: close.recovery - close.investment,
            }),
            Outcome::Ignored => None,
        }
    }
}

/// One row of the session list.
#[derive(Debug, Clone, Serialize)]
pub struct SessionEntry {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub investment: i64,
    pub recovery: i64,
    pub balance: i64,
    pub open: bool,
}

impl From<&Session> for SessionEntry {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id.to_string(),
            start_time: session.start_time,
            end_time: session.end_time,
            investment: session.investment.unwrap_or(0),
            recovery: session.recovery.unwrap_or(0),
            balance: session.balance(),
            open: session.is_open(),
        }
    }
}

/// List sessions response.
#[derive(Debug, Clone, Serialize)]
pub struct ListSessionsResponse {
    /// Total number of sessions.
    pub count: usize,
    /// Sessions, newest first.
    pub sessions: Vec<SessionEntry>,
    /// Running totals.
    pub summary: Summary,
}

impl From<&Snapshot> for ListSessionsResponse {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            count: snapshot.sessions.len(),
            sessions: snapshot.sessions.iter().map(SessionEntry::from).collect(),
            summary: snapshot.summary,
        }
    }
}

/// Generic API error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Whether retrying the same request may succeed.
    pub retryable: bool,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            retryable: false,
        }
    }

    pub fn retryable(mut self) -> Self {
        self.retryable = true;
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message).retryable()
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new("NETWORK_ERROR", message).retryable()
    }

    pub fn invalid_state(state: &TrackerState) -> Self {
        Self::new(
            "INVALID_STATE",
            format!("Operation not allowed while {}", state),
        )
    }

    pub fn busy() -> Self {
        Self::new("BUSY", "Another start/end request is in progress").retryable()
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

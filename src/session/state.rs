//! Tracker state machine.

use std::fmt;

use super::SessionId;

/// Whether a session is currently being recorded on this device.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TrackerState {
    /// No session is open.
    #[default]
    Idle,
    /// The identified session is open.
    Recording(SessionId),
}

impl TrackerState {
    /// Check if a new session may be started.
    pub fn can_start(&self) -> bool {
        matches!(self, TrackerState::Idle)
    }

    /// The open session, if recording.
    pub fn active(&self) -> Option<&SessionId> {
        match self {
            TrackerState::Idle => None,
            TrackerState::Recording(id) => Some(id),
        }
    }

    /// Check if a session is open.
    pub fn is_recording(&self) -> bool {
        matches!(self, TrackerState::Recording(_))
    }

    /// Short name used in API responses.
    pub fn name(&self) -> &'static str {
        match self {
            TrackerState::Idle => "idle",
            TrackerState::Recording(_) => "recording",
        }
    }
}

impl fmt::Display for TrackerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerState::Idle => f.write_str("idle"),
            TrackerState::Recording(id) => write!(f, "recording {}", id),
        }
    }
}

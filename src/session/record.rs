//! Session records as stored remotely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SessionId;

/// One recorded play session.
///
/// A session is either open (`end_time`, `investment` and `recovery` all unset)
/// or closed (all three set). Closing writes the three fields in one update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Store-assigned identifier.
    pub id: SessionId,
    /// Owner tag written at creation.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Time the session was started.
    pub start_time: DateTime<Utc>,
    /// Time the session was closed, absent while open.
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// Amount put in, in currency minor units.
    #[serde(default)]
    pub investment: Option<i64>,
    /// Amount taken out, in currency minor units.
    #[serde(default)]
    pub recovery: Option<i64>,
}

impl Session {
    /// Create an open session starting now.
    pub fn open(id: SessionId, user_id: Option<String>) -> Self {
        Self::open_at(id, user_id, Utc::now())
    }

    /// Create an open session with an explicit start time.
    pub fn open_at(id: SessionId, user_id: Option<String>, start_time: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            start_time,
            end_time: None,
            investment: None,
            recovery: None,
        }
    }

    /// Apply a close to this session.
    pub fn close(&mut self, close: &SessionClose) {
        self.end_time = Some(close.end_time);
        self.investment = Some(close.investment);
        self.recovery = Some(close.recovery);
    }

    /// Whether the session is still recording.
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// `recovery - investment`, treating unset amounts as zero.
    pub fn balance(&self) -> i64 {
        self.recovery.unwrap_or(0) - self.investment.unwrap_or(0)
    }
}

/// Fields written when a session is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClose {
    pub end_time: DateTime<Utc>,
    pub investment: i64,
    pub recovery: i64,
}

impl SessionClose {
    /// Close amounts stamped with the current time.
    pub fn now(amounts: CloseAmounts) -> Self {
        Self {
            end_time: Utc::now(),
            investment: amounts.investment,
            recovery: amounts.recovery,
        }
    }
}

/// Validated, non-negative close amounts.
///
/// Only constructible through [`CloseAmounts::parse`] or [`CloseAmounts::new`],
/// both of which reject negative values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseAmounts {
    investment: i64,
    recovery: i64,
}

impl CloseAmounts {
    /// Build from already-numeric values.
    pub fn new(investment: i64, recovery: i64) -> Result<Self, crate::error::ValidationError> {
        Ok(Self {
            investment: super::amount::non_negative("investment", investment)?,
            recovery: super::amount::non_negative("recovery", recovery)?,
        })
    }

    /// Parse raw user input.
    pub fn parse(
        investment: &str,
        recovery: &str,
    ) -> Result<Self, crate::error::ValidationError> {
        Ok(Self {
            investment: super::amount::parse_amount("investment", investment)?,
            recovery: super::amount::parse_amount("recovery", recovery)?,
        })
    }

    pub fn investment(&self) -> i64 {
        self.investment
    }

    pub fn recovery(&self) -> i64 {
        self.recovery
    }

    /// `recovery - investment` for these amounts.
    pub fn balance(&self) -> i64 {
        self.recovery - self.investment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_session_has_no_close_fields() {
        let session = Session::open(SessionId::new("s-1"), None);
        assert!(session.is_open());
        assert!(session.investment.is_none());
        assert!(session.recovery.is_none());
        assert_eq!(session.balance(), 0);
    }

    #[test]
    fn test_close_sets_all_fields() {
        let mut session = Session::open(SessionId::new("s-1"), Some("me".into()));
        let started = session.start_time;
        let amounts = CloseAmounts::new(20000, 50000).unwrap();
        session.close(&SessionClose::now(amounts));

        assert!(!session.is_open());
        assert_eq!(session.investment, Some(20000));
        assert_eq!(session.recovery, Some(50000));
        assert_eq!(session.balance(), 30000);
        assert_eq!(session.start_time, started);
        assert!(session.end_time.unwrap() >= started);
    }

    #[test]
    fn test_close_amounts_reject_negative() {
        assert!(CloseAmounts::new(-1, 0).is_err());
        assert!(CloseAmounts::new(0, -1).is_err());
        assert_eq!(CloseAmounts::new(0, 0).unwrap().balance(), 0);
    }

    #[test]
    fn test_deserialize_remote_row() {
        let json = r#"{
            "id": "9b1d",
            "user_id": null,
            "start_time": "2024-05-01T10:00:00+00:00",
            "end_time": null,
            "investment": 0,
            "recovery": 0
        }"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.id.as_str(), "9b1d");
        assert!(session.is_open());
        assert_eq!(session.investment, Some(0));
    }

    #[test]
    fn test_deserialize_minimal_row() {
        let json = r#"{"id": "x", "start_time": "2024-05-01T10:00:00Z"}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert!(session.user_id.is_none());
        assert!(session.recovery.is_none());
    }
}

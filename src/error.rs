//! Error types for play-ledger.

use thiserror::Error;

use crate::session::TrackerState;
use crate::store::StoreError;

/// A rejected close amount.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No amounts were given at all.
    #[error("investment and recovery are required to end a session")]
    AmountsRequired,

    /// The field was empty or whitespace.
    #[error("{field} is required")]
    Missing { field: &'static str },

    /// The field could not be parsed as an integer.
    #[error("{field} must be a whole number, got '{value}'")]
    NotANumber { field: &'static str, value: String },

    /// The field parsed but is below zero.
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: i64 },
}

/// Main error type for play-ledger operations.
#[derive(Error, Debug)]
pub enum PlayLedgerError {
    /// User-supplied close amounts were rejected.
    #[error("invalid amount: {0}")]
    Validation(#[from] ValidationError),

    /// A record store call failed.
    #[error("record store error: {0}")]
    Network(#[source] StoreError),

    /// The active session pointer could not be read.
    #[error("failed to read active session pointer: {0}")]
    PersistenceRead(#[source] StoreError),

    /// The session list could not be fetched.
    #[error("failed to fetch session list: {0}")]
    ListFetch(#[source] StoreError),

    /// Operation not valid in the tracker's current state.
    #[error("operation not valid while {0}")]
    InvalidTransition(TrackerState),

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlayLedgerError {
    /// Whether the user can retry the same operation unchanged.
    ///
    /// `Io` only comes from binding or serving the listener, which a retry
    /// of the same request cannot fix.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Validation(_))
    }
}

/// Convenience Result type for play-ledger operations.
pub type Result<T> = std::result::Result<T, PlayLedgerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionId;

    #[test]
    fn test_validation_display() {
        let err = ValidationError::NotANumber {
            field: "investment",
            value: "abc".into(),
        };
        assert!(err.to_string().contains("investment"));
        assert!(err.to_string().contains("abc"));

        let err = ValidationError::Negative {
            field: "recovery",
            value: -5,
        };
        assert!(err.to_string().contains("negative"));
    }

    #[test]
    fn test_amounts_required_names_both_fields() {
        let msg = ValidationError::AmountsRequired.to_string();
        assert!(msg.contains("investment"));
        assert!(msg.contains("recovery"));
    }

    #[test]
    fn test_validation_conversion() {
        let err: PlayLedgerError = ValidationError::Missing { field: "investment" }.into();
        assert!(matches!(err, PlayLedgerError::Validation(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_network_display() {
        let err = PlayLedgerError::Network(StoreError::NotFound("abc".into()));
        assert!(err.to_string().contains("record store"));
        assert!(err.to_string().contains("abc"));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_invalid_transition_display() {
        let err =
            PlayLedgerError::InvalidTransition(TrackerState::Recording(SessionId::new("s-1")));
        assert!(err.to_string().contains("recording s-1"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PlayLedgerError = io_err.into();
        assert!(matches!(err, PlayLedgerError::Io(_)));
        assert!(err.to_string().contains("I/O error"));
        assert!(!err.is_retryable());
    }
}

//! The single-open-session tracker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{debug, info, warn};

use super::{CloseAmounts, RefreshSignal, SessionClose, SessionId, TrackerState};
use crate::error::{PlayLedgerError, ValidationError};
use crate::store::{KeyValueStore, RecordStore, ACTIVE_SESSION_KEY};
use crate::Result;

/// What a start/end/toggle call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A new session was created and is now recording.
    Started { id: SessionId },
    /// The recording session was closed.
    Ended { id: SessionId, close: SessionClose },
    /// Another transition was in flight; nothing was done.
    Ignored,
}

/// Owns the "at most one open session" invariant for this device.
///
/// The tracker is either [`TrackerState::Idle`] or
/// [`TrackerState::Recording`]. Transitions go through the record store first
/// and only then update in-process state and the persisted pointer, so a failed
/// store call never moves the state machine.
///
/// Start and end share one busy flag. A call that arrives while another is in
/// flight returns [`Outcome::Ignored`] without touching either store.
pub struct ActiveSessionTracker {
    records: Arc<dyn RecordStore>,
    device: Arc<dyn KeyValueStore>,
    state: RwLock<TrackerState>,
    busy: AtomicBool,
    refresh: RefreshSignal,
    user_id: Option<String>,
}

/// Clears the busy flag when a transition finishes, however it finishes.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ActiveSessionTracker {
    /// Create an idle tracker. Call [`restore`](Self::restore) to pick up a
    /// session left open by a previous run.
    pub fn new(records: Arc<dyn RecordStore>, device: Arc<dyn KeyValueStore>) -> Self {
        Self {
            records,
            device,
            state: RwLock::new(TrackerState::Idle),
            busy: AtomicBool::new(false),
            refresh: RefreshSignal::new(),
            user_id: None,
        }
    }

    /// Tag new sessions with an owner id.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Bump an externally owned signal instead of a private one.
    pub fn with_refresh_signal(mut self, refresh: RefreshSignal) -> Self {
        self.refresh = refresh;
        self
    }

    /// Initialize state from the persisted pointer.
    ///
    /// A missing, unreadable or malformed pointer leaves the tracker idle.
    pub async fn restore(&self) -> Result<TrackerState> {
        let restored = match self.device.get(ACTIVE_SESSION_KEY).await {
            Ok(Some(raw)) => match raw.parse::<SessionId>() {
                Ok(id) => TrackerState::Recording(id),
                Err(e) => {
                    warn!(error = %e, "ignoring malformed active session pointer");
                    TrackerState::Idle
                }
            },
            Ok(None) => TrackerState::Idle,
            Err(e) => {
                let err = PlayLedgerError::PersistenceRead(e);
                warn!(error = %err, "starting idle");
                TrackerState::Idle
            }
        };

        match &restored {
            TrackerState::Recording(id) => info!(session_id = %id, "resumed open session"),
            TrackerState::Idle => debug!("no open session to resume"),
        }

        self.set_state(restored.clone())?;
        Ok(restored)
    }

    /// Current state.
    pub fn state(&self) -> Result<TrackerState> {
        self.state
            .read()
            .map(|s| s.clone())
            .map_err(|_| PlayLedgerError::LockPoisoned)
    }

    /// Whether a transition is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Signal bumped after each successful close.
    pub fn refresh_signal(&self) -> &RefreshSignal {
        &self.refresh
    }

    /// Open a new session. Valid only while idle.
    pub async fn start(&self) -> Result<Outcome> {
        let Some(_busy) = self.try_busy() else {
            debug!("start ignored: transition in flight");
            return Ok(Outcome::Ignored);
        };

        let current = self.state()?;
        if !current.can_start() {
            return Err(PlayLedgerError::InvalidTransition(current));
        }

        let id = self
            .records
            .create(self.user_id.as_deref())
            .await
            .map_err(|e| {
                warn!(error = %e, "failed to create session");
                PlayLedgerError::Network(e)
            })?;

        self.set_state(TrackerState::Recording(id.clone()))?;

        if let Err(e) = self.device.set(ACTIVE_SESSION_KEY, id.as_str()).await {
            warn!(session_id = %id, error = %e, "session started but pointer not persisted");
        }

        info!(session_id = %id, "session started");
        Ok(Outcome::Started { id })
    }

    /// Close the recording session with raw user input.
    ///
    /// Both amounts must parse as non-negative integers. On any failure the
    /// session stays open and the call can be retried.
    pub async fn end(&self, investment: &str, recovery: &str) -> Result<Outcome> {
        self.close_with(|| CloseAmounts::parse(investment, recovery))
            .await
    }

    /// Close the recording session with already-validated amounts.
    pub async fn end_with(&self, amounts: CloseAmounts) -> Result<Outcome> {
        self.close_with(|| Ok(amounts)).await
    }

    /// Start when idle, end when recording.
    ///
    /// Ending requires amounts; `None` while recording is a validation error.
    pub async fn toggle(&self, amounts: Option<(&str, &str)>) -> Result<Outcome> {
        match self.state()? {
            TrackerState::Idle => self.start().await,
            TrackerState::Recording(_) => match amounts {
                Some((investment, recovery)) => self.end(investment, recovery).await,
                None => Err(ValidationError::AmountsRequired.into()),
            },
        }
    }

    async fn close_with<F>(&self, amounts: F) -> Result<Outcome>
    where
        F: FnOnce() -> std::result::Result<CloseAmounts, ValidationError>,
    {
        let Some(_busy) = self.try_busy() else {
            debug!("end ignored: transition in flight");
            return Ok(Outcome::Ignored);
        };

        let id = match self.state()? {
            TrackerState::Recording(id) => id,
            idle => return Err(PlayLedgerError::InvalidTransition(idle)),
        };

        let amounts = amounts().map_err(|e| {
            info!(session_id = %id, error = %e, "close rejected");
            e
        })?;

        let close = SessionClose::now(amounts);
        self.records.update(&id, &close).await.map_err(|e| {
            warn!(session_id = %id, error = %e, "failed to close session");
            PlayLedgerError::Network(e)
        })?;

        self.set_state(TrackerState::Idle)?;

        if let Err(e) = self.device.remove(ACTIVE_SESSION_KEY).await {
            warn!(session_id = %id, error = %e, "session closed but pointer not cleared");
        }

        let generation = self.refresh.bump();
        info!(
            session_id = %id,
            investment = close.investment,
            recovery = close.recovery,
            balance = amounts.balance(),
            generation,
            "session closed"
        );
        Ok(Outcome::Ended { id, close })
    }

    fn try_busy(&self) -> Option<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(&self.busy))
    }

    fn set_state(&self, next: TrackerState) -> Result<()> {
        let mut state = self
            .state
            .write()
            .map_err(|_| PlayLedgerError::LockPoisoned)?;
        *state = next;
        Ok(())
    }
}

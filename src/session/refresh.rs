//! Refresh signal for views that display the session list.

use tokio::sync::watch;

/// Monotonic counter bumped after each successful session close.
///
/// Views hold a [`watch::Receiver`] from [`RefreshSignal::subscribe`] and
/// re-fetch the session list whenever the value changes. Only the tracker
/// calls [`RefreshSignal::bump`].
#[derive(Debug, Clone)]
pub struct RefreshSignal {
    tx: watch::Sender<u64>,
}

impl RefreshSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx }
    }

    /// Current counter value.
    pub fn current(&self) -> u64 {
        *self.tx.borrow()
    }

    /// Subscribe to counter changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }

    /// Increment by one and notify subscribers.
    pub(crate) fn bump(&self) -> u64 {
        let mut next = 0;
        self.tx.send_modify(|value| {
            *value += 1;
            next = *value;
        });
        next
    }
}

impl Default for RefreshSignal {
    fn default() -> Self {
        Self::new()
    }
}

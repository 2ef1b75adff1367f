//! Running totals over recorded sessions.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::session::Session;

/// Totals across a list of sessions, in currency minor units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_investment: i64,
    pub total_recovery: i64,
    /// `total_recovery - total_investment`.
    pub total_balance: i64,
    pub session_count: usize,
    pub closed_count: usize,
}

/// Sum investment and recovery across `sessions`, treating unset as zero.
///
/// Order of the input does not matter.
pub fn summarize(sessions: &[Session]) -> Summary {
    let mut summary = Summary {
        session_count: sessions.len(),
        ..Summary::default()
    };

    for session in sessions {
        summary.total_investment += session.investment.unwrap_or(0);
        summary.total_recovery += session.recovery.unwrap_or(0);
        if !session.is_open() {
            summary.closed_count += 1;
        }
    }

    summary.total_balance = summary.total_recovery - summary.total_investment;
    summary
}

/// Memoizes [`summarize`] against the identity of the last list it saw.
///
/// Views hand the same `Arc` back on every render until a re-fetch replaces
/// it, so pointer equality is enough to skip recomputation.
#[derive(Debug, Default)]
pub struct SummaryCache {
    last: Mutex<Option<(Arc<[Session]>, Summary)>>,
}

impl SummaryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Summary for `sessions`, recomputed only if the list changed identity.
    pub fn get(&self, sessions: &Arc<[Session]>) -> Summary {
        let Ok(mut last) = self.last.lock() else {
            return summarize(sessions);
        };

        if let Some((cached, summary)) = last.as_ref() {
            if Arc::ptr_eq(cached, sessions) {
                return *summary;
            }
        }

        let summary = summarize(sessions);
        *last = Some((Arc::clone(sessions), summary));
        summary
    }
}

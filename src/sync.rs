//! Sync-completion policy: when to stop waiting and export.
//!
//! Contact history arrives in batches over many seconds. A fixed settle
//! ceiling bounds worst-case latency; observing a bulk-history delivery
//! allows an early exit once the richest source has delivered.
//!
//! CHANGELOG:
//! - 08/23/2026 - Initial implementation

use std::time::{Duration, Instant};

/// Fixed poll interval for the completion check.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Fixed settle ceiling, measured from the moment the transport opens.
pub const SETTLE_CEILING: Duration = Duration::from_secs(60);

/// Outcome of a single poll tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Not enough data yet; keep waiting.
    Wait,
    /// Snapshot the store and export.
    Export,
    /// Ceiling reached with an empty store; terminate without writing.
    NoData,
}

/// Pure completion decision, re-evaluated on every tick.
pub fn evaluate(
    contact_count: usize,
    history_seen: bool,
    elapsed: Duration,
    ceiling: Duration,
) -> Verdict {
    let ceiling_reached = elapsed >= ceiling;
    if contact_count > 0 && (history_seen || ceiling_reached) {
        Verdict::Export
    } else if ceiling_reached {
        Verdict::NoData
    } else {
        Verdict::Wait
    }
}

/// Per-run sync observation state; discarded at export.
#[derive(Debug, Default)]
pub struct SyncState {
    opened_at: Option<Instant>,
    history_seen: bool,
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the transport-open instant; the settle clock starts here.
    pub fn mark_open(&mut self, now: Instant) {
        if self.opened_at.is_none() {
            self.opened_at = Some(now);
        }
    }

    /// Record that a bulk-history event has been observed.
    pub fn mark_history(&mut self) {
        self.history_seen = true;
    }

    pub fn is_open(&self) -> bool {
        self.opened_at.is_some()
    }

    pub fn history_seen(&self) -> bool {
        self.history_seen
    }

    /// Elapsed settle time, or zero if the transport never opened.
    pub fn elapsed(&self, now: Instant) -> Duration {
        self.opened_at
            .map(|opened| now.duration_since(opened))
            .unwrap_or(Duration::ZERO)
    }
}

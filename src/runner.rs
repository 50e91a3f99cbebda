//! Orchestration: consume session events, poll for completion, export.
//!
//! Single logical thread of control: events and poll ticks are serviced by
//! one select loop, so handlers never interleave. Transient connection loss
//! restarts the whole run with a fresh store via a bounded retry loop.
//!
//! CHANGELOG:
//! - 08/23/2026 - Initial implementation

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::export::{self, ExportSummary};
use crate::roster::Roster;
use crate::session::{ConnectionState, DisconnectReason, SessionEvent};
use crate::sync::{self, SyncState, Verdict};

/// Maximum full-orchestration attempts after transient connection loss.
pub const MAX_CONNECT_ATTEMPTS: usize = 3;

/// Terminal result of a run.
#[derive(Debug)]
pub enum RunOutcome {
    /// Contacts were exported.
    Exported(ExportSummary),
    /// Ceiling reached with an empty store; nothing written.
    NoData,
    /// Interrupt signal received before export; nothing written.
    Interrupted,
}

/// Fatal conditions that abort the run with exit code 1.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("session logged out; clear the stored session state and pair again before retrying")]
    LoggedOut,
    #[error("connection closed {0} times before contacts could be exported; giving up")]
    ConnectExhausted(usize),
    #[error("failed to start session event source")]
    Connect(#[source] anyhow::Error),
    #[error("failed to export contacts")]
    Export(#[source] anyhow::Error),
}

/// How a single connection attempt ended.
enum Exit {
    Outcome(RunOutcome),
    /// Transient connection loss; restart with fresh state.
    Restart,
}

/// One connection attempt: fresh store, fresh sync state.
struct Runner {
    rx: mpsc::Receiver<SessionEvent>,
    roster: Roster,
    sync: SyncState,
    out_path: PathBuf,
    poll_interval: Duration,
    settle_ceiling: Duration,
    source_done: bool,
}

impl Runner {
    fn new(
        rx: mpsc::Receiver<SessionEvent>,
        out_path: &Path,
        poll_interval: Duration,
        settle_ceiling: Duration,
    ) -> Self {
        Self {
            rx,
            roster: Roster::new(),
            sync: SyncState::new(),
            out_path: out_path.to_path_buf(),
            poll_interval,
            settle_ceiling,
            source_done: false,
        }
    }

    async fn run(mut self) -> Result<Exit, RunError> {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                maybe_event = self.rx.recv(), if !self.source_done => {
                    match maybe_event {
                        Some(event) => {
                            if let Some(exit) = self.handle_event(event)? {
                                return Ok(exit);
                            }
                        }
                        None => {
                            self.source_done = true;
                            if !self.sync.is_open() {
                                // Source dropped before reaching the open state.
                                return Ok(Exit::Restart);
                            }
                            debug!("event source drained; waiting out the settle window");
                        }
                    }
                }
                _ = ticker.tick() => {
                    if let Some(exit) = self.poll_once()? {
                        return Ok(exit);
                    }
                }
                _ = &mut ctrl_c => {
                    info!("interrupt received; shutting down without export");
                    return Ok(Exit::Outcome(RunOutcome::Interrupted));
                }
            }
        }
    }

    /// Process one event to completion. Returns `Some` on a terminal condition.
    fn handle_event(&mut self, event: SessionEvent) -> Result<Option<Exit>, RunError> {
        debug!(event = event.event_type(), "handling event");
        match event {
            SessionEvent::Connection(update) => match update.state {
                ConnectionState::Open => {
                    info!("connection open; settle window started");
                    self.sync.mark_open(Instant::now());
                }
                ConnectionState::Closed => {
                    return match update.disconnect {
                        Some(DisconnectReason::LoggedOut) => Err(RunError::LoggedOut),
                        Some(DisconnectReason::Transient { reason }) => {
                            warn!(%reason, "connection closed");
                            Ok(Some(Exit::Restart))
                        }
                        None => {
                            warn!("connection closed without a reason");
                            Ok(Some(Exit::Restart))
                        }
                    };
                }
                ConnectionState::Connecting => {}
            },
            SessionEvent::ContactsUpsert(contacts) | SessionEvent::ContactsUpdate(contacts) => {
                self.roster.apply_contacts(&contacts);
            }
            SessionEvent::HistorySync(history) => {
                self.roster.apply_contacts(&history.contacts);
                self.roster.apply_chats(&history.chats);
                self.sync.mark_history();
            }
            SessionEvent::ChatsUpsert(chats) => {
                self.roster.apply_chats(&chats);
            }
        }
        Ok(None)
    }

    /// Evaluate the completion policy once. Returns `Some` on a terminal verdict.
    fn poll_once(&mut self) -> Result<Option<Exit>, RunError> {
        if !self.sync.is_open() {
            return Ok(None);
        }
        let elapsed = self.sync.elapsed(Instant::now());
        match sync::evaluate(
            self.roster.len(),
            self.sync.history_seen(),
            elapsed,
            self.settle_ceiling,
        ) {
            Verdict::Wait => {
                debug!(contacts = self.roster.len(), elapsed = ?elapsed, "still settling");
                Ok(None)
            }
            Verdict::Export => {
                let snapshot = self.roster.snapshot();
                let summary =
                    export::write_contacts(&self.out_path, &snapshot).map_err(RunError::Export)?;
                Ok(Some(Exit::Outcome(RunOutcome::Exported(summary))))
            }
            Verdict::NoData => {
                info!("settle ceiling reached with no contacts");
                Ok(Some(Exit::Outcome(RunOutcome::NoData)))
            }
        }
    }
}

/// Run the orchestration with bounded reconnect.
///
/// `connect` produces a fresh event stream per attempt; each attempt gets a
/// fresh store and sync state.
pub async fn run_with_reconnect<F>(
    mut connect: F,
    out_path: &Path,
    poll_interval: Duration,
    settle_ceiling: Duration,
) -> Result<RunOutcome, RunError>
where
    F: FnMut() -> anyhow::Result<mpsc::Receiver<SessionEvent>>,
{
    for attempt in 1..=MAX_CONNECT_ATTEMPTS {
        let rx = connect().map_err(RunError::Connect)?;
        let runner = Runner::new(rx, out_path, poll_interval, settle_ceiling);
        match runner.run().await? {
            Exit::Outcome(outcome) => return Ok(outcome),
            Exit::Restart => {
                warn!(attempt, "restarting orchestration with a fresh store");
            }
        }
    }
    Err(RunError::ConnectExhausted(MAX_CONNECT_ATTEMPTS))
}

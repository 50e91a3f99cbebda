//! Replay event source: feeds captured NDJSON session events to the pipeline.
//!
//! The production transport runs out of process and logs its emitted events
//! one JSON object per line. Replaying a capture exercises the full
//! reconciliation + export path without any protocol dependency.
//!
//! CHANGELOG:
//! - 08/23/2026 - Initial implementation

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

use crate::session::SessionEvent;

/// Reads session events from an NDJSON capture file.
pub struct ReplaySource {
    path: PathBuf,
}

impl ReplaySource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Stream all events from the capture into `tx`, in file order.
    ///
    /// Blank lines are skipped; a malformed line fails the source with the
    /// offending line number.
    pub async fn run(self, tx: mpsc::Sender<SessionEvent>) -> Result<()> {
        let file = File::open(&self.path)
            .await
            .with_context(|| format!("Failed to open capture file: {:?}", self.path))?;
        let mut lines = BufReader::new(file).lines();

        let mut line_no = 0usize;
        while let Some(line) = lines.next_line().await? {
            line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            let event = SessionEvent::from_ndjson_line(&line)
                .with_context(|| format!("Capture line {}", line_no))?;
            debug!(line = line_no, event = event.event_type(), "replaying event");
            if tx.send(event).await.is_err() {
                // Receiver gone (run finished or interrupted); stop quietly.
                break;
            }
        }

        Ok(())
    }
}

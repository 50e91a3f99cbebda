//! wa-contact-export - WhatsApp contact export CLI.
//!
//! Consumes a session event stream (replayed from an NDJSON capture), merges
//! contact fragments into one record per identifier, and writes a sorted CSV
//! after a fixed settle window. The protocol transport itself lives outside
//! this binary.
//!
//! CHANGELOG:
//! - 08/23/2026 - Initial implementation

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::sync::mpsc;
use tracing::error;

use wa_contact_export::config;
use wa_contact_export::runner::{self, RunOutcome};
use wa_contact_export::session::replay::ReplaySource;
use wa_contact_export::sync;

/// Export WhatsApp contacts from a session event capture to CSV.
#[derive(Parser, Debug)]
#[command(name = "wa-contact-export")]
#[command(version, about, long_about = None)]
struct Cli {
    /// NDJSON session event capture to replay
    capture: PathBuf,

    /// Output CSV path (default: WA_EXPORT_MODE resolution)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Print the export summary as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let out_path = cli.out.clone().unwrap_or_else(config::default_output_path);

    let capture = cli.capture.clone();
    let connect = move || {
        let (tx, rx) = mpsc::channel(64);
        let source = ReplaySource::new(capture.clone());
        tokio::spawn(async move {
            if let Err(e) = source.run(tx).await {
                error!("event source failed: {:#}", e);
            }
        });
        Ok(rx)
    };

    let result = runner::run_with_reconnect(
        connect,
        &out_path,
        sync::POLL_INTERVAL,
        sync::SETTLE_CEILING,
    )
    .await;

    match result {
        Ok(RunOutcome::Exported(summary)) => {
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&summary).unwrap_or_else(|_| "{}".to_string())
                );
            } else {
                println!("Exported {} contacts to {:?}", summary.count, summary.path);
            }
            ExitCode::from(0)
        }
        Ok(RunOutcome::NoData) => {
            println!("No contacts received before the settle ceiling; nothing written.");
            println!("Check the session capture and retry.");
            ExitCode::from(0)
        }
        Ok(RunOutcome::Interrupted) => ExitCode::from(0),
        Err(e) => {
            eprintln!("Error: {:#}", anyhow::Error::from(e));
            ExitCode::from(1)
        }
    }
}

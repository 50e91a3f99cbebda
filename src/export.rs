//! CSV export of the reconciled contact set.
//!
//! Output contract: `Name,Phone Number` header, one row per contact, rows
//! ordered by display name using case-insensitive Unicode collation
//! (lowercased key, raw comparison as tiebreak). The file is overwritten in
//! full; the parent directory is created if absent.
//!
//! CHANGELOG:
//! - 08/23/2026 - Initial implementation

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::roster::ContactRecord;

/// Result of a successful export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub count: usize,
    /// RFC 3339 UTC timestamp of the write
    pub exported_at: String,
}

/// Write the final contact set to `path`, sorted and escaped.
///
/// Any write failure is fatal to the run; the caller aborts with exit code 1.
pub fn write_contacts(path: &Path, records: &[ContactRecord]) -> Result<ExportSummary> {
    let mut rows: Vec<&ContactRecord> = records.iter().collect();
    rows.sort_by(|a, b| {
        collation_key(&a.display_name)
            .cmp(&collation_key(&b.display_name))
            .then_with(|| a.display_name.cmp(&b.display_name))
    });

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
        }
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to open output file: {:?}", path))?;
    writer
        .write_record(["Name", "Phone Number"])
        .context("Failed to write CSV header")?;
    for record in &rows {
        writer
            .write_record([record.display_name.as_str(), record.phone.as_str()])
            .with_context(|| format!("Failed to write row for {}", record.phone))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush output file: {:?}", path))?;

    let summary = ExportSummary {
        path: path.to_path_buf(),
        count: rows.len(),
        exported_at: chrono::Utc::now().to_rfc3339(),
    };
    info!(path = ?summary.path, count = summary.count, "exported contacts");
    Ok(summary)
}

/// Case-insensitive collation key (Unicode lowercase).
fn collation_key(name: &str) -> String {
    name.to_lowercase()
}

//! Output path configuration.
//!
//! One environment toggle selects the output directory: production mode
//! writes to a fixed container path, otherwise a local default is used.
//!
//! CHANGELOG:
//! - 08/23/2026 - Initial implementation

use std::path::PathBuf;

/// Environment toggle selecting the output directory.
pub const MODE_ENV: &str = "WA_EXPORT_MODE";

/// Fixed output path used when `WA_EXPORT_MODE=production`.
pub const PRODUCTION_OUTPUT: &str = "/data/out/contacts.csv";

/// Output file name for the local default.
pub const OUTPUT_FILE: &str = "contacts.csv";

/// Resolve the output CSV path.
///
/// Tries in order:
/// 1. `WA_EXPORT_MODE=production` -> fixed container path
/// 2. `~/wa-export/contacts.csv`
/// 3. `./out/contacts.csv` when no home directory is available
pub fn default_output_path() -> PathBuf {
    if std::env::var(MODE_ENV)
        .map(|v| v.eq_ignore_ascii_case("production"))
        .unwrap_or(false)
    {
        return PathBuf::from(PRODUCTION_OUTPUT);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join("wa-export").join(OUTPUT_FILE);
    }

    PathBuf::from("out").join(OUTPUT_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test because the mode env var is process-global.
    #[test]
    fn test_mode_toggle_resolution() {
        std::env::set_var(MODE_ENV, "production");
        assert_eq!(default_output_path(), PathBuf::from(PRODUCTION_OUTPUT));

        std::env::set_var(MODE_ENV, "staging");
        let path = default_output_path();
        assert_ne!(path, PathBuf::from(PRODUCTION_OUTPUT));
        assert!(path.ends_with(OUTPUT_FILE));

        std::env::remove_var(MODE_ENV);
        assert!(default_output_path().ends_with(OUTPUT_FILE));
    }
}

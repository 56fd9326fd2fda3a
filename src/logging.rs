use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "hamprep.log";

/// `RUST_LOG` when set and parsable, otherwise `fallback`, otherwise `info`.
pub fn build_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Route tracing output to `<dir>/hamprep.log`. The terminal belongs to the
/// UI while it runs, so nothing is written to stdout or stderr.
pub fn init_file_logging(dir: &Path, fallback_filter: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(build_filter(fallback_filter))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow::anyhow!("installing log subscriber: {err}"))?;
    Ok(path)
}

/// Plain stderr logging for the maintenance commands that never enter the UI.
pub fn init_stderr_logging(fallback_filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_filter(fallback_filter))
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_fallback_filter_still_builds() {
        // Must not panic regardless of RUST_LOG in the environment
        let _ = build_filter("[[not a directive");
    }

    #[test]
    fn test_unwritable_log_dir_is_reported() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = init_file_logging(&file.path().join("logs"), "info").unwrap_err();
        assert!(format!("{err:#}").contains("creating"));
    }

    #[test]
    fn test_init_file_logging_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("logs");
        // A global subscriber may already be installed by another test
        if let Ok(path) = init_file_logging(&nested, "debug") {
            assert_eq!(path, nested.join(LOG_FILE));
        }
        assert!(nested.join(LOG_FILE).exists());
    }
}

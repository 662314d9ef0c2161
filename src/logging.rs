//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins when set; otherwise `default_level` applies. The TUI owns the
//! terminal while it runs, so it either logs to a file or keeps quiet.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt};

use crate::error::AppError;

/// Install the global subscriber.
///
/// With `log_file`, events are appended to that file (no ANSI colors);
/// otherwise they go to stderr.
pub fn init(default_level: &str, log_file: Option<&Path>) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let installed = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| AppError::new(2, format!("Failed to open log file '{}': {e}", path.display())))?;
            fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };

    // A subscriber may already be installed (tests, embedding); keep it.
    if let Err(err) = installed {
        tracing::debug!("tracing subscriber already set: {err}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_with_file_creates_it_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shipdash.log");
        init("warn", Some(&path)).unwrap();
        assert!(path.exists());
        init("warn", None).unwrap();
    }

    #[test]
    fn unwritable_log_file_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = init("warn", Some(&dir.path().join("missing").join("x.log"))).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}

//! Append-only error log in the working directory.
//!
//! Captures unexpected API response bodies and per-icon fetch failures for
//! post-hoc diagnosis, so the interactive output can stay short.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;

pub const ERROR_LOG_FILE: &str = "error_log.txt";

pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    /// Creates a log handle pointing at `./error_log.txt`.
    pub fn new() -> Self {
        Self::with_path(ERROR_LOG_FILE)
    }

    /// Creates a log handle with a custom path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one timestamped entry. The file is created on first use.
    ///
    /// Logging must never take the run down, so failures only reach the
    /// diagnostic stream.
    pub fn append(&self, entry: &str) {
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut f| {
                writeln!(
                    f,
                    "[{}] {}",
                    Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                    entry.trim_end()
                )
            });

        if let Err(e) = result {
            tracing::warn!(path = %self.path.display(), error = %e, "could not append to error log");
        }
    }
}

impl Default for ErrorLog {
    fn default() -> Self {
        Self::new()
    }
}

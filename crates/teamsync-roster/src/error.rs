//! Roster read errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while opening or reading a roster.
#[derive(Debug, Error)]
pub enum RosterError {
    /// The roster file does not exist.
    #[error("Roster file '{}' was not found", .path.display())]
    NotFound {
        /// Configured roster path.
        path: PathBuf,
    },

    /// The roster file exists but could not be opened.
    #[error("Failed to open roster file '{}': {source}", .path.display())]
    Open {
        /// Configured roster path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A row could not be read; no further rows are produced.
    #[error("Failed to read roster{}: {source}", .line.map(|l| format!(" at line {l}")).unwrap_or_default())]
    Read {
        /// Line the failure was reported at, when known.
        line: Option<u64>,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },
}

impl RosterError {
    /// Whether this is the missing-file case, which is reported separately
    /// from other read failures.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

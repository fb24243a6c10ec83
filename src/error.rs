//! Error types for git-sync
//!
//! Per-remote failures during a run are never surfaced through these types;
//! they are folded into [`crate::sync::OperationOutcome`] records instead.
//! Everything here is fatal to the invocation that produced it.

use thiserror::Error;

/// Result type alias used by the library modules
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors that stop a git-sync invocation
#[derive(Debug, Error)]
pub enum SyncError {
    /// Missing, unreadable or empty remote configuration
    #[error("{message}. Create one of: {}", candidates.join(", "))]
    Configuration {
        message: String,
        candidates: Vec<String>,
    },

    /// Every configured remote is disabled or invalid
    #[error("no enabled remotes configured")]
    EmptyRegistry,

    /// HEAD does not point at a named branch
    #[error("cannot determine the current branch (detached HEAD?). Check out a branch and retry")]
    DetachedHead,

    /// A named remote has no URL in the working copy
    #[error("source remote '{name}' does not exist. Run 'git-sync setup' first or pass the correct remote name")]
    RemoteNotFound { name: String },

    /// A required git invocation exited non-zero
    #[error("`{command}` failed: {stderr}")]
    VcsOperation { command: String, stderr: String },

    /// A malformed remote URL or configuration line
    #[error("line {line}: {reason}")]
    Validation { line: usize, reason: String },

    /// The git binary could not be located
    #[error("git executable '{0}' not found in PATH")]
    GitUnavailable(String),

    /// Tool settings failed to parse
    #[error("invalid settings: {0}")]
    Settings(#[from] figment::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// Build a configuration error that lists the accepted file names
    pub fn configuration(message: impl Into<String>) -> Self {
        SyncError::Configuration {
            message: message.into(),
            candidates: crate::config::CONFIG_FILE_NAMES
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

//! Error types for session management.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failures from invoking the terminal host binary.
#[derive(Error, Debug)]
pub enum HostError {
    /// The binary could not be started at all
    #[error("failed to run {binary}: {source}")]
    Spawn {
        binary: String,
        #[source]
        source: io::Error,
    },

    /// The binary ran and exited non-zero
    #[error("{command}: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// The binary did not answer in time
    #[error("{command} timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },
}

/// Errors surfaced by [`SessionManager`](crate::SessionManager) operations.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid session id '{id}': {reason}")]
    InvalidId { id: String, reason: &'static str },

    #[error("Directory not in allowed paths: {}", .0.display())]
    DirectoryNotAllowed(PathBuf),

    #[error("Directory does not exist: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Session '{0}' already exists")]
    AlreadyExists(String),

    #[error("Session '{0}' does not exist")]
    NotFound(String),

    #[error("Failed to create session: {0}")]
    CreateFailed(#[source] HostError),

    #[error(transparent)]
    Host(#[from] HostError),
}

impl SessionError {
    /// Whether this error means the target session is gone.
    pub fn is_not_found(&self) -> bool {
        matches!(self, SessionError::NotFound(_))
    }
}

/// Result type alias using [`SessionError`].
pub type Result<T> = std::result::Result<T, SessionError>;

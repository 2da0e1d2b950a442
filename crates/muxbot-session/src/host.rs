//! Terminal host abstraction.
//!
//! The host owns the real session state; everything here is a request to
//! an external multiplexer. [`TmuxHost`](crate::tmux::TmuxHost) is the
//! production implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::HostError;

/// Fixed pane geometry for new sessions. Wide enough that agent output
/// rarely wraps inside a capture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    pub cols: u16,
    pub rows: u16,
}

impl Geometry {
    pub const WIDE: Geometry = Geometry { cols: 250, rows: 50 };
}

/// Keys sent without literal-text handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecialKey {
    Escape,
    Interrupt,
    Enter,
}

impl SpecialKey {
    /// Key name as understood by `send-keys`.
    pub fn key_name(self) -> &'static str {
        match self {
            SpecialKey::Escape => "Escape",
            SpecialKey::Interrupt => "C-c",
            SpecialKey::Enter => "Enter",
        }
    }
}

/// One row of the host's session listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostSession {
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub directory: Option<PathBuf>,
}

/// Everything needed to start a session.
#[derive(Clone, Debug)]
pub struct SpawnRequest<'a> {
    pub name: &'a str,
    pub directory: &'a Path,
    pub command: &'a str,
    pub args: &'a [String],
    pub geometry: Geometry,
}

/// Operations on the external terminal multiplexer.
///
/// Implementations pass every value as its own argument, never through a
/// shell, and report non-zero exits as [`HostError::CommandFailed`] with
/// the host's diagnostic text.
#[async_trait]
pub trait TerminalHost: Send + Sync {
    /// Whether the host binary can be run at all. Never fails.
    async fn binary_available(&self) -> bool;

    /// Whether a session with exactly this name is running. Any failure is `false`.
    async fn exists(&self, name: &str) -> bool;

    /// Start a detached session running the request's command.
    async fn spawn(&self, request: SpawnRequest<'_>) -> Result<(), HostError>;

    /// Type `text` verbatim into the session, then press Enter.
    async fn send_text(&self, name: &str, text: &str) -> Result<(), HostError>;

    /// Press a single special key.
    async fn send_special_key(&self, name: &str, key: SpecialKey) -> Result<(), HostError>;

    /// Visible pane plus `scrollback_lines` of history, escape sequences intact.
    async fn capture_pane(&self, name: &str, scrollback_lines: usize) -> Result<String, HostError>;

    /// Terminate the session.
    async fn kill(&self, name: &str) -> Result<(), HostError>;

    /// Every session the host knows about, in any namespace.
    async fn list(&self) -> Result<Vec<HostSession>, HostError>;

    /// Command a human runs to attach to the session.
    fn attach_command(&self, name: &str) -> String;

    fn host_name(&self) -> &str;
}

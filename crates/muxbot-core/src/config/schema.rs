//! Configuration schema.
//!
//! Hierarchy: `Config` → `SessionsConfig`, `TmuxConfig`, `WorkspaceConfig`, `StreamConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration: loaded from `~/.muxbot/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub sessions: SessionsConfig,
    pub tmux: TmuxConfig,
    pub workspace: WorkspaceConfig,
    pub stream: StreamConfig,
}

// ─────────────────────────────────────────────
// Sessions
// ─────────────────────────────────────────────

/// Session lifecycle settings: which directories may host a session and
/// what each session runs.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionsConfig {
    /// Directory roots sessions may be created under. Empty = unrestricted.
    pub allowed_paths: Vec<String>,
    /// Agent CLI launched inside every new session.
    pub agent_command: String,
    /// Flags passed to the agent CLI.
    pub agent_args: Vec<String>,
    /// Scrollback lines for a one-off capture.
    pub capture_lines: usize,
    /// Scrollback lines for streaming reads.
    pub stream_lines: usize,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            allowed_paths: Vec::new(),
            agent_command: "claude".to_string(),
            agent_args: vec!["--dangerously-skip-permissions".to_string()],
            capture_lines: 100,
            stream_lines: 200,
        }
    }
}

// ─────────────────────────────────────────────
// Tmux
// ─────────────────────────────────────────────

/// How the tmux binary is invoked.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TmuxConfig {
    /// Binary name or absolute path.
    pub binary: String,
    /// Upper bound for a single tmux invocation, in seconds.
    pub command_timeout_secs: u64,
    /// Pause between typing text and pressing Enter, in milliseconds.
    pub enter_delay_ms: u64,
}

impl Default for TmuxConfig {
    fn default() -> Self {
        Self {
            binary: "tmux".to_string(),
            command_timeout_secs: 30,
            enter_delay_ms: 1500,
        }
    }
}

impl TmuxConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn enter_delay(&self) -> Duration {
        Duration::from_millis(self.enter_delay_ms)
    }
}

// ─────────────────────────────────────────────
// Workspace
// ─────────────────────────────────────────────

/// Guidance file seeded into session directories.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkspaceConfig {
    pub guidance_file: String,
    pub seed_guidance: bool,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            guidance_file: "CLAUDE.md".to_string(),
            seed_guidance: true,
        }
    }
}

// ─────────────────────────────────────────────
// Stream
// ─────────────────────────────────────────────

/// Output streaming (polling) settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreamConfig {
    /// Delay between two captures of a watched session.
    pub poll_interval_ms: u64,
    /// Largest chunk handed to a chat message.
    pub max_chunk_chars: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 2000,
            max_chunk_chars: 1900,
        }
    }
}

impl StreamConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

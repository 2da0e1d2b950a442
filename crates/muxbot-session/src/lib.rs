//! muxbot session layer: agent sessions hosted in tmux.
//!
//! This crate contains:
//! - **guard**: directory allowlist enforced before any session is created
//! - **host**: the `TerminalHost` trait and the `tmux` implementation
//! - **differ**: "what is new since the last capture" for pane output
//! - **registry**: 1:1 channel ↔ session links
//! - **manager**: `SessionManager`, the entry point for bot handlers
//! - **watch**: polling watcher that streams new output to a callback

pub mod differ;
pub mod error;
pub mod guard;
pub mod host;
mod locks;
pub mod manager;
pub mod registry;
pub mod tmux;
pub mod watch;

#[cfg(test)]
mod testing;

pub use differ::diff;
pub use error::{HostError, SessionError};
pub use guard::PathAccessGuard;
pub use host::{HostSession, SpecialKey, TerminalHost};
pub use manager::{SessionInfo, SessionManager, SESSION_PREFIX};
pub use registry::ChannelRegistry;
pub use tmux::TmuxHost;
pub use watch::{OnOutputFn, SessionWatcher, WatchExit};

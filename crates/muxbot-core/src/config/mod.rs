//! Configuration system: schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use muxbot_core::config;
//!
//! let cfg = config::load_config(None);
//! println!("Agent: {}", cfg.sessions.agent_command);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{get_config_path, load_config, save_config};
pub use schema::{Config, SessionsConfig, StreamConfig, TmuxConfig, WorkspaceConfig};

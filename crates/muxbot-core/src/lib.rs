//! muxbot core: configuration, path helpers, and workspace seeding.
//!
//! This crate contains:
//! - **config**: JSON config schema, loader, and env var overrides
//! - **utils**: data directory layout and `~` expansion
//! - **workspace**: guidance-file seeding for session working directories

pub mod config;
pub mod utils;
pub mod workspace;

pub use config::Config;

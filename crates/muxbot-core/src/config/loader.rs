//! Config loader: reads `~/.muxbot/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.muxbot/config.json`
//! 3. Environment variables `MUXBOT_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    load_config_from_path(&config_path)
}

/// Load config from a specific file path.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return apply_env_overrides(Config::default());
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return apply_env_overrides(Config::default());
        }
    };

    let config: Config = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return apply_env_overrides(Config::default());
        }
    };

    apply_env_overrides(config)
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `MUXBOT_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `MUXBOT_SESSIONS__ALLOWED_PATHS` → `sessions.allowed_paths` (comma separated)
/// - `MUXBOT_SESSIONS__AGENT_COMMAND` → `sessions.agent_command`
/// - `MUXBOT_TMUX__BINARY` → `tmux.binary`
/// - `MUXBOT_TMUX__COMMAND_TIMEOUT_SECS` → `tmux.command_timeout_secs`
/// - `MUXBOT_TMUX__ENTER_DELAY_MS` → `tmux.enter_delay_ms`
/// - `MUXBOT_STREAM__POLL_INTERVAL_MS` → `stream.poll_interval_ms`
fn apply_env_overrides(mut config: Config) -> Config {
    // Sessions
    if let Ok(val) = std::env::var("MUXBOT_SESSIONS__ALLOWED_PATHS") {
        config.sessions.allowed_paths = parse_path_list(&val);
    }
    if let Ok(val) = std::env::var("MUXBOT_SESSIONS__AGENT_COMMAND") {
        config.sessions.agent_command = val;
    }

    // Tmux
    if let Ok(val) = std::env::var("MUXBOT_TMUX__BINARY") {
        config.tmux.binary = val;
    }
    if let Ok(val) = std::env::var("MUXBOT_TMUX__COMMAND_TIMEOUT_SECS") {
        if let Ok(n) = val.parse::<u64>() {
            config.tmux.command_timeout_secs = n;
        }
    }
    if let Ok(val) = std::env::var("MUXBOT_TMUX__ENTER_DELAY_MS") {
        if let Ok(n) = val.parse::<u64>() {
            config.tmux.enter_delay_ms = n;
        }
    }

    // Stream
    if let Ok(val) = std::env::var("MUXBOT_STREAM__POLL_INTERVAL_MS") {
        if let Ok(n) = val.parse::<u64>() {
            config.stream.poll_interval_ms = n;
        }
    }

    config
}

/// Split a comma-separated path list, dropping empty entries.
fn parse_path_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

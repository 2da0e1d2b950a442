//! Utility helpers: data directory layout and path resolution.

use std::path::{Path, PathBuf};

/// Get the muxbot data directory (e.g. `~/.muxbot/`).
pub fn get_data_path() -> PathBuf {
    let home = dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".muxbot")
}

/// Expand a leading `~` to the home directory in a path string.
///
/// Only `~` and `~/...` are expanded; `~user` forms are left untouched.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Expand `~`, anchor relative paths at the current directory, and
/// canonicalize when the path exists.
///
/// Non-existent paths are returned absolute but unresolved so callers can
/// still report them.
pub fn resolve_path(path: &str) -> PathBuf {
    let expanded = expand_home(path);
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    };
    canonical_or_self(&absolute)
}

/// `canonicalize` with a fallback to the input on failure.
pub fn canonical_or_self(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

//! `muxbot onboard`: write the default configuration.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use muxbot_core::config::{get_config_path, save_config};
use muxbot_core::Config;

/// Run the onboard command.
pub fn run() -> Result<()> {
    println!();
    println!("{}", "muxbot setup".cyan().bold());
    println!();

    let config_path = get_config_path();
    write_default_config(&config_path)?;

    println!();
    println!(
        "{}",
        "  Add directories to sessions.allowedPaths, then run `muxbot create`.".green()
    );
    println!();

    Ok(())
}

/// Write a default config at `path` unless one exists. Returns `true` if written.
fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        println!("  {} config already exists at {}", "✓".green(), path.display());
        return Ok(false);
    }

    save_config(&Config::default(), Some(path))?;
    println!("  {} created config at {}", "✓".green(), path.display());
    Ok(true)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_config_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert!(write_default_config(&path).unwrap());
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("allowedPaths"));
    }

    #[test]
    fn keeps_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{}").unwrap();
        assert!(!write_default_config(&path).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }
}

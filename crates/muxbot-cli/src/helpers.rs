//! Shared CLI helpers: manager construction and session formatting.

use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use colored::Colorize;

use muxbot_core::Config;
use muxbot_session::{SessionInfo, SessionManager, TmuxHost};

/// Build a `SessionManager` on tmux from the loaded configuration.
pub fn build_manager(config: &Config) -> Arc<SessionManager> {
    let host = Arc::new(TmuxHost::from_config(&config.tmux));
    Arc::new(SessionManager::new(host, &config.sessions))
}

/// Creation time in local time, or a dash when unknown.
pub fn format_created(created_at: Option<DateTime<Utc>>) -> String {
    match created_at {
        Some(ts) => ts
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        None => "-".to_string(),
    }
}

/// Print one session as a table row.
pub fn print_session_row(info: &SessionInfo) {
    let directory = info
        .directory
        .as_ref()
        .map(|d| d.display().to_string())
        .unwrap_or_else(|| "-".to_string());
    let channel = info.channel_id.as_deref().unwrap_or("-");

    println!(
        "  {:<20} {:<16} {:<17} {}",
        info.id.bold(),
        channel.cyan(),
        format_created(info.created_at).dimmed(),
        directory
    );
}

/// Print the details shown after a session is created.
pub fn print_created(info: &SessionInfo) {
    println!();
    println!("  {} session {} started", "✓".green(), info.id.bold());
    if let Some(dir) = &info.directory {
        println!("  {:<10} {}", "Dir:".bold(), dir.display());
    }
    if let Some(channel) = &info.channel_id {
        println!("  {:<10} {}", "Channel:".bold(), channel);
    }
    println!("  {:<10} {}", "Attach:".bold(), info.attach_command.cyan());
    println!();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_created_unknown() {
        assert_eq!(format_created(None), "-");
    }

    #[test]
    fn format_created_known() {
        let ts = DateTime::<Utc>::from_timestamp(1_700_000_000, 0);
        let text = format_created(ts);
        assert!(text.starts_with("2023-11-1"));
        assert_eq!(text.len(), "2023-11-14 22:13".len());
    }
}

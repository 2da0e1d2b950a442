//! Session subcommands: `list`, `create`, `send`, `escape`, `capture`, `kill`, `watch`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::warn;

use muxbot_core::config::load_config;
use muxbot_core::workspace::ensure_guidance_file;
use muxbot_core::Config;
use muxbot_session::watch::OnOutputFn;
use muxbot_session::{SessionManager, SessionWatcher, WatchExit};

use crate::helpers;

/// Load config and build a manager, failing early if tmux is missing.
async fn manager() -> Result<(Config, Arc<SessionManager>)> {
    let config = load_config(None);
    let manager = helpers::build_manager(&config);
    if !manager.check_host_available().await {
        anyhow::bail!(
            "tmux binary '{}' is not available; install tmux or set tmux.binary",
            config.tmux.binary
        );
    }
    Ok((config, manager))
}

// ─────────────────────────────────────────────
// list
// ─────────────────────────────────────────────

/// `muxbot list`
pub async fn list(json: bool) -> Result<()> {
    let (_, manager) = manager().await?;
    let sessions = manager.list_sessions().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    println!();
    if sessions.is_empty() {
        println!("  {}", "No sessions running.".dimmed());
    } else {
        println!(
            "  {:<20} {:<16} {:<17} {}",
            "ID".bold(),
            "CHANNEL".bold(),
            "CREATED".bold(),
            "DIRECTORY".bold()
        );
        for info in &sessions {
            helpers::print_session_row(info);
        }
    }
    println!();
    Ok(())
}

// ─────────────────────────────────────────────
// create / kill
// ─────────────────────────────────────────────

/// `muxbot create <id> <dir> [--channel C]`
pub async fn create(id: &str, directory: &str, channel: Option<&str>) -> Result<()> {
    let (config, manager) = manager().await?;
    let info = manager.create_session(id, directory, channel).await?;

    if config.workspace.seed_guidance {
        if let Some(dir) = &info.directory {
            // The session is already running; a seeding failure is not fatal.
            match ensure_guidance_file(dir, &config.workspace.guidance_file) {
                Ok(true) => println!(
                    "  {} created {}",
                    "✓".green(),
                    config.workspace.guidance_file
                ),
                Ok(false) => {}
                Err(e) => warn!(error = %e, "could not seed guidance file"),
            }
        }
    }

    helpers::print_created(&info);
    Ok(())
}

/// `muxbot kill <id>`
pub async fn kill(id: &str) -> Result<()> {
    let (_, manager) = manager().await?;
    manager.kill_session(id).await?;
    println!("  {} session {} killed", "✓".green(), id.bold());
    Ok(())
}

// ─────────────────────────────────────────────
// input / output
// ─────────────────────────────────────────────

/// `muxbot send <id> <text...>`
pub async fn send(id: &str, text: &str) -> Result<()> {
    let (_, manager) = manager().await?;
    manager.send_to_session(id, text).await?;
    println!("  {} sent to {}", "✓".green(), id.bold());
    Ok(())
}

/// `muxbot escape <id>`
pub async fn escape(id: &str) -> Result<()> {
    let (_, manager) = manager().await?;
    manager.send_escape(id).await?;
    println!("  {} escape sent to {}", "✓".green(), id.bold());
    Ok(())
}

/// `muxbot capture <id> [--lines N]`
pub async fn capture(id: &str, lines: Option<usize>) -> Result<()> {
    let (_, manager) = manager().await?;
    let output = manager.capture_output(id, lines).await?;
    println!("{output}");
    Ok(())
}

/// `muxbot watch <id> [--interval-ms N]`
pub async fn watch(id: &str, interval_ms: Option<u64>) -> Result<()> {
    let (config, manager) = manager().await?;
    let interval = interval_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.stream.poll_interval());

    let on_output: OnOutputFn = Arc::new(|chunk: String| {
        Box::pin(async move {
            println!("{chunk}");
            println!("{}", "───".dimmed());
        })
    });

    let watcher = Arc::new(SessionWatcher::new(
        manager,
        id,
        interval,
        config.stream.max_chunk_chars,
        on_output,
    ));

    eprintln!(
        "{}",
        format!("Watching {id} (Ctrl-C to stop)...").dimmed()
    );

    let runner = watcher.clone();
    let handle = tokio::spawn(async move { runner.run().await });

    let stopper = watcher.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stopper.stop();
        }
    });

    match handle.await.context("watcher task failed")? {
        WatchExit::Stopped => eprintln!("{}", "Stopped.".dimmed()),
        WatchExit::SessionGone => {
            eprintln!("  {} session {} is not running", "✗".red(), id.bold())
        }
    }
    Ok(())
}

//! `muxbot status`: show configuration and tmux availability.

use anyhow::Result;
use colored::Colorize;

use muxbot_core::config::{get_config_path, load_config};

/// Run the status command.
pub async fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();
    let manager = crate::helpers::build_manager(&config);

    println!();
    println!("{}", "muxbot status".cyan().bold());
    println!();

    // Config
    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found, using defaults)".yellow().to_string()
        }
    );

    // tmux
    let available = manager.check_host_available().await;
    println!(
        "  {:<18} {} {}",
        "tmux:".bold(),
        config.tmux.binary,
        if available {
            "✓".green().to_string()
        } else {
            "(not available)".red().to_string()
        }
    );

    // Agent
    println!(
        "  {:<18} {} {}",
        "Agent:".bold(),
        config.sessions.agent_command,
        config.sessions.agent_args.join(" ").dimmed()
    );

    // Allowlist
    println!();
    println!("  {}", "Allowed paths:".bold());
    let roots = manager.allowed_paths().await;
    if roots.is_empty() {
        println!("    {}", "(none, any directory is allowed)".yellow());
    } else {
        for root in roots {
            println!("    {}", root.display());
        }
    }

    // Sessions
    if available {
        let count = manager.list_sessions().await.len();
        println!();
        println!("  {:<18} {}", "Sessions:".bold(), count);
    }

    println!();

    Ok(())
}

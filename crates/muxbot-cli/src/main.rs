//! muxbot CLI: entry point.
//!
//! # Commands
//!
//! - `muxbot status`: show configuration and tmux availability
//! - `muxbot onboard`: write the default config
//! - `muxbot list | create | send | escape | capture | kill | watch`: drive sessions

mod helpers;
mod onboard;
mod sessions_cmd;
mod status;

use anyhow::Result;
use clap::{Parser, Subcommand};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// muxbot: agent CLI sessions in tmux, driven from chat
#[derive(Parser)]
#[command(name = "muxbot", version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true, default_value_t = false)]
    logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show configuration and tmux status
    Status,

    /// Write the default configuration
    Onboard,

    /// List running sessions
    List {
        /// Print JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Start a new agent session
    Create {
        /// Session id (letters, digits, '-' and '_')
        id: String,

        /// Working directory for the agent
        directory: String,

        /// Channel to show as linked. Links live in memory, so this one ends with the command
        #[arg(short, long)]
        channel: Option<String>,
    },

    /// Type text into a session and press Enter
    Send {
        id: String,

        /// Text to send (joined with spaces)
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },

    /// Press Escape in a session
    Escape { id: String },

    /// Print the current pane contents
    Capture {
        id: String,

        /// Scrollback lines to include
        #[arg(short, long)]
        lines: Option<usize>,
    },

    /// Terminate a session
    Kill { id: String },

    /// Stream new output until Ctrl-C or the session ends
    Watch {
        id: String,

        /// Poll interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,
    },
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.logs);

    match cli.command {
        Commands::Status => status::run().await,
        Commands::Onboard => onboard::run(),
        Commands::List { json } => sessions_cmd::list(json).await,
        Commands::Create {
            id,
            directory,
            channel,
        } => sessions_cmd::create(&id, &directory, channel.as_deref()).await,
        Commands::Send { id, text } => sessions_cmd::send(&id, &text.join(" ")).await,
        Commands::Escape { id } => sessions_cmd::escape(&id).await,
        Commands::Capture { id, lines } => sessions_cmd::capture(&id, lines).await,
        Commands::Kill { id } => sessions_cmd::kill(&id).await,
        Commands::Watch { id, interval_ms } => sessions_cmd::watch(&id, interval_ms).await,
    }
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("muxbot=debug,muxbot_core=debug,muxbot_session=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

//! Workspace seeding: drop a guidance file into a session directory.
//!
//! The agent CLI reads a project-local guidance file on start-up. New session
//! directories get a template copy so the agent knows it is being driven
//! through a chat channel. Existing files are never touched.

use std::path::Path;

use tracing::{debug, info};

/// Create `dir/<file_name>` from the default template if it doesn't exist.
///
/// Returns `true` if the file was created.
pub fn ensure_guidance_file(dir: &Path, file_name: &str) -> std::io::Result<bool> {
    let path = dir.join(file_name);
    if path.exists() {
        debug!(path = %path.display(), "guidance file already present");
        return Ok(false);
    }

    std::fs::write(&path, GUIDANCE_TEMPLATE)?;
    info!(path = %path.display(), "seeded guidance file");
    Ok(true)
}

// ─────────────────────────────────────────────
// Templates
// ─────────────────────────────────────────────

const GUIDANCE_TEMPLATE: &str = r#"# Session Guidance

This session is driven remotely from a chat channel.

- Messages arrive as typed input; there is no one watching the terminal.
- Keep progress updates short, they are relayed back as chat messages.
- Ask before running destructive commands.
"#;

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

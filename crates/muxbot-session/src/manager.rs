//! Session manager: lifecycle, addressing, input, and output of agent sessions.
//!
//! The terminal host is the source of truth for whether a session exists.
//! Every mutating call re-checks existence with the host instead of trusting
//! anything cached here. The only state owned by the manager is:
//!
//! - the channel ↔ session registry,
//! - the last full capture per session (for [`SessionManager::get_new_output`]),
//! - the directory allowlist.
//!
//! Each manager owns its own copies, so independent instances never interfere.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use muxbot_core::config::SessionsConfig;
use muxbot_core::utils::resolve_path;
use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, info, warn};

use crate::differ;
use crate::error::{Result, SessionError};
use crate::guard::PathAccessGuard;
use crate::host::{Geometry, SpawnRequest, SpecialKey, TerminalHost};
use crate::locks::KeyedLocks;
use crate::registry::ChannelRegistry;

/// Namespace tag prepended to every session id to form the tmux session name.
pub const SESSION_PREFIX: &str = "muxbot-";

/// Longest accepted session id.
pub const MAX_ID_LEN: usize = 64;

// ─────────────────────────────────────────────
// SessionInfo
// ─────────────────────────────────────────────

/// Descriptor of a running session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    /// Caller-facing id (no prefix).
    pub id: String,
    /// Name of the session inside the multiplexer.
    pub multiplexer_name: String,
    /// Working directory the session was started in.
    pub directory: Option<PathBuf>,
    /// Channel currently linked to the session.
    pub channel_id: Option<String>,
    /// Creation time reported by the multiplexer.
    pub created_at: Option<DateTime<Utc>>,
    /// Shell command that attaches a terminal to the session.
    pub attach_command: String,
}

/// Multiplexer session name for `id`.
pub fn multiplexer_name(id: &str) -> String {
    format!("{SESSION_PREFIX}{id}")
}

/// Check that `id` can be used as a multiplexer name suffix.
pub fn validate_id(id: &str) -> Result<()> {
    let reason = if id.is_empty() {
        "must not be empty"
    } else if id.len() > MAX_ID_LEN {
        "longer than 64 characters"
    } else if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        "only letters, digits, '-' and '_' are allowed"
    } else {
        return Ok(());
    };
    Err(SessionError::InvalidId {
        id: id.to_string(),
        reason,
    })
}

// ─────────────────────────────────────────────
// SessionManager
// ─────────────────────────────────────────────

/// Creates, addresses, feeds, reads, and kills agent sessions on a terminal host.
pub struct SessionManager {
    host: Arc<dyn TerminalHost>,
    /// Agent CLI started in every session.
    agent_command: String,
    /// Flags for the agent CLI.
    agent_args: Vec<String>,
    /// Default scrollback for `capture_output`.
    capture_lines: usize,
    /// Default scrollback for `get_new_output`.
    stream_lines: usize,
    guard: RwLock<PathAccessGuard>,
    channels: RwLock<ChannelRegistry>,
    /// Last full capture per session id.
    last_output: Mutex<HashMap<String, String>>,
    locks: KeyedLocks,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("host", &self.host.host_name())
            .field("agent_command", &self.agent_command)
            .field("agent_args", &self.agent_args)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Create a manager on `host` using the `sessions` section of the config.
    pub fn new(host: Arc<dyn TerminalHost>, config: &SessionsConfig) -> Self {
        let guard = PathAccessGuard::new(&config.allowed_paths);
        if guard.is_unrestricted() {
            warn!("no allowed paths configured; sessions may be created in any directory");
        }

        Self {
            host,
            agent_command: config.agent_command.clone(),
            agent_args: config.agent_args.clone(),
            capture_lines: config.capture_lines,
            stream_lines: config.stream_lines,
            guard: RwLock::new(guard),
            channels: RwLock::new(ChannelRegistry::new()),
            last_output: Mutex::new(HashMap::new()),
            locks: KeyedLocks::default(),
        }
    }

    /// Whether the terminal host binary is usable.
    pub async fn check_host_available(&self) -> bool {
        self.host.binary_available().await
    }

    /// Replace the directory allowlist. An empty list lifts all restrictions.
    pub async fn set_allowed_paths<I, S>(&self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut guard = self.guard.write().await;
        guard.configure(paths);
        if guard.is_unrestricted() {
            warn!("allowed paths cleared; sessions may be created in any directory");
        } else {
            info!(count = guard.roots().len(), "allowed paths updated");
        }
    }

    /// Normalized allowlist currently in force.
    pub async fn allowed_paths(&self) -> Vec<PathBuf> {
        self.guard.read().await.roots().to_vec()
    }

    // ─────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────

    /// Start a new agent session in `directory`, optionally linked to `channel_id`.
    pub async fn create_session(
        &self,
        id: &str,
        directory: &str,
        channel_id: Option<&str>,
    ) -> Result<SessionInfo> {
        validate_id(id)?;

        let directory = resolve_path(directory);
        if !self.guard.read().await.is_allowed(&directory) {
            warn!(session = %id, dir = %directory.display(), "directory rejected by allowlist");
            return Err(SessionError::DirectoryNotAllowed(directory));
        }
        if !directory.is_dir() {
            return Err(SessionError::DirectoryNotFound(directory));
        }

        let _session_lock = self.lock_session(id).await;
        let _channel_lock = match channel_id {
            Some(channel) => Some(self.lock_channel(channel).await),
            None => None,
        };

        let name = multiplexer_name(id);
        if self.host.exists(&name).await {
            return Err(SessionError::AlreadyExists(id.to_string()));
        }

        self.host
            .spawn(SpawnRequest {
                name: &name,
                directory: &directory,
                command: &self.agent_command,
                args: &self.agent_args,
                geometry: Geometry::WIDE,
            })
            .await
            .map_err(SessionError::CreateFailed)?;

        if let Some(channel) = channel_id {
            self.channels.write().await.link(id, channel);
        }
        self.last_output.lock().await.remove(id);

        let created_at = match self.host.list().await {
            Ok(sessions) => sessions
                .into_iter()
                .find(|s| s.name == name)
                .and_then(|s| s.created_at),
            Err(e) => {
                debug!(error = %e, "could not read creation time");
                None
            }
        }
        .or_else(|| Some(Utc::now()));

        info!(
            session = %id,
            dir = %directory.display(),
            channel = channel_id.unwrap_or("-"),
            "session created"
        );

        Ok(SessionInfo {
            id: id.to_string(),
            attach_command: self.host.attach_command(&name),
            multiplexer_name: name,
            directory: Some(directory),
            channel_id: channel_id.map(String::from),
            created_at,
        })
    }

    /// Terminate a session and forget its channel link and cached output.
    pub async fn kill_session(&self, id: &str) -> Result<()> {
        let _lock = self.lock_session(id).await;
        let name = self.require_session(id).await?;

        self.host.kill(&name).await?;

        let channel = self.channels.write().await.unlink_session(id);
        self.last_output.lock().await.remove(id);
        info!(session = %id, channel = channel.as_deref().unwrap_or("-"), "session killed");
        Ok(())
    }

    // ─────────────────────────────────────────
    // Input
    // ─────────────────────────────────────────

    /// Type `text` into the session and press Enter.
    pub async fn send_to_session(&self, id: &str, text: &str) -> Result<()> {
        let _lock = self.lock_session(id).await;
        let name = self.require_session(id).await?;

        self.host.send_text(&name, text).await?;
        debug!(session = %id, chars = text.chars().count(), "text sent");
        Ok(())
    }

    /// Press Escape in the session (interrupts the agent's current turn).
    pub async fn send_escape(&self, id: &str) -> Result<()> {
        self.send_key(id, SpecialKey::Escape).await
    }

    /// Press Ctrl-C in the session.
    pub async fn send_interrupt(&self, id: &str) -> Result<()> {
        self.send_key(id, SpecialKey::Interrupt).await
    }

    async fn send_key(&self, id: &str, key: SpecialKey) -> Result<()> {
        let _lock = self.lock_session(id).await;
        let name = self.require_session(id).await?;

        self.host.send_special_key(&name, key).await?;
        debug!(session = %id, key = key.key_name(), "key sent");
        Ok(())
    }

    // ─────────────────────────────────────────
    // Output
    // ─────────────────────────────────────────

    /// Full capture of the pane plus `lines` of scrollback (default from config).
    pub async fn capture_output(&self, id: &str, lines: Option<usize>) -> Result<String> {
        let name = self.require_session(id).await?;
        let lines = lines.unwrap_or(self.capture_lines);
        Ok(self.host.capture_pane(&name, lines).await?)
    }

    /// Output that appeared since the previous call for this session.
    ///
    /// The first call only records a baseline and returns `None`.
    pub async fn get_new_output(&self, id: &str, lines: Option<usize>) -> Result<Option<String>> {
        let name = self.require_session(id).await?;
        let lines = lines.unwrap_or(self.stream_lines);
        let current = self.host.capture_pane(&name, lines).await?;

        let previous = self
            .last_output
            .lock()
            .await
            .insert(id.to_string(), current.clone())
            .unwrap_or_default();

        Ok(differ::diff(&previous, &current))
    }

    // ─────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────

    /// Sessions in this manager's namespace. A host failure yields an empty list.
    pub async fn list_sessions(&self) -> Vec<SessionInfo> {
        let sessions = match self.host.list().await {
            Ok(sessions) => sessions,
            Err(e) => {
                warn!(error = %e, "listing sessions failed");
                return Vec::new();
            }
        };

        let channels = self.channels.read().await;
        sessions
            .into_iter()
            .filter_map(|s| {
                // Names no other operation could address are not ours.
                let id = s
                    .name
                    .strip_prefix(SESSION_PREFIX)
                    .filter(|id| validate_id(id).is_ok())?
                    .to_string();
                Some(SessionInfo {
                    channel_id: channels.channel_for(&id).map(String::from),
                    attach_command: self.host.attach_command(&s.name),
                    multiplexer_name: s.name,
                    directory: s.directory,
                    created_at: s.created_at,
                    id,
                })
            })
            .collect()
    }

    /// Look up one session. Missing sessions are `None`, not an error.
    pub async fn get_session(&self, id: &str) -> Option<SessionInfo> {
        if validate_id(id).is_err() || !self.host.exists(&multiplexer_name(id)).await {
            return None;
        }
        self.list_sessions().await.into_iter().find(|s| s.id == id)
    }

    /// Session linked to `channel_id`, if it is still running.
    pub async fn get_session_by_channel(&self, channel_id: &str) -> Option<SessionInfo> {
        let id = self.session_for_channel(channel_id).await?;
        self.get_session(&id).await
    }

    // ─────────────────────────────────────────
    // Channel links
    // ─────────────────────────────────────────

    /// Link a channel to a session, replacing earlier links of either side.
    ///
    /// The session is not required to be running, so links can be restored
    /// from the bot's own storage before sessions are probed.
    pub async fn link_channel(&self, id: &str, channel_id: &str) -> Result<()> {
        validate_id(id)?;
        let _session_lock = self.lock_session(id).await;
        let _channel_lock = self.lock_channel(channel_id).await;

        self.channels.write().await.link(id, channel_id);
        debug!(session = %id, channel = %channel_id, "channel linked");
        Ok(())
    }

    /// Drop the link held by `channel_id`. Returns the session it pointed to.
    pub async fn unlink_channel(&self, channel_id: &str) -> Option<String> {
        let _lock = self.lock_channel(channel_id).await;
        let session = self.channels.write().await.unlink(channel_id);
        if let Some(ref id) = session {
            debug!(session = %id, channel = %channel_id, "channel unlinked");
        }
        session
    }

    pub async fn session_for_channel(&self, channel_id: &str) -> Option<String> {
        self.channels
            .read()
            .await
            .session_for(channel_id)
            .map(String::from)
    }

    pub async fn channel_for_session(&self, id: &str) -> Option<String> {
        self.channels.read().await.channel_for(id).map(String::from)
    }

    // ─────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────

    /// Validate `id` and confirm with the host that it is running.
    async fn require_session(&self, id: &str) -> Result<String> {
        validate_id(id)?;
        let name = multiplexer_name(id);
        if !self.host.exists(&name).await {
            return Err(SessionError::NotFound(id.to_string()));
        }
        Ok(name)
    }

    // Session keys are always taken before channel keys.
    async fn lock_session(&self, id: &str) -> OwnedMutexGuard<()> {
        self.locks.lock(&format!("session:{id}")).await
    }

    async fn lock_channel(&self, channel_id: &str) -> OwnedMutexGuard<()> {
        self.locks.lock(&format!("channel:{channel_id}")).await
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

//! Session watcher: polls a session and streams new output to a callback.
//!
//! The watcher is the push side of [`SessionManager::get_new_output`]: on every
//! tick it asks for the delta, splits it into chat-sized chunks, and hands each
//! chunk to the callback in order.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::manager::SessionManager;

// ─────────────────────────────────────────────
// Callback type
// ─────────────────────────────────────────────

/// Callback invoked with each chunk of new output.
pub type OnOutputFn =
    Arc<dyn Fn(String) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Why [`SessionWatcher::run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchExit {
    /// `stop()` was called.
    Stopped,
    /// The session no longer exists.
    SessionGone,
}

// ─────────────────────────────────────────────
// SessionWatcher
// ─────────────────────────────────────────────

pub struct SessionWatcher {
    manager: Arc<SessionManager>,
    session_id: String,
    interval: Duration,
    max_chunk_chars: usize,
    on_output: OnOutputFn,
    shutdown: Arc<Notify>,
}

impl SessionWatcher {
    pub fn new(
        manager: Arc<SessionManager>,
        session_id: impl Into<String>,
        interval: Duration,
        max_chunk_chars: usize,
        on_output: OnOutputFn,
    ) -> Self {
        Self {
            manager,
            session_id: session_id.into(),
            interval,
            max_chunk_chars,
            on_output,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Poll until stopped or until the session disappears.
    pub async fn run(&self) -> WatchExit {
        // Baseline: only output produced after this point is reported.
        if let Err(e) = self.manager.get_new_output(&self.session_id, None).await {
            if e.is_not_found() {
                info!(session = %self.session_id, "session not running; nothing to watch");
                return WatchExit::SessionGone;
            }
            warn!(session = %self.session_id, error = %e, "initial capture failed");
        }

        info!(
            session = %self.session_id,
            interval_ms = self.interval.as_millis() as u64,
            "watching session"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.shutdown.notified() => {
                    info!(session = %self.session_id, "watcher stopped");
                    return WatchExit::Stopped;
                }
            }

            match self.manager.get_new_output(&self.session_id, None).await {
                Ok(Some(output)) => {
                    let chunks = split_message(&output, self.max_chunk_chars);
                    debug!(session = %self.session_id, chunks = chunks.len(), "new output");
                    for chunk in chunks {
                        (self.on_output)(chunk).await;
                    }
                }
                Ok(None) => {}
                Err(e) if e.is_not_found() => {
                    info!(session = %self.session_id, "session ended");
                    return WatchExit::SessionGone;
                }
                Err(e) => {
                    warn!(session = %self.session_id, error = %e, "capture failed");
                }
            }
        }
    }

    /// Ask a running (or about to run) watcher to return.
    pub fn stop(&self) {
        // notify_one keeps a permit if the loop is mid-poll.
        self.shutdown.notify_one();
    }
}

/// Split `text` into chunks of at most `max_chars` characters, preferring
/// to break after a newline.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        let limit = match remaining.char_indices().nth(max_chars) {
            Some((idx, _)) => idx,
            None => {
                chunks.push(remaining.to_string());
                break;
            }
        };

        let split_at = remaining[..limit]
            .rfind('\n')
            .filter(|&i| i > 0)
            .map(|i| i + 1)
            .unwrap_or(limit);

        let chunk = remaining[..split_at].trim_end_matches('\n');
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }
        remaining = &remaining[split_at..];
    }

    chunks
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

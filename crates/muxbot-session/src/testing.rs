//! In-memory [`TerminalHost`] double for unit tests.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::HostError;
use crate::host::{HostSession, SpawnRequest, SpecialKey, TerminalHost};

/// One recorded host call, with every argument as it was received.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Call {
    Exists(String),
    Spawn {
        name: String,
        directory: PathBuf,
        command: String,
        args: Vec<String>,
    },
    SendText(String, String),
    SendKey(String, SpecialKey),
    Capture(String, usize),
    Kill(String),
    List,
}

#[derive(Default)]
pub(crate) struct FakeHost {
    pub calls: Mutex<Vec<Call>>,
    pub sessions: Mutex<HashMap<String, HostSession>>,
    /// Captures handed out in order; the last one repeats.
    pub captures: Mutex<VecDeque<String>>,
    pub spawn_error: Mutex<Option<String>>,
    pub kill_error: Mutex<Option<String>>,
    pub list_fails: Mutex<bool>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend a session was started by someone else.
    pub fn add_session(&self, name: &str, created_at: Option<DateTime<Utc>>) {
        self.sessions.lock().unwrap().insert(
            name.to_string(),
            HostSession {
                name: name.to_string(),
                created_at,
                directory: Some(PathBuf::from("/srv/elsewhere")),
            },
        );
    }

    /// Pretend a session died outside the manager.
    pub fn drop_session(&self, name: &str) {
        self.sessions.lock().unwrap().remove(name);
    }

    pub fn push_capture(&self, text: &str) {
        self.captures.lock().unwrap().push_back(text.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn spawn_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Spawn { .. }))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn require(&self, name: &str, command: &str) -> Result<(), HostError> {
        if self.sessions.lock().unwrap().contains_key(name) {
            Ok(())
        } else {
            Err(HostError::CommandFailed {
                command: command.to_string(),
                stderr: format!("can't find session: {name}"),
            })
        }
    }
}

#[async_trait]
impl TerminalHost for FakeHost {
    async fn binary_available(&self) -> bool {
        true
    }

    async fn exists(&self, name: &str) -> bool {
        self.record(Call::Exists(name.to_string()));
        self.sessions.lock().unwrap().contains_key(name)
    }

    async fn spawn(&self, request: SpawnRequest<'_>) -> Result<(), HostError> {
        self.record(Call::Spawn {
            name: request.name.to_string(),
            directory: request.directory.to_path_buf(),
            command: request.command.to_string(),
            args: request.args.to_vec(),
        });
        if let Some(stderr) = self.spawn_error.lock().unwrap().clone() {
            return Err(HostError::CommandFailed {
                command: "new-session".into(),
                stderr,
            });
        }
        self.sessions.lock().unwrap().insert(
            request.name.to_string(),
            HostSession {
                name: request.name.to_string(),
                created_at: DateTime::<Utc>::from_timestamp(1_700_000_000, 0),
                directory: Some(request.directory.to_path_buf()),
            },
        );
        Ok(())
    }

    async fn send_text(&self, name: &str, text: &str) -> Result<(), HostError> {
        self.record(Call::SendText(name.to_string(), text.to_string()));
        self.require(name, "send-keys")
    }

    async fn send_special_key(&self, name: &str, key: SpecialKey) -> Result<(), HostError> {
        self.record(Call::SendKey(name.to_string(), key));
        self.require(name, "send-keys")
    }

    async fn capture_pane(&self, name: &str, scrollback_lines: usize) -> Result<String, HostError> {
        self.record(Call::Capture(name.to_string(), scrollback_lines));
        self.require(name, "capture-pane")?;
        let mut captures = self.captures.lock().unwrap();
        let text = if captures.len() > 1 {
            captures.pop_front().unwrap_or_default()
        } else {
            captures.front().cloned().unwrap_or_default()
        };
        Ok(text)
    }

    async fn kill(&self, name: &str) -> Result<(), HostError> {
        self.record(Call::Kill(name.to_string()));
        self.require(name, "kill-session")?;
        if let Some(stderr) = self.kill_error.lock().unwrap().clone() {
            return Err(HostError::CommandFailed {
                command: "kill-session".into(),
                stderr,
            });
        }
        self.sessions.lock().unwrap().remove(name);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<HostSession>, HostError> {
        self.record(Call::List);
        if *self.list_fails.lock().unwrap() {
            return Err(HostError::CommandFailed {
                command: "list-sessions".into(),
                stderr: "server exited unexpectedly".into(),
            });
        }
        let mut sessions: Vec<HostSession> =
            self.sessions.lock().unwrap().values().cloned().collect();
        sessions.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(sessions)
    }

    fn attach_command(&self, name: &str) -> String {
        format!("tmux attach -t {name}")
    }

    fn host_name(&self) -> &str {
        "fake"
    }
}

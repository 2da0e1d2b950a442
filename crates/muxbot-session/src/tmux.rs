//! tmux-backed [`TerminalHost`].
//!
//! Every call is a fresh `tmux` process fed a discrete argument vector, so
//! directory paths, agent flags, and typed text never pass through a shell.
//! Each invocation is bounded by a timeout; a hung tmux server surfaces as
//! [`HostError::Timeout`] instead of blocking the caller forever.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use muxbot_core::config::TmuxConfig;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::HostError;
use crate::host::{HostSession, SpawnRequest, SpecialKey, TerminalHost};

/// `list-sessions` row format: name, creation time (unix seconds), start directory.
const LIST_FORMAT: &str = "#{session_name}\t#{session_created}\t#{session_path}";

/// tmux's stderr when no server is running, i.e. there are zero sessions.
const NO_SERVER_MARKERS: &[&str] = &["no server running", "error connecting to"];

// ─────────────────────────────────────────────
// TmuxHost
// ─────────────────────────────────────────────

/// Drives a local tmux server.
#[derive(Clone, Debug)]
pub struct TmuxHost {
    /// Binary name or path.
    binary: String,
    /// Upper bound per invocation.
    timeout: Duration,
    /// Pause between typing text and pressing Enter.
    enter_delay: Duration,
}

impl TmuxHost {
    pub fn new(binary: impl Into<String>, timeout: Duration, enter_delay: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
            enter_delay,
        }
    }

    pub fn from_config(config: &TmuxConfig) -> Self {
        Self::new(
            config.binary.clone(),
            config.command_timeout(),
            config.enter_delay(),
        )
    }

    /// Run tmux with `args` and return its stdout.
    async fn run<S>(&self, args: &[S]) -> Result<String, HostError>
    where
        S: AsRef<OsStr> + std::fmt::Debug,
    {
        let command = args
            .first()
            .map(|a| a.as_ref().to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!(binary = %self.binary, args = ?args, "running tmux");

        let child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| HostError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(source)) => {
                return Err(HostError::Spawn {
                    binary: self.binary.clone(),
                    source,
                })
            }
            Err(_) => {
                warn!(command = %command, timeout = ?self.timeout, "tmux call timed out");
                return Err(HostError::Timeout {
                    command,
                    timeout: self.timeout,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let stderr = if stderr.is_empty() {
                format!("exit status {}", output.status.code().unwrap_or(-1))
            } else {
                stderr
            };
            return Err(HostError::CommandFailed { command, stderr });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl TerminalHost for TmuxHost {
    async fn binary_available(&self) -> bool {
        match self.run(&["-V".to_string()]).await {
            Ok(version) => {
                debug!(version = %version.trim(), "tmux available");
                true
            }
            Err(e) => {
                debug!(error = %e, "tmux not available");
                false
            }
        }
    }

    async fn exists(&self, name: &str) -> bool {
        self.run(&has_session_args(name)).await.is_ok()
    }

    async fn spawn(&self, request: SpawnRequest<'_>) -> Result<(), HostError> {
        self.run(&new_session_args(&request)).await.map(|_| ())
    }

    async fn send_text(&self, name: &str, text: &str) -> Result<(), HostError> {
        self.run(&send_literal_args(name, text)).await?;
        // Enter sent too early is dropped while the agent is still reading the text.
        tokio::time::sleep(self.enter_delay).await;
        self.run(&send_key_args(name, SpecialKey::Enter)).await.map(|_| ())
    }

    async fn send_special_key(&self, name: &str, key: SpecialKey) -> Result<(), HostError> {
        self.run(&send_key_args(name, key)).await.map(|_| ())
    }

    async fn capture_pane(&self, name: &str, scrollback_lines: usize) -> Result<String, HostError> {
        self.run(&capture_args(name, scrollback_lines)).await
    }

    async fn kill(&self, name: &str) -> Result<(), HostError> {
        self.run(&kill_session_args(name)).await.map(|_| ())
    }

    async fn list(&self) -> Result<Vec<HostSession>, HostError> {
        match self.run(&list_sessions_args()).await {
            Ok(stdout) => Ok(parse_listing(&stdout)),
            Err(HostError::CommandFailed { stderr, .. })
                if NO_SERVER_MARKERS.iter().any(|m| stderr.contains(m)) =>
            {
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    fn attach_command(&self, name: &str) -> String {
        format!("{} attach -t {}", self.binary, name)
    }

    fn host_name(&self) -> &str {
        "tmux"
    }
}

// ─────────────────────────────────────────────
// Argument vectors
// ─────────────────────────────────────────────

/// Session target with exact-name matching (`foo` must not match `foobar`).
fn session_target(name: &str) -> String {
    format!("={name}")
}

/// Active pane of the exactly-named session.
fn pane_target(name: &str) -> String {
    format!("={name}:")
}

fn has_session_args(name: &str) -> Vec<String> {
    vec!["has-session".into(), "-t".into(), session_target(name)]
}

/// Built from `OsString`s so a non-UTF-8 directory reaches tmux byte for byte.
fn new_session_args(request: &SpawnRequest<'_>) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "new-session".into(),
        "-d".into(),
        "-s".into(),
        request.name.into(),
        "-x".into(),
        request.geometry.cols.to_string().into(),
        "-y".into(),
        request.geometry.rows.to_string().into(),
        "-c".into(),
        request.directory.as_os_str().to_os_string(),
        "--".into(),
        request.command.into(),
    ];
    args.extend(request.args.iter().map(OsString::from));
    args
}

fn send_literal_args(name: &str, text: &str) -> Vec<String> {
    vec![
        "send-keys".into(),
        "-t".into(),
        pane_target(name),
        "-l".into(),
        "--".into(),
        text.to_string(),
    ]
}

fn send_key_args(name: &str, key: SpecialKey) -> Vec<String> {
    vec![
        "send-keys".into(),
        "-t".into(),
        pane_target(name),
        key.key_name().into(),
    ]
}

fn capture_args(name: &str, scrollback_lines: usize) -> Vec<String> {
    vec![
        "capture-pane".into(),
        "-p".into(),
        "-e".into(),
        "-t".into(),
        pane_target(name),
        "-S".into(),
        format!("-{scrollback_lines}"),
    ]
}

fn kill_session_args(name: &str) -> Vec<String> {
    vec!["kill-session".into(), "-t".into(), session_target(name)]
}

fn list_sessions_args() -> Vec<String> {
    vec!["list-sessions".into(), "-F".into(), LIST_FORMAT.into()]
}

/// Parse `list-sessions -F LIST_FORMAT` output. Malformed rows are skipped.
fn parse_listing(stdout: &str) -> Vec<HostSession> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let mut fields = line.splitn(3, '\t');
            let name = fields.next()?.to_string();
            let created_at = fields
                .next()
                .and_then(|secs| secs.trim().parse::<i64>().ok())
                .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));
            let directory = fields
                .next()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(PathBuf::from);
            Some(HostSession {
                name,
                created_at,
                directory,
            })
        })
        .collect()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Geometry;
    use std::path::Path;

    #[test]
    fn test_new_session_keeps_hostile_directory_as_one_arg() {
        let dir = Path::new("/tmp/$(rm -rf ~)/x; echo pwned");
        let extra = vec!["--flag".to_string(), "a b".to_string()];
        let args = new_session_args(&SpawnRequest {
            name: "muxbot-demo",
            directory: dir,
            command: "claude",
            args: &extra,
            geometry: Geometry::WIDE,
        });

        let c = args.iter().position(|a| a == "-c").unwrap();
        assert_eq!(args[c + 1], "/tmp/$(rm -rf ~)/x; echo pwned");
        assert_eq!(&args[args.len() - 3..], &["claude", "--flag", "a b"]);
        assert!(args.iter().any(|a| a == "250"));
    }

    #[cfg(unix)]
    #[test]
    fn test_new_session_keeps_non_utf8_directory_bytes() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = Path::new(OsStr::from_bytes(b"/srv/caf\xe9"));
        let args = new_session_args(&SpawnRequest {
            name: "muxbot-demo",
            directory: dir,
            command: "claude",
            args: &[],
            geometry: Geometry::WIDE,
        });

        let c = args.iter().position(|a| a == "-c").unwrap();
        assert_eq!(args[c + 1].as_bytes(), b"/srv/caf\xe9");
    }

    #[test]
    fn test_literal_text_is_single_arg() {
        let text = "it's \"quoted\" `cmd` $HOME; ls";
        let args = send_literal_args("muxbot-a", text);
        assert_eq!(args.last().unwrap(), text);
        assert!(args.contains(&"-l".to_string()));
        assert_eq!(args[2], "=muxbot-a:");
    }

    #[test]
    fn test_special_key_args() {
        let args = send_key_args("muxbot-a", SpecialKey::Escape);
        assert_eq!(args, vec!["send-keys", "-t", "=muxbot-a:", "Escape"]);
    }

    #[test]
    fn test_capture_args_keep_escapes_and_scrollback() {
        let args = capture_args("muxbot-a", 200);
        assert!(args.contains(&"-e".to_string()));
        assert_eq!(args.last().unwrap(), "-200");
    }

    #[test]
    fn test_exact_match_targets() {
        assert_eq!(has_session_args("s")[2], "=s");
        assert_eq!(kill_session_args("s")[2], "=s");
    }

    #[test]
    fn test_parse_listing() {
        let out = "muxbot-a\t1700000000\t/home/u/proj\nother\t\t\n\nbroken-row\n";
        let sessions = parse_listing(out);
        assert_eq!(sessions.len(), 3);
        assert_eq!(sessions[0].name, "muxbot-a");
        assert_eq!(sessions[0].created_at.unwrap().timestamp(), 1_700_000_000);
        assert_eq!(sessions[0].directory.as_deref(), Some(Path::new("/home/u/proj")));
        assert_eq!(sessions[1].created_at, None);
        assert_eq!(sessions[1].directory, None);
        assert_eq!(sessions[2].name, "broken-row");
    }

    #[test]
    fn test_attach_command() {
        let host = TmuxHost::new("tmux", Duration::from_secs(1), Duration::ZERO);
        assert_eq!(host.attach_command("muxbot-a"), "tmux attach -t muxbot-a");
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let host = TmuxHost::new(
            "/nonexistent/muxbot-tmux",
            Duration::from_secs(1),
            Duration::ZERO,
        );
        assert!(!host.binary_available().await);
        assert!(!host.exists("anything").await);
        let err = host.kill("anything").await.unwrap_err();
        assert!(matches!(err, HostError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_carries_stderr() {
        // `sh -c` stands in for tmux: first arg is the script.
        let host = TmuxHost::new("sh", Duration::from_secs(5), Duration::ZERO);
        let err = host
            .run(&["-c".to_string(), "echo boom >&2; exit 3".to_string()])
            .await
            .unwrap_err();
        match err {
            HostError::CommandFailed { stderr, .. } => assert_eq!(stderr, "boom"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_send_text_types_then_waits_then_presses_enter() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("calls.log");
        let script = dir.path().join("tmux");
        std::fs::write(
            &script,
            format!(
                "#!/bin/sh\nprintf '%s %s\\n' \"$(date +%s%N)\" \"$*\" >> '{}'\n",
                log.display()
            ),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let delay = Duration::from_millis(300);
        let host = TmuxHost::new(
            script.to_string_lossy().into_owned(),
            Duration::from_secs(5),
            delay,
        );
        host.send_text("muxbot-a", "it's $(x)").await.unwrap();

        let raw = std::fs::read_to_string(&log).unwrap();
        let calls: Vec<(u128, &str)> = raw
            .lines()
            .map(|line| {
                let (ts, rest) = line.split_once(' ').unwrap();
                (ts.parse().unwrap(), rest)
            })
            .collect();

        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1, "send-keys -t =muxbot-a: -l -- it's $(x)");
        assert_eq!(calls[1].1, "send-keys -t =muxbot-a: Enter");
        assert!(calls[1].0 - calls[0].0 >= delay.as_nanos());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_call_times_out() {
        let host = TmuxHost::new("sh", Duration::from_millis(100), Duration::ZERO);
        let err = host
            .run(&["-c".to_string(), "sleep 5".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, HostError::Timeout { .. }));
    }
}

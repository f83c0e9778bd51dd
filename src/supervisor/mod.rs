//! Detached job supervision.
//!
//! The dump runs inside a tmux session so it outlives this process. We never
//! own the job: after launch we only learn its pane pid and probe it until it
//! disappears.

mod probe;
mod watcher;

use crate::config::{Config, Credential};
use crate::error::{LaunchError, ResolutionError};
use std::fmt;
use std::process::{Command, Stdio};

pub(crate) use probe::is_alive;
pub(crate) use watcher::{spawn_ticker, spawn_watcher};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pid(pub i32);

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A command to run inside a named session.
#[derive(Debug, Clone)]
pub struct SupervisedJob {
    pub session: SessionId,
    pub command: Vec<String>,
    pub env: Vec<(&'static str, Credential)>,
}

impl SupervisedJob {
    /// `pg_dump` in directory format into the configured target.
    pub fn pg_dump(cfg: &Config) -> Result<Self, LaunchError> {
        let d = &cfg.dump;
        let target = cfg.target.as_path().to_string_lossy().into_owned();
        let script = format!(
            "pg_dump -h {} -p {} -U {} -F d -j {} -Z {} -f {} {}",
            quote(&d.host)?,
            d.port,
            quote(&d.user)?,
            d.jobs,
            d.compression,
            quote(&target)?,
            quote(&d.database)?,
        );
        Ok(Self {
            session: SessionId::new(d.session.clone()),
            command: vec!["sh".into(), "-c".into(), script],
            env: vec![("PGPASSWORD", cfg.credential.clone())],
        })
    }

    /// Command an operator can paste to watch the job.
    pub fn attach_hint(session: &SessionId) -> String {
        format!("tmux a -t {session}")
    }
}

fn quote(value: &str) -> Result<String, LaunchError> {
    shlex::try_quote(value)
        .map(|q| q.into_owned())
        .map_err(|_| LaunchError::Unquotable(value.to_string()))
}

/// Returned by a successful launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchHandle {
    pub session: SessionId,
}

/// Process seam used by the lifecycle controller and the watcher.
pub trait Supervisor: Send + Sync {
    fn launch(&self, job: &SupervisedJob) -> Result<LaunchHandle, LaunchError>;

    fn resolve_pid(&self, session: &SessionId) -> Result<Pid, ResolutionError>;

    /// Zero-effect probe. A missing process is `false`, not an error.
    fn is_alive(&self, pid: Pid) -> bool;
}

pub struct TmuxSupervisor {
    tmux: String,
}

impl TmuxSupervisor {
    pub fn new() -> Self {
        Self {
            tmux: "tmux".into(),
        }
    }
}

impl Default for TmuxSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl Supervisor for TmuxSupervisor {
    fn launch(&self, job: &SupervisedJob) -> Result<LaunchHandle, LaunchError> {
        let output = Command::new(&self.tmux)
            .args(new_session_args(job))
            .stdin(Stdio::null())
            .output()
            .map_err(|source| LaunchError::Spawn {
                program: self.tmux.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(LaunchError::Rejected {
                program: self.tmux.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        tracing::info!(session = %job.session, "launched detached session");
        Ok(LaunchHandle {
            session: job.session.clone(),
        })
    }

    fn resolve_pid(&self, session: &SessionId) -> Result<Pid, ResolutionError> {
        let output = Command::new(&self.tmux)
            .args(["list-panes", "-t", session.as_str(), "-F", "#{pane_pid}"])
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ResolutionError::Query {
                session: session.to_string(),
                source,
            })?;
        if !output.status.success() {
            return Err(ResolutionError::SessionGone {
                session: session.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        parse_pane_pid(session, &String::from_utf8_lossy(&output.stdout))
    }

    fn is_alive(&self, pid: Pid) -> bool {
        is_alive(pid)
    }
}

/// `new-session` arguments for `job`.
///
/// A running tmux server gives new sessions its own environment, not the
/// client's, so variables are handed over with `-e` (tmux 3.0+). They appear
/// only in the argv of the short-lived client, never in the pane's `sh` or
/// `pg_dump`.
fn new_session_args(job: &SupervisedJob) -> Vec<String> {
    let mut args = vec![
        "new-session".to_string(),
        "-d".to_string(),
        "-s".to_string(),
        job.session.as_str().to_string(),
    ];
    for (key, value) in &job.env {
        args.push("-e".to_string());
        args.push(format!("{key}={}", value.expose()));
    }
    args.extend(job.command.iter().cloned());
    args
}

fn parse_pane_pid(session: &SessionId, stdout: &str) -> Result<Pid, ResolutionError> {
    let first = stdout.lines().map(str::trim).find(|l| !l.is_empty());
    first
        .and_then(|l| l.parse::<i32>().ok())
        .map(Pid)
        .ok_or_else(|| ResolutionError::Parse {
            session: session.to_string(),
            output: stdout.trim().to_string(),
        })
}

//! Typed failures of the download lifecycle.
//!
//! Each variant family maps to one stage of an attempt: reading configuration,
//! launching the session, resolving the job's pid, and clearing a stale target.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be set")]
    Missing { var: &'static str },
    #[error("{var} is not valid ({value:?}): {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{program}` exited with {status}: {stderr}")]
    Rejected {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("cannot pass {0:?} to the shell")]
    Unquotable(String),
}

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("failed to query session `{session}`: {source}")]
    Query {
        session: String,
        #[source]
        source: std::io::Error,
    },
    #[error("session `{session}` is gone: {stderr}")]
    SessionGone { session: String, stderr: String },
    #[error("session `{session}` reported a non-numeric pid {output:?}")]
    Parse { session: String, output: String },
}

#[derive(Debug, Error)]
#[error("failed to remove {}: {source}", path.display())]
pub struct DeleteError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

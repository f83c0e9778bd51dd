//! Environment-backed configuration for a download attempt.
//!
//! Values are read on every attempt rather than once at startup, so the
//! operator can export a missing variable in another shell and retry.

use crate::error::ConfigError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const TARGET_PATH_VAR: &str = "VIA_STAGE_FILE_PATH";
pub const PASSWORD_VAR: &str = "VIA_STAGE_PASSWORD";
pub const HOST_VAR: &str = "VIA_STAGE_HOST";
pub const PORT_VAR: &str = "VIA_STAGE_PORT";
pub const USER_VAR: &str = "VIA_STAGE_USER";
pub const DATABASE_VAR: &str = "VIA_STAGE_DATABASE";

/// Name of the tmux session the dump runs in.
pub const SESSION_NAME: &str = "download-latest-session";

/// Absolute path of the snapshot destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetPath(PathBuf);

impl TargetPath {
    /// Relative paths are resolved against the current working directory.
    pub fn new(raw: impl AsRef<Path>) -> std::io::Result<Self> {
        std::path::absolute(raw.as_ref()).map(Self)
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for TargetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.display().fmt(f)
    }
}

/// Database password. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Connection and tuning parameters for `pg_dump`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpTemplate {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub jobs: u8,
    pub compression: u8,
    pub database: String,
    pub session: String,
}

impl Default for DumpTemplate {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 2234,
            user: "stage-crm-backend".into(),
            jobs: 4,
            compression: 4,
            database: "stage".into(),
            session: SESSION_NAME.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub target: TargetPath,
    pub credential: Credential,
    pub dump: DumpTemplate,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a config from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let raw_target = get(TARGET_PATH_VAR).ok_or(ConfigError::Missing {
            var: TARGET_PATH_VAR,
        })?;
        let password = get(PASSWORD_VAR).ok_or(ConfigError::Missing { var: PASSWORD_VAR })?;

        let target = TargetPath::new(&raw_target).map_err(|e| ConfigError::Invalid {
            var: TARGET_PATH_VAR,
            value: raw_target.clone(),
            reason: e.to_string(),
        })?;

        let mut dump = DumpTemplate::default();
        if let Some(host) = get(HOST_VAR) {
            dump.host = host;
        }
        if let Some(port) = get(PORT_VAR) {
            dump.port = port.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::Invalid {
                    var: PORT_VAR,
                    value: port.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
        if let Some(user) = get(USER_VAR) {
            dump.user = user;
        }
        if let Some(database) = get(DATABASE_VAR) {
            dump.database = database;
        }

        Ok(Self {
            target,
            credential: Credential::new(password),
            dump,
        })
    }
}

/// Background timing. Defaults match how long tmux needs to attach a pane process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchTiming {
    pub grace: Duration,
    pub poll_interval: Duration,
    pub tick_interval: Duration,
}

impl Default for WatchTiming {
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(2),
            poll_interval: Duration::from_secs(2),
            tick_interval: Duration::from_millis(100),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn missing_target_is_reported_first() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { var } if var == TARGET_PATH_VAR));
    }

    #[test]
    fn empty_password_counts_as_missing() {
        let err = Config::from_lookup(lookup(&[
            (TARGET_PATH_VAR, "/tmp/stage"),
            (PASSWORD_VAR, "  "),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing { var } if var == PASSWORD_VAR));
    }

    #[test]
    fn defaults_follow_dump_template() {
        let cfg = Config::from_lookup(lookup(&[
            (TARGET_PATH_VAR, "/tmp/stage"),
            (PASSWORD_VAR, "hunter2"),
        ]))
        .unwrap();
        assert_eq!(cfg.target.as_path(), Path::new("/tmp/stage"));
        assert_eq!(cfg.credential.expose(), "hunter2");
        assert_eq!(cfg.dump, DumpTemplate::default());
    }

    #[test]
    fn relative_target_becomes_absolute() {
        let cfg = Config::from_lookup(lookup(&[
            (TARGET_PATH_VAR, "dumps/stage"),
            (PASSWORD_VAR, "x"),
        ]))
        .unwrap();
        assert!(cfg.target.as_path().is_absolute());
        assert!(cfg.target.as_path().ends_with("dumps/stage"));
    }

    #[test]
    fn overrides_and_bad_port() {
        let cfg = Config::from_lookup(lookup(&[
            (TARGET_PATH_VAR, "/tmp/stage"),
            (PASSWORD_VAR, "x"),
            (HOST_VAR, "db.internal"),
            (PORT_VAR, "5432"),
            (DATABASE_VAR, "crm"),
        ]))
        .unwrap();
        assert_eq!(cfg.dump.host, "db.internal");
        assert_eq!(cfg.dump.port, 5432);
        assert_eq!(cfg.dump.database, "crm");

        let err = Config::from_lookup(lookup(&[
            (TARGET_PATH_VAR, "/tmp/stage"),
            (PASSWORD_VAR, "x"),
            (PORT_VAR, "twenty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var, .. } if var == PORT_VAR));
    }

    #[test]
    fn credential_debug_is_redacted() {
        let c = Credential::new("hunter2");
        assert!(!format!("{c:?}").contains("hunter2"));
    }
}

//! Configuration: TOML file with per-section defaults and environment overrides.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, WatchError};
use crate::logger::syslog::{Facility, Severity};

/// Location probed when no `--config` flag is given.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/rwatch/config.toml";

/// Hard upper bound for `daemon.max_controllers`.
pub const CONTROLLER_CAP_LIMIT: usize = 16;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mail: MailConfig,
    pub syslog: SyslogConfig,
    pub daemon: DaemonConfig,
    pub hal: HalConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub enabled: bool,
    pub sendmail: PathBuf,
    pub recipients: String,
    pub from: String,
    pub subject: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sendmail: PathBuf::from("/usr/sbin/sendmail"),
            recipients: "root".to_string(),
            from: "RAID event watch <root>".to_string(),
            subject: "RAID CONTROLLER EVENT".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyslogConfig {
    pub socket: PathBuf,
    pub ident: String,
    pub facility: Facility,
    /// Severity used for controller event notices.
    pub event_severity: Severity,
    /// Severity used for startup/shutdown notices.
    pub lifecycle_severity: Severity,
}

impl Default for SyslogConfig {
    fn default() -> Self {
        Self {
            socket: PathBuf::from("/dev/log"),
            ident: "rwatch".to_string(),
            facility: Facility::Daemon,
            event_severity: Severity::Crit,
            lifecycle_severity: Severity::Notice,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub poll_interval_secs: u64,
    pub max_controllers: usize,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 10,
            max_controllers: 4,
        }
    }
}

impl DaemonConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HalConfig {
    /// Directory of controller journals, one `*.toml` file per controller.
    pub journal_dir: PathBuf,
}

impl Default for HalConfig {
    fn default() -> Self {
        Self {
            journal_dir: PathBuf::from("/var/lib/rwatch/controllers"),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, [`DEFAULT_CONFIG_PATH`] is read
    /// if present, otherwise defaults apply. Environment overrides are applied
    /// last, then the result is validated.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(WatchError::MissingConfig {
                        path: path.to_path_buf(),
                    });
                }
                Self::from_file(path)?
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| WatchError::io(path, e))?;
        Ok(toml::from_str(&raw)?)
    }

    /// Apply `RWATCH_*` overrides using the given lookup.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(recipients) = lookup("RWATCH_MAIL_RECIPIENTS") {
            self.mail.recipients = recipients;
        }
        if let Some(dir) = lookup("RWATCH_JOURNAL_DIR") {
            self.hal.journal_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup("RWATCH_POLL_INTERVAL_SECS") {
            self.daemon.poll_interval_secs =
                raw.trim()
                    .parse()
                    .map_err(|_| WatchError::InvalidConfig {
                        details: format!("RWATCH_POLL_INTERVAL_SECS is not an integer: {raw:?}"),
                    })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.mail.enabled && self.mail.recipients.trim().is_empty() {
            return Err(WatchError::InvalidConfig {
                details: "mail.recipients must not be empty when mail is enabled".to_string(),
            });
        }
        if self.daemon.poll_interval_secs == 0 {
            return Err(WatchError::InvalidConfig {
                details: "daemon.poll_interval_secs must be at least 1".to_string(),
            });
        }
        if !(1..=CONTROLLER_CAP_LIMIT).contains(&self.daemon.max_controllers) {
            return Err(WatchError::InvalidConfig {
                details: format!(
                    "daemon.max_controllers must be in 1..={CONTROLLER_CAP_LIMIT}, got {}",
                    self.daemon.max_controllers
                ),
            });
        }
        if self.syslog.ident.trim().is_empty() {
            return Err(WatchError::InvalidConfig {
                details: "syslog.ident must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_match_reference_behavior() {
        let config = Config::default();
        assert_eq!(config.daemon.poll_interval(), Duration::from_secs(10));
        assert_eq!(config.daemon.max_controllers, 4);
        assert_eq!(config.mail.recipients, "root");
        assert_eq!(config.syslog.event_severity, Severity::Crit);
        assert_eq!(config.syslog.lifecycle_severity, Severity::Notice);
        config.validate().expect("defaults are valid");
    }

    #[test]
    fn partial_file_keeps_section_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[mail]\nrecipients = \"ops@example.com\"\n\n[syslog]\nevent_severity = \"err\"\n",
        )
        .expect("write config");

        let config = Config::load(Some(&path)).expect("load");
        assert_eq!(config.mail.recipients, "ops@example.com");
        assert_eq!(config.mail.subject, MailConfig::default().subject);
        assert_eq!(config.syslog.event_severity, Severity::Err);
        assert_eq!(config.daemon, DaemonConfig::default());
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/rwatch.toml"))).unwrap_err();
        assert_eq!(err.code(), "RW-1002");
    }

    #[test]
    fn unknown_severity_fails_to_parse() {
        let err = toml::from_str::<Config>("[syslog]\nevent_severity = \"loud\"\n").unwrap_err();
        assert!(err.to_string().contains("loud"));
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("RWATCH_MAIL_RECIPIENTS", "a@x, b@y"),
            ("RWATCH_POLL_INTERVAL_SECS", " 30 "),
            ("RWATCH_JOURNAL_DIR", "/srv/journals"),
        ]
        .into_iter()
        .collect();
        let mut config = Config::default();
        config
            .apply_env_overrides(|key| env.get(key).map(ToString::to_string))
            .expect("overrides");
        assert_eq!(config.mail.recipients, "a@x, b@y");
        assert_eq!(config.daemon.poll_interval_secs, 30);
        assert_eq!(config.hal.journal_dir, PathBuf::from("/srv/journals"));
    }

    #[test]
    fn bad_env_interval_is_rejected() {
        let mut config = Config::default();
        let err = config
            .apply_env_overrides(|key| {
                (key == "RWATCH_POLL_INTERVAL_SECS").then(|| "soon".to_string())
            })
            .unwrap_err();
        assert_eq!(err.code(), "RW-1001");
    }

    #[test]
    fn validation_rejects_out_of_range_values() {
        let mut config = Config::default();
        config.daemon.poll_interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.daemon.max_controllers = CONTROLLER_CAP_LIMIT + 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.mail.recipients = "  ".to_string();
        assert!(config.validate().is_err());
        config.mail.enabled = false;
        assert!(config.validate().is_ok());
    }
}

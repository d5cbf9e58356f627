//! RW-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, WatchError>;

/// Top-level error type for the controller event watcher.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("[RW-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[RW-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[RW-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[RW-2001] no controller found")]
    DiscoveryEmpty,

    #[error("[RW-2101] controller {controller}: {operation} failed: {status}")]
    Retrieval {
        controller: String,
        operation: &'static str,
        status: String,
    },

    #[error("[RW-2201] unknown event type {event_type} for category {category}")]
    UnknownEventType {
        category: &'static str,
        event_type: u16,
    },

    #[error("[RW-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[RW-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl WatchError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "RW-1001",
            Self::MissingConfig { .. } => "RW-1002",
            Self::ConfigParse { .. } => "RW-1003",
            Self::DiscoveryEmpty => "RW-2001",
            Self::Retrieval { .. } => "RW-2101",
            Self::UnknownEventType { .. } => "RW-2201",
            Self::Io { .. } => "RW-3002",
            Self::Runtime { .. } => "RW-3900",
        }
    }

    /// Whether the error stops the process before the poll loop starts.
    ///
    /// Everything else is local to one event or one cycle.
    #[must_use]
    pub const fn is_fatal_at_startup(&self) -> bool {
        matches!(
            self,
            Self::DiscoveryEmpty
                | Self::InvalidConfig { .. }
                | Self::MissingConfig { .. }
                | Self::ConfigParse { .. }
        )
    }

    /// Convenience constructor for hardware-layer failures.
    #[must_use]
    pub fn retrieval(
        controller: impl Into<String>,
        operation: &'static str,
        status: impl Into<String>,
    ) -> Self {
        Self::Retrieval {
            controller: controller.into(),
            operation,
            status: status.into(),
        }
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<toml::de::Error> for WatchError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_embedded_in_display() {
        let errors = [
            WatchError::DiscoveryEmpty,
            WatchError::retrieval("ctrl0", "event count", "busy"),
            WatchError::UnknownEventType {
                category: "RaidSet",
                event_type: 99,
            },
            WatchError::Runtime {
                details: "x".to_string(),
            },
        ];
        for err in errors {
            assert!(
                err.to_string().contains(err.code()),
                "{} missing code {}",
                err,
                err.code()
            );
        }
    }

    #[test]
    fn only_startup_errors_are_fatal() {
        assert!(WatchError::DiscoveryEmpty.is_fatal_at_startup());
        assert!(
            WatchError::InvalidConfig {
                details: "bad".to_string()
            }
            .is_fatal_at_startup()
        );
        assert!(!WatchError::retrieval("ctrl0", "fetch event", "timeout").is_fatal_at_startup());
        assert!(
            !WatchError::UnknownEventType {
                category: "Device",
                event_type: 40
            }
            .is_fatal_at_startup()
        );
    }

    #[test]
    fn toml_errors_map_to_config_parse() {
        let err: WatchError = toml::from_str::<toml::Table>("not = [valid")
            .expect_err("should fail")
            .into();
        assert_eq!(err.code(), "RW-1003");
    }
}

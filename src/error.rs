//! Domain-specific error types for the sync engine.
//!
//! Internal modules return these typed errors; command handlers at the CLI
//! boundary convert them to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! ConfigError: settings file, catalog loading, root resolution
//! SyncError  : per-path failures inside the sync engine
//! ├── Conflict    : destination holds differing content, no answer available
//! ├── ForeignLink : symlink not owned by appsync
//! ├── Io          : permission denied, disk full, missing mount
//! └── Declined    : user declined a conflict confirmation
//! ```
//!
//! A [`SyncError`] never escapes the engine: it is converted into a per-path
//! [`Outcome`](crate::engine::Outcome) so one failing path cannot affect the
//! next.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise from configuration loading and root resolution.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Neither `HOME` nor `USERPROFILE` is set and no `--home` was given.
    #[error("cannot determine home directory: neither HOME nor USERPROFILE is set")]
    MissingHome,

    /// The storage root does not exist and the operation requires it.
    #[error("storage directory not found: {}", .0.display())]
    StorageNotFound(PathBuf),

    /// An I/O error occurred while reading a configuration or catalog file.
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        /// Path to the file or directory that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A TOML file could not be parsed.
    #[error("Invalid TOML in {file}: {message}")]
    InvalidSyntax {
        /// File that failed to parse.
        file: String,
        /// Parser message.
        message: String,
    },

    /// Two catalog entries share the same application id.
    #[error("Application '{0}' is defined more than once")]
    DuplicateApplication(String),

    /// A requested application id is not in the catalog.
    #[error("Unknown application '{0}'")]
    UnknownApplication(String),

    /// An application declares a path that cannot be tracked.
    #[error("Application '{app}' declares invalid path '{path}': {reason}")]
    InvalidPath {
        /// Application id.
        app: String,
        /// The path as written in the catalog.
        path: String,
        /// Why the path was rejected.
        reason: String,
    },
}

/// Errors that arise while synchronizing a single tracked path.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The destination holds differing content and no confirmation answer
    /// could be obtained (e.g. stdin is not a terminal).
    #[error("conflict at {}: {reason}", path.display())]
    Conflict {
        /// Destination path holding the conflicting content.
        path: PathBuf,
        /// Why the conflict could not be resolved.
        reason: String,
    },

    /// The home path is a symlink pointing somewhere other than storage.
    #[error("{} is a foreign link to {}", path.display(), target.display())]
    ForeignLink {
        /// The home-side link.
        path: PathBuf,
        /// Where the link points.
        target: PathBuf,
    },

    /// A filesystem operation failed.
    #[error("{}: {source}", path.display())]
    Io {
        /// Path the failed operation was acting on.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The user declined to overwrite conflicting content.
    #[error("overwrite of {} declined", path.display())]
    Declined {
        /// Destination path that would have been overwritten.
        path: PathBuf,
    },
}

impl SyncError {
    /// Build an [`SyncError::Io`] for `path`.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if this error came out of a conflict (answered or not).
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. } | Self::Declined { .. })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn storage_not_found_display() {
        let e = ConfigError::StorageNotFound(PathBuf::from("/mnt/cloud/appsync"));
        assert_eq!(
            e.to_string(),
            "storage directory not found: /mnt/cloud/appsync"
        );
    }

    #[test]
    fn invalid_path_display() {
        let e = ConfigError::InvalidPath {
            app: "editor".to_string(),
            path: "../escape".to_string(),
            reason: "must not contain '..'".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "Application 'editor' declares invalid path '../escape': must not contain '..'"
        );
    }

    #[test]
    fn config_io_has_source() {
        use std::error::Error as StdError;
        let e = ConfigError::Io {
            path: PathBuf::from("/home/u/.appsync.toml"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains(".appsync.toml"));
    }

    #[test]
    fn foreign_link_display() {
        let e = SyncError::ForeignLink {
            path: PathBuf::from("/home/u/.vimrc"),
            target: PathBuf::from("/opt/vimrc"),
        };
        assert_eq!(e.to_string(), "/home/u/.vimrc is a foreign link to /opt/vimrc");
    }

    #[test]
    fn io_display_includes_path_and_cause() {
        let e = SyncError::io(
            "/storage/Config",
            io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        );
        assert!(e.to_string().starts_with("/storage/Config: "));
        assert!(e.to_string().contains("permission denied"));
    }

    #[test]
    fn only_conflict_and_declined_count_as_conflicts() {
        let declined = SyncError::Declined {
            path: PathBuf::from("a"),
        };
        let conflict = SyncError::Conflict {
            path: PathBuf::from("a"),
            reason: "not a terminal".to_string(),
        };
        let io_err = SyncError::io("a", io::Error::other("boom"));
        assert!(declined.is_conflict());
        assert!(conflict.is_conflict());
        assert!(!io_err.is_conflict());
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<ConfigError>();
        assert_send_sync::<SyncError>();
    }

    #[test]
    fn config_error_converts_to_anyhow() {
        let e = ConfigError::MissingHome;
        let _anyhow_err: anyhow::Error = e.into();
    }
}

//! Settings discovery: home and storage roots, catalog location, and the
//! enabled application set.
pub mod catalog;
pub mod toml_loader;

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use catalog::Application;

/// Name of the settings file looked up in the home directory.
pub const SETTINGS_FILE: &str = ".appsync.toml";

/// Catalog directory relative to the home directory.
pub const CATALOG_DIR: &str = ".appsync/apps";

/// Contents of `appsync.toml`. Every field has a default, so a missing file
/// is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Where the storage tree lives.
    pub storage: StorageSettings,
    /// Which applications take part in a run.
    pub applications: ApplicationFilter,
}

/// `[storage]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageSettings {
    /// Base directory, relative to home or absolute.
    pub path: PathBuf,
    /// Sub-directory inside `path`.
    pub directory: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("Appsync"),
            directory: PathBuf::new(),
        }
    }
}

/// `[applications]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApplicationFilter {
    /// When non-empty, only these application ids are enabled.
    pub sync: Vec<String>,
    /// Application ids that are never enabled.
    pub ignore: Vec<String>,
}

impl Settings {
    /// Load settings from `path`; a missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        toml_loader::load_config(path)
    }

    /// Resolve the storage root for `home`. An absolute `storage.path`
    /// replaces `home`.
    #[must_use]
    pub fn storage_root(&self, home: &Path) -> PathBuf {
        home.join(&self.storage.path).join(&self.storage.directory)
    }
}

impl ApplicationFilter {
    /// Returns `true` if the application passes the `sync` and `ignore` lists.
    #[must_use]
    pub fn is_enabled(&self, app: &Application) -> bool {
        let listed = |names: &[String]| names.iter().any(|n| app.id.eq_ignore_ascii_case(n));
        (self.sync.is_empty() || listed(self.sync.as_slice())) && !listed(self.ignore.as_slice())
    }

    /// Split `catalog` into the enabled applications (catalog order) and a
    /// warning for every `sync`/`ignore` entry that names no application.
    #[must_use]
    pub fn select<'a>(&self, catalog: &'a [Application]) -> (Vec<&'a Application>, Vec<String>) {
        let enabled = catalog.iter().filter(|app| self.is_enabled(app)).collect();

        let known = |name: &str| catalog.iter().any(|app| app.id.eq_ignore_ascii_case(name));
        let warnings = self
            .sync
            .iter()
            .map(|n| ("sync", n))
            .chain(self.ignore.iter().map(|n| ("ignore", n)))
            .filter(|(_, name)| !known(name.as_str()))
            .map(|(list, name)| format!("'{list}' names unknown application '{name}'"))
            .collect();

        (enabled, warnings)
    }
}

/// Return the home directory from `HOME`, falling back to `USERPROFILE`.
///
/// # Errors
///
/// Returns [`ConfigError::MissingHome`] if neither variable is set.
pub fn home_dir() -> Result<PathBuf, ConfigError> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
        .ok_or(ConfigError::MissingHome)
}

/// Shared helpers for config tests.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) mod test_helpers {
    use std::path::PathBuf;

    /// Write `content` to `config.toml` in a fresh temp directory.
    pub fn write_temp_toml(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, content).expect("write temp toml");
        (dir, path)
    }
}

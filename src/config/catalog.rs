//! Application catalog: one TOML file per application.
//!
//! ```toml
//! name = "Editor"
//! paths = ["Config/settings.json", ".editor"]
//! ```
//!
//! The optional `id` key defaults to the lower-cased file stem.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use super::toml_loader;
use crate::error::ConfigError;

/// A named bundle of home-relative paths to keep in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Application {
    /// Identifier used by the `sync`/`ignore` lists and `show`.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Tracked paths, relative to the home directory, in declaration order.
    pub paths: Vec<PathBuf>,
}

impl Application {
    /// Returns `true` if `key` names this application (id or display name,
    /// case-insensitively).
    #[must_use]
    pub fn matches(&self, key: &str) -> bool {
        self.id.eq_ignore_ascii_case(key) || self.name.eq_ignore_ascii_case(key)
    }
}

/// On-disk shape of a catalog file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ApplicationFile {
    id: Option<String>,
    name: String,
    #[serde(default)]
    paths: Vec<String>,
}

/// Load every `*.toml` file in `dir`, sorted by application id.
///
/// A missing directory yields an empty catalog.
///
/// # Errors
///
/// Returns an error if a file cannot be read or parsed, declares an invalid
/// path, or reuses another application's id.
pub fn load_dir(dir: &Path) -> Result<Vec<Application>, ConfigError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(ConfigError::Io {
                path: dir.to_path_buf(),
                source,
            });
        }
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
            files.push(path);
        }
    }

    let mut apps = files
        .iter()
        .map(|path| load_file(path))
        .collect::<Result<Vec<_>, _>>()?;
    apps.sort_by(|a, b| a.id.cmp(&b.id));

    let mut seen = HashSet::new();
    for app in &apps {
        if !seen.insert(app.id.as_str()) {
            return Err(ConfigError::DuplicateApplication(app.id.clone()));
        }
    }
    Ok(apps)
}

/// Load a single application file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or declares an
/// invalid path.
pub fn load_file(path: &Path) -> Result<Application, ConfigError> {
    let raw: ApplicationFile = toml_loader::load_required(path)?;
    let id = raw.id.unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    });
    let paths = raw
        .paths
        .iter()
        .map(|p| validate_path(&id, p))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Application {
        id,
        name: raw.name,
        paths,
    })
}

/// Normalize a declared path, rejecting anything that could escape the
/// home or storage roots.
fn validate_path(app: &str, raw: &str) -> Result<PathBuf, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidPath {
        app: app.to_string(),
        path: raw.to_string(),
        reason: reason.to_string(),
    };

    let mut normalized = PathBuf::new();
    for component in Path::new(raw).components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir => return Err(invalid("must not contain '..'")),
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("must be relative to the home directory"));
            }
        }
    }
    if normalized.as_os_str().is_empty() {
        return Err(invalid("must not be empty"));
    }
    Ok(normalized)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, file: &str, content: &str) {
        fs::write(dir.join(file), content).unwrap();
    }

    #[test]
    fn id_defaults_to_lowercase_stem() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "Editor.toml",
            "name = \"Editor\"\npaths = [\"Config/settings.json\"]\n",
        );
        let apps = load_dir(dir.path()).unwrap();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].id, "editor");
        assert_eq!(apps[0].paths, vec![PathBuf::from("Config/settings.json")]);
    }

    #[test]
    fn sorted_by_id_and_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "zsh.toml", "name = \"Zsh\"\npaths = [\".zshrc\"]\n");
        write(dir.path(), "git.toml", "name = \"Git\"\npaths = [\".gitconfig\"]\n");
        write(dir.path(), "README.md", "not a catalog file");
        let ids: Vec<_> = load_dir(dir.path())
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec!["git", "zsh"]);
    }

    #[test]
    fn explicit_id_overrides_stem() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "vim.toml",
            "id = \"neovim\"\nname = \"Neovim\"\npaths = [\".config/nvim\"]\n",
        );
        assert_eq!(load_dir(dir.path()).unwrap()[0].id, "neovim");
    }

    #[test]
    fn duplicate_ids_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.toml", "id = \"same\"\nname = \"A\"\n");
        write(dir.path(), "b.toml", "id = \"same\"\nname = \"B\"\n");
        assert!(matches!(
            load_dir(dir.path()),
            Err(ConfigError::DuplicateApplication(id)) if id == "same"
        ));
    }

    #[test]
    fn missing_directory_is_empty_catalog() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_dir(&dir.path().join("apps")).unwrap().is_empty());
    }

    #[test]
    fn parent_components_rejected() {
        let err = validate_path("editor", "../escape").unwrap_err();
        assert!(err.to_string().contains("'..'"));
    }

    #[test]
    fn absolute_paths_rejected() {
        let err = validate_path("editor", "/etc/passwd").unwrap_err();
        assert!(err.to_string().contains("relative"));
    }

    #[test]
    fn empty_paths_rejected() {
        assert!(validate_path("editor", "").is_err());
        assert!(validate_path("editor", "./").is_err());
    }

    #[test]
    fn current_dir_components_dropped() {
        assert_eq!(
            validate_path("editor", "./Config/./settings.json").unwrap(),
            PathBuf::from("Config/settings.json")
        );
    }

    #[test]
    fn unknown_keys_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "x.toml", "name = \"X\"\nfiles = [\"a\"]\n");
        assert!(matches!(
            load_dir(dir.path()),
            Err(ConfigError::InvalidSyntax { .. })
        ));
    }

    #[test]
    fn matches_id_or_name() {
        let app = Application {
            id: "editor".into(),
            name: "Sublime Editor".into(),
            paths: vec![],
        };
        assert!(app.matches("EDITOR"));
        assert!(app.matches("sublime editor"));
        assert!(!app.matches("vim"));
    }
}

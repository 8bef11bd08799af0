//! Path resolution: application-relative path to home and storage paths.
use std::path::{Path, PathBuf};

/// The two fixed roots of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roots {
    /// The user's home directory.
    pub home: PathBuf,
    /// The storage directory mirroring tracked paths.
    pub storage: PathBuf,
}

impl Roots {
    /// Create a new pair of roots.
    #[must_use]
    pub const fn new(home: PathBuf, storage: PathBuf) -> Self {
        Self { home, storage }
    }
}

/// One declared path of one application, resolved against both roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedPath {
    /// Name of the owning application.
    pub app: String,
    /// Path relative to the home directory, as declared.
    pub relative: PathBuf,
    /// Absolute home-side path.
    pub home_path: PathBuf,
    /// Absolute storage-side path.
    pub storage_path: PathBuf,
    /// The storage root the path was resolved against.
    pub storage_root: PathBuf,
}

impl TrackedPath {
    /// Resolve `relative` for application `app`.
    ///
    /// The storage side mirrors the home layout directly under the storage
    /// root, so the same relative path declared by two applications maps to
    /// the same pair of absolute paths.
    #[must_use]
    pub fn resolve(roots: &Roots, app: &str, relative: &Path) -> Self {
        Self {
            app: app.to_string(),
            relative: relative.to_path_buf(),
            home_path: roots.home.join(relative),
            storage_path: roots.storage.join(relative),
            storage_root: roots.storage.clone(),
        }
    }
}

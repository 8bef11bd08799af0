//! Classification of the home-side path before any action is taken.
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

/// On-disk state of a home-side path relative to its storage counterpart.
///
/// # Examples
///
/// ```
/// use appsync_cli::engine::state::PathState;
///
/// assert_eq!(PathState::Absent.to_string(), "absent");
/// assert!(PathState::LinkToStorage.is_link());
/// assert!(!PathState::RegularContent.is_link());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathState {
    /// Nothing exists at the path, not even a broken link.
    Absent,
    /// A regular file, directory, or other non-link object.
    RegularContent,
    /// A symlink whose target is exactly the storage path.
    LinkToStorage,
    /// A symlink pointing anywhere else, including broken links.
    LinkToOther {
        /// The link target as read from disk.
        target: PathBuf,
    },
}

impl PathState {
    /// Returns `true` for either link variant.
    #[must_use]
    pub const fn is_link(&self) -> bool {
        matches!(self, Self::LinkToStorage | Self::LinkToOther { .. })
    }
}

impl fmt::Display for PathState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::RegularContent => write!(f, "regular content"),
            Self::LinkToStorage => write!(f, "linked to storage"),
            Self::LinkToOther { target } => write!(f, "foreign link to {}", target.display()),
        }
    }
}

/// Inspect `home_path` and classify it against `storage_path`.
///
/// Only one level of symlink is read. A relative link target is resolved
/// against the link's parent directory before comparison.
///
/// # Errors
///
/// Returns an error if the path's metadata cannot be read for a reason other
/// than the path not existing (e.g. permission denied on a parent).
pub fn inspect(home_path: &Path, storage_path: &Path) -> io::Result<PathState> {
    let meta = match std::fs::symlink_metadata(home_path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(PathState::Absent),
        Err(e) => return Err(e),
    };

    if !meta.is_symlink() {
        return Ok(PathState::RegularContent);
    }

    let raw = std::fs::read_link(home_path)?;
    let target = if raw.is_absolute() {
        raw.clone()
    } else {
        home_path
            .parent()
            .map_or_else(|| raw.clone(), |parent| parent.join(&raw))
    };

    if points_to(&target, storage_path) {
        Ok(PathState::LinkToStorage)
    } else {
        Ok(PathState::LinkToOther { target: raw })
    }
}

/// Returns `true` if `home_path` resolves to a location inside `storage_root`.
///
/// This happens when an ancestor of the home path is itself a link into
/// storage, so the "home" content already is the stored copy. The final
/// component is not followed.
#[must_use]
pub fn inside_storage(home_path: &Path, storage_root: &Path) -> bool {
    match (canonical_parent(home_path), dunce::canonicalize(storage_root)) {
        (Some(home), Ok(root)) => home.starts_with(root),
        _ => false,
    }
}

/// Returns `true` if `storage_root` lies at or below `home_path`.
///
/// Copying such a path into storage would copy storage into itself.
#[must_use]
pub fn contains_storage(home_path: &Path, storage_root: &Path) -> bool {
    if normalize(storage_root).starts_with(normalize(home_path)) {
        return true;
    }
    match (dunce::canonicalize(home_path), dunce::canonicalize(storage_root)) {
        (Ok(home), Ok(root)) => root.starts_with(home),
        _ => false,
    }
}

/// Compare a link target with the storage path.
///
/// Paths are first compared lexically. If that fails, the parent directories
/// are canonicalized so a storage root reached through a symlinked ancestor
/// (e.g. `/var` -> `/private/var`) still matches. The final component is never
/// followed.
fn points_to(target: &Path, storage_path: &Path) -> bool {
    if paths_equal(&normalize(target), &normalize(storage_path)) {
        return true;
    }
    match (canonical_parent(target), canonical_parent(storage_path)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn canonical_parent(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?;
    let parent = dunce::canonicalize(path.parent()?).ok()?;
    Some(parent.join(name))
}

/// Drop `.` components and fold `..` lexically.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Compare two paths, normalising the `\\?\` prefix that Windows
/// `read_link` prepends to extended-length paths.
fn paths_equal(a: &Path, b: &Path) -> bool {
    strip_win_prefix(a) == strip_win_prefix(b)
}

fn strip_win_prefix(p: &Path) -> PathBuf {
    let s = p.to_string_lossy();
    s.strip_prefix(r"\\?\")
        .map_or_else(|| p.to_path_buf(), PathBuf::from)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn absent_when_nothing_exists() {
        let dir = tempfile::tempdir().unwrap();
        let state = inspect(&dir.path().join("missing"), &dir.path().join("store")).unwrap();
        assert_eq!(state, PathState::Absent);
    }

    #[test]
    fn regular_file_is_regular_content() {
        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().join("settings.json");
        std::fs::write(&home, "A").unwrap();
        let state = inspect(&home, &dir.path().join("store/settings.json")).unwrap();
        assert_eq!(state, PathState::RegularContent);
    }

    #[test]
    fn directory_is_regular_content() {
        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().join("Config");
        std::fs::create_dir(&home).unwrap();
        let state = inspect(&home, &dir.path().join("store/Config")).unwrap();
        assert_eq!(state, PathState::RegularContent);
    }

    #[cfg(unix)]
    #[test]
    fn link_to_storage_path() {
        let dir = tempfile::tempdir().unwrap();
        let storage = dir.path().join("store.json");
        let home = dir.path().join("home.json");
        std::fs::write(&storage, "A").unwrap();
        std::os::unix::fs::symlink(&storage, &home).unwrap();
        assert_eq!(inspect(&home, &storage).unwrap(), PathState::LinkToStorage);
    }

    #[cfg(unix)]
    #[test]
    fn relative_link_to_storage_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("store")).unwrap();
        let storage = dir.path().join("store/app.conf");
        let home = dir.path().join("app.conf");
        std::fs::write(&storage, "A").unwrap();
        std::os::unix::fs::symlink("store/./app.conf", &home).unwrap();
        assert_eq!(inspect(&home, &storage).unwrap(), PathState::LinkToStorage);
    }

    #[cfg(unix)]
    #[test]
    fn dangling_link_to_storage_path_is_still_ours() {
        let dir = tempfile::tempdir().unwrap();
        let storage = dir.path().join("store.json");
        let home = dir.path().join("home.json");
        std::os::unix::fs::symlink(&storage, &home).unwrap();
        assert_eq!(inspect(&home, &storage).unwrap(), PathState::LinkToStorage);
    }

    #[cfg(unix)]
    #[test]
    fn link_elsewhere_is_foreign() {
        let dir = tempfile::tempdir().unwrap();
        let other = dir.path().join("other.json");
        let home = dir.path().join("home.json");
        std::fs::write(&other, "B").unwrap();
        std::os::unix::fs::symlink(&other, &home).unwrap();
        let state = inspect(&home, &dir.path().join("store.json")).unwrap();
        assert_eq!(state, PathState::LinkToOther { target: other });
    }

    #[cfg(unix)]
    #[test]
    fn broken_link_elsewhere_is_foreign() {
        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().join("home.json");
        std::os::unix::fs::symlink("/nonexistent/target", &home).unwrap();
        let state = inspect(&home, &dir.path().join("store.json")).unwrap();
        assert!(matches!(state, PathState::LinkToOther { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn link_through_symlinked_ancestor_matches() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real");
        std::fs::create_dir(&real).unwrap();
        std::fs::write(real.join("a.conf"), "A").unwrap();
        let alias = dir.path().join("alias");
        std::os::unix::fs::symlink(&real, &alias).unwrap();

        let home = dir.path().join("a.conf");
        std::os::unix::fs::symlink(real.join("a.conf"), &home).unwrap();
        assert_eq!(
            inspect(&home, &alias.join("a.conf")).unwrap(),
            PathState::LinkToStorage
        );
    }

    #[test]
    fn plain_home_path_is_not_inside_storage() {
        let dir = tempfile::tempdir().unwrap();
        let storage = dir.path().join("store");
        std::fs::create_dir_all(dir.path().join("home/Config")).unwrap();
        std::fs::create_dir(&storage).unwrap();
        assert!(!inside_storage(&dir.path().join("home/Config/a.conf"), &storage));
    }

    #[cfg(unix)]
    #[test]
    fn path_under_linked_parent_is_inside_storage() {
        let dir = tempfile::tempdir().unwrap();
        let storage = dir.path().join("store");
        std::fs::create_dir_all(storage.join("Library/App")).unwrap();
        std::fs::create_dir(dir.path().join("home")).unwrap();
        std::os::unix::fs::symlink(storage.join("Library"), dir.path().join("home/Library"))
            .unwrap();
        let home_path = dir.path().join("home/Library/App/prefs.json");
        assert!(inside_storage(&home_path, &storage));
    }

    #[test]
    fn missing_parent_is_not_inside_storage() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!inside_storage(
            &dir.path().join("home/missing/a.conf"),
            &dir.path().join("store")
        ));
    }

    #[test]
    fn ancestor_of_storage_contains_it() {
        let home = Path::new("/home/u/Cloud");
        assert!(contains_storage(home, Path::new("/home/u/Cloud/Appsync")));
        assert!(contains_storage(home, Path::new("/home/u/Cloud")));
        assert!(!contains_storage(home, Path::new("/home/u/CloudBackup/Appsync")));
        assert!(!contains_storage(
            Path::new("/home/u/Cloud/Appsync/x"),
            Path::new("/home/u/Cloud/Appsync")
        ));
    }

    #[test]
    fn normalize_folds_dots() {
        assert_eq!(
            normalize(Path::new("/a/./b/../c")),
            PathBuf::from("/a/c")
        );
    }

    #[test]
    fn paths_equal_with_unc_prefix() {
        let a = PathBuf::from(r"\\?\C:\Users\u\Appsync\settings.json");
        let b = PathBuf::from(r"C:\Users\u\Appsync\settings.json");
        assert!(paths_equal(&a, &b));
    }

    #[test]
    fn display_is_human_readable() {
        let state = PathState::LinkToOther {
            target: PathBuf::from("/opt/x"),
        };
        assert_eq!(state.to_string(), "foreign link to /opt/x");
        assert_eq!(PathState::LinkToStorage.to_string(), "linked to storage");
    }
}

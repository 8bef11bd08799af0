//! Filesystem primitives used by the sync engine.
//!
//! Every transfer follows copy-then-replace ordering: new content is staged
//! into a sibling of the destination, the existing destination (if any) is
//! moved aside, the staged copy is renamed into place, and only then is the
//! displaced content deleted. A failure at any step leaves the destination as
//! it was.
use sha2::{Digest, Sha256};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Returns `true` if anything (including a broken symlink) exists at `path`.
#[must_use]
pub fn exists_no_follow(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Recursively copy a directory tree.
///
/// Symlinks within the source tree are *followed*: directory symlinks are
/// recursed into and their contents materialised rather than copying the
/// link itself.
///
/// # Errors
///
/// Returns an error if the destination directory cannot be created, a source
/// entry cannot be read, or a file cannot be copied.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Copy a file or directory tree from `src` to `dst`.
///
/// # Errors
///
/// Returns an error if any part of the copy fails. Partial output is left
/// at `dst`; callers copy into a staging path so this never touches live
/// content.
pub fn copy_any(src: &Path, dst: &Path) -> io::Result<()> {
    if src.is_dir() {
        copy_dir_recursive(src, dst)
    } else {
        fs::copy(src, dst).map(|_| ())
    }
}

/// Remove whatever lives at `path` without following a final symlink.
///
/// Directories are removed recursively; symlinks (including directory
/// symlinks and broken links) are unlinked, never traversed.
///
/// # Errors
///
/// Returns an error if the path exists but cannot be removed.
pub fn remove_path(path: &Path) -> io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    if meta.is_symlink() {
        remove_symlink(path, &meta)
    } else if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Like [`remove_path`] but a missing path is not an error.
///
/// # Errors
///
/// Returns an error if the path exists but cannot be removed.
pub fn remove_if_exists(path: &Path) -> io::Result<()> {
    if exists_no_follow(path) {
        remove_path(path)?;
    }
    Ok(())
}

/// Replace `dst` with a copy of `src`.
///
/// `src` is copied into a staging sibling of `dst` first; `dst` is only
/// displaced once the copy is complete. Parent directories of `dst` are
/// created as needed.
///
/// # Errors
///
/// Returns an error if the copy or the swap fails; in that case `dst` is
/// left unchanged and the staging copy is cleaned up.
pub fn replace_with_copy(src: &Path, dst: &Path) -> io::Result<()> {
    let nested = match (dunce::canonicalize(src), resolved(dst)) {
        (Ok(src), Some(dst)) => dst.starts_with(src),
        _ => false,
    };
    if nested || dst.starts_with(src) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} lies inside {}", dst.display(), src.display()),
        ));
    }
    ensure_parent_dir(dst)?;
    let staged = sibling(dst, "tmp");
    remove_if_exists(&staged)?;
    if let Err(e) = copy_any(src, &staged) {
        let _ = remove_if_exists(&staged);
        return Err(e);
    }
    swap_into_place(&staged, dst)
}

/// Replace `link` with a symlink pointing at `target`.
///
/// The link is created at a staging sibling and then swapped into place, so
/// whatever lived at `link` is removed only after the new link exists.
///
/// # Errors
///
/// Returns an error if the link cannot be created or swapped into place.
pub fn link_into_place(target: &Path, link: &Path) -> io::Result<()> {
    if let (Some(a), Some(b)) = (resolved(target), resolved(link))
        && a == b
    {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} resolves to its own link target", link.display()),
        ));
    }
    ensure_parent_dir(link)?;
    let staged = sibling(link, "link");
    remove_if_exists(&staged)?;
    create_symlink(target, &staged)?;
    swap_into_place(&staged, link)
}

/// Move `staged` to `dst`, displacing existing content at `dst`.
fn swap_into_place(staged: &Path, dst: &Path) -> io::Result<()> {
    let displaced = if exists_no_follow(dst) {
        let old = sibling(dst, "old");
        let moved = remove_if_exists(&old).and_then(|()| fs::rename(dst, &old));
        if let Err(e) = moved {
            let _ = remove_if_exists(staged);
            return Err(e);
        }
        Some(old)
    } else {
        None
    };

    if let Err(e) = fs::rename(staged, dst) {
        if let Some(old) = &displaced {
            let _ = fs::rename(old, dst);
        }
        let _ = remove_if_exists(staged);
        return Err(e);
    }

    if let Some(old) = displaced {
        remove_path(&old)?;
    }
    Ok(())
}

/// Build a hidden sibling path of `path` used for staging, e.g.
/// `dir/.settings.json.appsync-tmp`.
/// Canonical form of `path` with only its parent resolved.
fn resolved(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?;
    let parent = dunce::canonicalize(path.parent()?).ok()?;
    Some(parent.join(name))
}

fn sibling(path: &Path, tag: &str) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(format!(".appsync-{tag}"));
    path.with_file_name(name)
}

/// Returns `true` if `a` and `b` hold byte-identical content.
///
/// Files are compared by SHA-256 digest; directories by a digest over the
/// sorted tree of entry names and file digests. A file never equals a
/// directory.
///
/// # Errors
///
/// Returns an error if either side cannot be read.
pub fn same_content(a: &Path, b: &Path) -> io::Result<bool> {
    if a.is_dir() != b.is_dir() {
        return Ok(false);
    }
    Ok(digest(a)? == digest(b)?)
}

fn digest(path: &Path) -> io::Result<Vec<u8>> {
    let mut hasher = Sha256::new();
    digest_into(path, &mut hasher)?;
    Ok(hasher.finalize().to_vec())
}

fn digest_into(path: &Path, hasher: &mut Sha256) -> io::Result<()> {
    if path.is_dir() {
        let mut entries = fs::read_dir(path)?
            .map(|e| e.map(|entry| entry.file_name()))
            .collect::<io::Result<Vec<_>>>()?;
        entries.sort();
        hasher.update(b"d");
        for name in entries {
            hasher.update(name.to_string_lossy().as_bytes());
            hasher.update([0u8]);
            digest_into(&path.join(&name), hasher)?;
        }
    } else {
        let bytes = fs::read(path)?;
        hasher.update(b"f");
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(&bytes);
    }
    Ok(())
}

/// Create a symlink at `link` pointing to `target`.
fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link)
    }

    #[cfg(windows)]
    {
        if target.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        }
    }
}

/// Remove a symlink, handling platform differences.
///
/// On Windows, directory symlinks must be removed with `remove_dir` (not
/// `remove_file`).
fn remove_symlink(path: &Path, meta: &fs::Metadata) -> io::Result<()> {
    if is_dir_like(meta) {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    }
}

/// Check if metadata represents a directory-like entry.
/// On Windows, `symlink_metadata().is_dir()` returns `false` for directory symlinks,
/// so we check the raw `FILE_ATTRIBUTE_DIRECTORY` bit instead.
fn is_dir_like(meta: &fs::Metadata) -> bool {
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        meta.file_attributes() & 0x10 != 0 // FILE_ATTRIBUTE_DIRECTORY
    }
    #[cfg(not(windows))]
    {
        meta.is_dir()
    }
}

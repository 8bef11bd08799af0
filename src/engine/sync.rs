//! The per-path decision table.
//!
//! [`apply`] inspects one [`TrackedPath`], picks the action for the
//! requested [`Operation`], asks for confirmation when the action would
//! overwrite differing content, and performs it. Every failure is turned
//! into an [`Outcome`] here; nothing escapes to the caller.
use std::path::Path;

use super::confirm::Confirm;
use super::fs;
use super::state::{self, PathState};
use super::{Action, Operation, Outcome, SkipReason, SyncMode, TrackedPath};
use crate::error::SyncError;

/// Synchronize one tracked path according to `mode`.
#[must_use]
pub fn apply(tracked: &TrackedPath, mode: &SyncMode, confirm: &dyn Confirm) -> Outcome {
    execute(tracked, mode, confirm).unwrap_or_else(|err| into_outcome(tracked, mode, err, false))
}

/// Turn a failure into a skip outcome. `conflict` records a conflict that was
/// already detected before the failure.
fn into_outcome(tracked: &TrackedPath, mode: &SyncMode, err: SyncError, conflict: bool) -> Outcome {
    let conflict = conflict || err.is_conflict();
    let reason = match err {
        SyncError::ForeignLink { target, .. } => SkipReason::ForeignLink { target },
        SyncError::Declined { .. } => SkipReason::Declined,
        SyncError::Conflict { reason, .. } => SkipReason::UnresolvedConflict(reason),
        io @ SyncError::Io { .. } => SkipReason::Error(io.to_string()),
    };
    Outcome::skipped(tracked, mode, reason).with_conflict(conflict)
}

fn execute(
    tracked: &TrackedPath,
    mode: &SyncMode,
    confirm: &dyn Confirm,
) -> Result<Outcome, SyncError> {
    let skip = |reason: SkipReason| -> Result<Outcome, SyncError> {
        Ok(Outcome::skipped(tracked, mode, reason))
    };
    if state::contains_storage(&tracked.home_path, &tracked.storage_root) {
        return skip(SkipReason::ContainsStorage);
    }

    let home_state = state::inspect(&tracked.home_path, &tracked.storage_path)
        .map_err(|e| SyncError::io(&tracked.home_path, e))?;
    if home_state == PathState::RegularContent
        && state::inside_storage(&tracked.home_path, &tracked.storage_root)
    {
        return skip(SkipReason::CoveredByParent);
    }
    let in_storage = fs::exists_no_follow(&tracked.storage_path);

    match (mode.operation, home_state) {
        (Operation::Backup, PathState::Absent) => skip(SkipReason::NothingToBackUp),
        (Operation::Backup, PathState::RegularContent) => {
            backup(tracked, mode, in_storage, confirm)
        }
        (Operation::Backup, PathState::LinkToStorage) => skip(if in_storage {
            SkipReason::AlreadyLinked
        } else {
            SkipReason::MissingStorage
        }),
        (Operation::Backup | Operation::Restore, PathState::LinkToOther { target }) => {
            Err(SyncError::ForeignLink {
                path: tracked.home_path.clone(),
                target,
            })
        }
        (Operation::Restore, _) if !in_storage => skip(SkipReason::NothingInStorage),
        (Operation::Restore, PathState::Absent) => restore(tracked, mode, false, confirm),
        (Operation::Restore, PathState::RegularContent) => restore(tracked, mode, true, confirm),
        (Operation::Restore, PathState::LinkToStorage) => {
            if mode.copy_only {
                materialize(tracked, mode, Action::CopyToHome)
            } else {
                skip(SkipReason::AlreadyLinked)
            }
        }
        (Operation::Uninstall, PathState::LinkToStorage) => {
            if in_storage {
                materialize(tracked, mode, Action::Unlink)
            } else {
                skip(SkipReason::MissingStorage)
            }
        }
        (
            Operation::Uninstall,
            PathState::Absent | PathState::RegularContent | PathState::LinkToOther { .. },
        ) => skip(SkipReason::NothingToUninstall),
    }
}

/// Home holds regular content: push it into storage.
fn backup(
    tracked: &TrackedPath,
    mode: &SyncMode,
    in_storage: bool,
    confirm: &dyn Confirm,
) -> Result<Outcome, SyncError> {
    let conflict = in_storage && differs(tracked)?;
    if in_storage && !conflict && mode.copy_only {
        return Ok(Outcome::skipped(tracked, mode, SkipReason::AlreadyInSync));
    }

    let action = if mode.copy_only {
        Action::CopyToStorage
    } else {
        Action::MoveAndLink
    };
    if mode.dry_run {
        return Ok(Outcome::applied(tracked, mode, action, conflict));
    }
    if conflict {
        let prompt = format!(
            "{}: storage already holds different content at {}. Overwrite it with {}?",
            tracked.app,
            tracked.storage_path.display(),
            tracked.home_path.display()
        );
        resolve_conflict(&tracked.storage_path, mode, confirm, &prompt)?;
    }

    let transfer = fs::replace_with_copy(&tracked.home_path, &tracked.storage_path)
        .map_err(|e| SyncError::io(&tracked.storage_path, e))
        .and_then(|()| {
            if mode.copy_only {
                return Ok(());
            }
            fs::link_into_place(&tracked.storage_path, &tracked.home_path)
                .map_err(|e| SyncError::io(&tracked.home_path, e))
        });
    Ok(finish(tracked, mode, action, conflict, transfer))
}

/// Storage holds content: bring it to the home path.
fn restore(
    tracked: &TrackedPath,
    mode: &SyncMode,
    home_exists: bool,
    confirm: &dyn Confirm,
) -> Result<Outcome, SyncError> {
    let conflict = home_exists && differs(tracked)?;
    if home_exists && !conflict && mode.copy_only {
        return Ok(Outcome::skipped(tracked, mode, SkipReason::AlreadyInSync));
    }

    let action = if mode.copy_only {
        Action::CopyToHome
    } else {
        Action::Link
    };
    if mode.dry_run {
        return Ok(Outcome::applied(tracked, mode, action, conflict));
    }
    if conflict {
        let prompt = format!(
            "{}: {} already exists with different content. Replace it with the stored copy?",
            tracked.app,
            tracked.home_path.display()
        );
        resolve_conflict(&tracked.home_path, mode, confirm, &prompt)?;
    }

    let transfer = if mode.copy_only {
        fs::replace_with_copy(&tracked.storage_path, &tracked.home_path)
    } else {
        fs::link_into_place(&tracked.storage_path, &tracked.home_path)
    };
    let transfer = transfer.map_err(|e| SyncError::io(&tracked.home_path, e));
    Ok(finish(tracked, mode, action, conflict, transfer))
}

fn finish(
    tracked: &TrackedPath,
    mode: &SyncMode,
    action: Action,
    conflict: bool,
    transfer: Result<(), SyncError>,
) -> Outcome {
    match transfer {
        Ok(()) => Outcome::applied(tracked, mode, action, conflict),
        Err(err) => into_outcome(tracked, mode, err, conflict),
    }
}

/// Home is our link: replace it with a copy of the storage content.
fn materialize(tracked: &TrackedPath, mode: &SyncMode, action: Action) -> Result<Outcome, SyncError> {
    if !mode.dry_run {
        fs::replace_with_copy(&tracked.storage_path, &tracked.home_path)
            .map_err(|e| SyncError::io(&tracked.home_path, e))?;
    }
    Ok(Outcome::applied(tracked, mode, action, false))
}

fn differs(tracked: &TrackedPath) -> Result<bool, SyncError> {
    fs::same_content(&tracked.home_path, &tracked.storage_path)
        .map(|same| !same)
        .map_err(|e| SyncError::io(&tracked.home_path, e))
}

fn resolve_conflict(
    destination: &Path,
    mode: &SyncMode,
    confirm: &dyn Confirm,
    prompt: &str,
) -> Result<(), SyncError> {
    if mode.force {
        return Ok(());
    }
    match confirm.confirm(prompt) {
        Ok(true) => Ok(()),
        Ok(false) => Err(SyncError::Declined {
            path: destination.to_path_buf(),
        }),
        Err(e) => Err(SyncError::Conflict {
            path: destination.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

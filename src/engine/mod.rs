//! Path-synchronization engine.
//!
//! The engine is organised in four layers, leaves first:
//!
//! - **[`paths`]**: resolve an application-relative path to its home and
//!   storage forms
//! - **[`state`]**: classify the home-side path (`Absent`, `RegularContent`,
//!   `LinkToStorage`, `LinkToOther`)
//! - **[`sync`]**: decide and perform the action for one path
//! - **[`batch`]**: run the engine over every enabled application
pub mod batch;
pub mod confirm;
pub mod fs;
pub mod paths;
pub mod state;
pub mod sync;

use std::fmt;
use std::path::PathBuf;

pub use batch::{BatchCounts, BatchResult};
pub use confirm::{AssumeNo, AssumeYes, Confirm, TerminalConfirm};
pub use paths::{Roots, TrackedPath};
pub use state::PathState;

/// The three synchronization operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Move home content into storage and link it back.
    Backup,
    /// Recreate home paths from storage.
    Restore,
    /// Turn links back into independent content.
    Uninstall,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backup => write!(f, "backup"),
            Self::Restore => write!(f, "restore"),
            Self::Uninstall => write!(f, "uninstall"),
        }
    }
}

/// Per-run synchronization settings, passed explicitly into every call.
///
/// # Examples
///
/// ```
/// use appsync_cli::engine::{Operation, SyncMode};
///
/// let mode = SyncMode::new(Operation::Backup).with_copy_only(true);
/// assert!(mode.copy_only);
/// assert!(!mode.force);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct SyncMode {
    /// Which operation to perform.
    pub operation: Operation,
    /// Never create or remove links; every transfer is a plain copy.
    pub copy_only: bool,
    /// Skip confirmation before overwriting conflicting content.
    pub force: bool,
    /// Report actions without touching the filesystem.
    pub dry_run: bool,
}

impl SyncMode {
    /// A mode for `operation` with every flag off.
    #[must_use]
    pub const fn new(operation: Operation) -> Self {
        Self {
            operation,
            copy_only: false,
            force: false,
            dry_run: false,
        }
    }

    /// Set the copy-only flag.
    #[must_use]
    pub const fn with_copy_only(mut self, copy_only: bool) -> Self {
        self.copy_only = copy_only;
        self
    }

    /// Set the force flag.
    #[must_use]
    pub const fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Set the dry-run flag.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// What the engine did (or, in dry-run mode, would do) for one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Home content moved into storage and replaced by a link.
    MoveAndLink,
    /// Home content copied into storage; home left as is.
    CopyToStorage,
    /// A link to storage created at the home path.
    Link,
    /// Storage content copied to the home path.
    CopyToHome,
    /// Link replaced by a copy of the storage content.
    Unlink,
    /// Nothing was done.
    Skip,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MoveAndLink => write!(f, "move to storage and link"),
            Self::CopyToStorage => write!(f, "copy to storage"),
            Self::Link => write!(f, "link from storage"),
            Self::CopyToHome => write!(f, "copy from storage"),
            Self::Unlink => write!(f, "unlink and copy back"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

/// Why a path was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Backup found nothing at the home path.
    NothingToBackUp,
    /// Restore found nothing in storage.
    NothingInStorage,
    /// The home path already links to storage.
    AlreadyLinked,
    /// Copy-only transfer where both sides already match.
    AlreadyInSync,
    /// Uninstall found no link of ours at the home path.
    NothingToUninstall,
    /// The home path links to storage but the storage copy is gone.
    MissingStorage,
    /// The home path is reached through a parent already linked into storage.
    CoveredByParent,
    /// The home path is the storage directory or one of its ancestors.
    ContainsStorage,
    /// The home path is a symlink not owned by appsync.
    ForeignLink {
        /// Where the link points.
        target: PathBuf,
    },
    /// The user declined to overwrite conflicting content.
    Declined,
    /// A conflict could not be put to the user.
    UnresolvedConflict(String),
    /// A filesystem operation failed.
    Error(String),
}

impl SkipReason {
    /// Returns `true` if the reason deserves a warning rather than a debug line.
    #[must_use]
    pub const fn is_notable(&self) -> bool {
        matches!(
            self,
            Self::MissingStorage
                | Self::ContainsStorage
                | Self::ForeignLink { .. }
                | Self::Declined
                | Self::UnresolvedConflict(_)
        )
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingToBackUp => write!(f, "nothing to back up"),
            Self::NothingInStorage => write!(f, "nothing in storage"),
            Self::AlreadyLinked => write!(f, "already linked"),
            Self::AlreadyInSync => write!(f, "already in sync"),
            Self::NothingToUninstall => write!(f, "nothing to uninstall"),
            Self::MissingStorage => write!(f, "linked, but storage copy is missing"),
            Self::CoveredByParent => write!(f, "inside a directory already linked to storage"),
            Self::ContainsStorage => write!(f, "contains the storage directory"),
            Self::ForeignLink { target } => {
                write!(f, "foreign link to {}, not touching it", target.display())
            }
            Self::Declined => write!(f, "declined"),
            Self::UnresolvedConflict(reason) => write!(f, "unresolved conflict: {reason}"),
            Self::Error(message) => write!(f, "error: {message}"),
        }
    }
}

/// Structured result of running the engine on one tracked path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Owning application name.
    pub app: String,
    /// Home-relative path.
    pub path: PathBuf,
    /// Operation that was requested.
    pub operation: Operation,
    /// Action taken; [`Action::Skip`] when nothing happened.
    pub action: Action,
    /// Set whenever `action` is [`Action::Skip`].
    pub skip_reason: Option<SkipReason>,
    /// The path hit conflicting content (whatever the resolution).
    pub conflict: bool,
    /// The action was only reported, not performed.
    pub dry_run: bool,
}

impl Outcome {
    /// An outcome for `tracked` where `action` was (or would be) performed.
    #[must_use]
    pub fn applied(tracked: &TrackedPath, mode: &SyncMode, action: Action, conflict: bool) -> Self {
        debug_assert!(action != Action::Skip, "use Outcome::skipped for skips");
        Self {
            app: tracked.app.clone(),
            path: tracked.relative.clone(),
            operation: mode.operation,
            action,
            skip_reason: None,
            conflict,
            dry_run: mode.dry_run,
        }
    }

    /// A skip outcome for `tracked`.
    #[must_use]
    pub fn skipped(tracked: &TrackedPath, mode: &SyncMode, reason: SkipReason) -> Self {
        Self {
            app: tracked.app.clone(),
            path: tracked.relative.clone(),
            operation: mode.operation,
            action: Action::Skip,
            skip_reason: Some(reason),
            conflict: false,
            dry_run: mode.dry_run,
        }
    }

    /// Mark this outcome as having hit a conflict.
    #[must_use]
    pub const fn with_conflict(mut self, conflict: bool) -> Self {
        self.conflict = conflict;
        self
    }

    /// Returns `true` if the path failed with an I/O error.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.skip_reason, Some(SkipReason::Error(_)))
    }

    /// Returns `true` if nothing was done (including errors).
    #[must_use]
    pub const fn is_skip(&self) -> bool {
        matches!(self.action, Action::Skip)
    }
}

//! Run the engine over every enabled application and aggregate the results.
use std::sync::atomic::{AtomicBool, Ordering};

use super::confirm::Confirm;
use super::paths::{Roots, TrackedPath};
use super::{Operation, Outcome, SyncMode, sync};
use crate::config::catalog::Application;
use crate::logging::Log;

/// Per-category counts for a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchCounts {
    /// Paths backed up (moved or copied into storage).
    pub backed_up: usize,
    /// Paths restored from storage.
    pub restored: usize,
    /// Paths turned back into independent content.
    pub uninstalled: usize,
    /// Paths where nothing was done (excluding errors).
    pub skipped: usize,
    /// Paths that hit conflicting content, however it was resolved.
    pub conflicted: usize,
    /// Paths that failed with an I/O error.
    pub errored: usize,
}

impl BatchCounts {
    /// Total number of paths processed.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.backed_up + self.restored + self.uninstalled + self.skipped + self.errored
    }
}

/// Aggregated result of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    /// Per-category counts.
    pub counts: BatchCounts,
    /// Every per-path outcome, in processing order.
    pub outcomes: Vec<Outcome>,
    /// The run was interrupted before every path was processed.
    pub interrupted: bool,
    /// The outcomes describe what would happen; nothing was changed.
    pub dry_run: bool,
}

impl BatchResult {
    /// Fold one outcome into the counts.
    pub fn record(&mut self, outcome: Outcome) {
        let counts = &mut self.counts;
        if outcome.conflict {
            counts.conflicted += 1;
        }
        if outcome.is_error() {
            counts.errored += 1;
        } else if outcome.is_skip() {
            counts.skipped += 1;
        } else {
            match outcome.operation {
                Operation::Backup => counts.backed_up += 1,
                Operation::Restore => counts.restored += 1,
                Operation::Uninstall => counts.uninstalled += 1,
            }
        }
        self.outcomes.push(outcome);
    }

    /// `true` unless at least one path errored. Declined or unresolved
    /// conflicts are not failures.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.counts.errored == 0
    }

    /// Outcomes that errored.
    pub fn errors(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| o.is_error())
    }
}

/// Run the engine over every path of every application, in order.
///
/// Each path is fully processed before the next one starts. A failing path
/// never stops the batch; `interrupt` is checked between paths only, so the
/// path in progress always completes.
pub fn run<'a>(
    applications: impl IntoIterator<Item = &'a Application>,
    mode: &SyncMode,
    roots: &Roots,
    confirm: &dyn Confirm,
    log: &dyn Log,
    interrupt: &AtomicBool,
) -> BatchResult {
    let mut result = BatchResult {
        dry_run: mode.dry_run,
        ..BatchResult::default()
    };

    for app in applications {
        log.debug(&format!("{}: {} path(s)", app.name, app.paths.len()));
        for relative in &app.paths {
            if interrupt.load(Ordering::SeqCst) {
                log.warn("interrupted, stopping before the next path");
                result.interrupted = true;
                return result;
            }
            let tracked = TrackedPath::resolve(roots, &app.name, relative);
            let outcome = sync::apply(&tracked, mode, confirm);
            log.outcome(&outcome);
            result.record(outcome);
        }
    }

    result
}

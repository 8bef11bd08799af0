//! Console and file logger with dry-run awareness and a run summary.
use std::path::{Path, PathBuf};

use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET};
use super::types::Log;
use super::utils::log_file_path;
use crate::engine::{BatchResult, Outcome};

/// Implement the message methods of [`Log`] by delegating to inherent
/// methods of the same name on the implementing type.
///
/// `outcome` is not included because its signature differs from the
/// `fn(&self, &str)` pattern shared by the message methods.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Logger that renders through the global `tracing` subscriber.
///
/// Every message is also written to `$XDG_CACHE_HOME/appsync/<command>.log`
/// by the [`FileLayer`](super::subscriber::FileLayer) installed in
/// [`init_subscriber`](super::subscriber::init_subscriber); the logger only
/// remembers the path so the summary can point at it.
#[derive(Debug)]
pub struct Logger {
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a logger for `command`. Does not touch the filesystem.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            log_file: Some(log_file_path(command)),
        }
    }

    /// Create a logger whose summary reports `path` as the log file.
    #[must_use]
    pub fn with_log_file(path: impl Into<PathBuf>) -> Self {
        Self {
            log_file: Some(path.into()),
        }
    }

    /// Return the log file path, if any.
    #[must_use]
    pub fn log_path(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Report one per-path outcome at a level that matches its weight.
    ///
    /// Errors go to `error`, notable skips (foreign links, declined or
    /// unresolved conflicts, missing storage) to `warn`, and routine skips
    /// to `debug`. Performed actions are `info`, or `dry_run` when nothing
    /// was changed.
    pub fn outcome(&self, outcome: &Outcome) {
        let line = describe_outcome(outcome);
        match &outcome.skip_reason {
            Some(_) if outcome.is_error() => self.error(&line),
            Some(reason) if reason.is_notable() => self.warn(&line),
            Some(_) => self.debug(&line),
            None if outcome.dry_run => self.dry_run(&line),
            None => self.info(&line),
        }
    }

    /// Print the per-category totals of a batch run and where the log lives.
    pub fn print_summary(&self, result: &BatchResult) {
        self.stage("Summary");
        self.info(&summary_line(result));

        for failed in result.errors() {
            self.error(&describe_outcome(failed));
        }
        if result.interrupted {
            self.warn("run was interrupted; remaining paths were not processed");
        }
        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

/// One-line, human-readable description of an outcome.
#[must_use]
pub fn describe_outcome(outcome: &Outcome) -> String {
    let subject = format!("{}: {}", outcome.app, outcome.path.display());
    let conflict = if outcome.conflict {
        " (conflict)"
    } else {
        ""
    };
    let action = outcome.action;
    match &outcome.skip_reason {
        Some(reason) => format!("{subject}: skipped, {reason}{conflict}"),
        None if outcome.dry_run => format!("{subject}: would {action}{conflict}"),
        None => format!("{subject}: {action}{conflict}"),
    }
}

/// Totals line for the summary, without colors.
fn summary_line(result: &BatchResult) -> String {
    let c = &result.counts;
    let prefix = if result.dry_run { "[dry run] " } else { "" };
    format!(
        "{prefix}{} path(s): {} backed up, {} restored, {} uninstalled, {} skipped, {} conflicted, {} errored",
        c.total(),
        c.backed_up,
        c.restored,
        c.uninstalled,
        c.skipped,
        c.conflicted,
        c.errored,
    )
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn outcome(&self, outcome: &Outcome) {
        self.outcome(outcome);
    }
}

//! Backup, restore, and uninstall: run the engine over every enabled
//! application.
use anyhow::{Result, bail};
use std::sync::atomic::AtomicBool;

use super::CommandSetup;
use crate::cli::GlobalOpts;
use crate::engine::{AssumeYes, BatchResult, Confirm, Operation, SyncMode, TerminalConfirm, batch};
use crate::error::ConfigError;
use crate::logging::{Log, Logger};

/// Run `operation` for every enabled application, print the summary, and
/// bail if any path errored or the run was interrupted.
///
/// # Errors
///
/// Returns an error if configuration fails to load, the storage root is
/// missing for a restore or uninstall, or any path errored.
pub fn run(
    global: &GlobalOpts,
    operation: Operation,
    log: &Logger,
    interrupt: &AtomicBool,
) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let mode = global.sync_mode(operation);
    let confirm: Box<dyn Confirm> = if mode.force {
        Box::new(AssumeYes)
    } else {
        Box::new(TerminalConfirm)
    };

    let result = execute(&setup, &mode, confirm.as_ref(), log, interrupt)?;
    log.print_summary(&result);

    if result.interrupted {
        bail!("interrupted");
    }
    let errored = result.counts.errored;
    if errored > 0 {
        bail!("{errored} path(s) failed");
    }
    Ok(())
}

/// Prepare the storage root and run the batch.
///
/// Backup creates a missing storage root (or reports that it would, in a
/// dry run); restore and uninstall require it to exist.
///
/// # Errors
///
/// Returns [`ConfigError::StorageNotFound`] when restore or uninstall finds
/// no storage root, or an I/O error if backup cannot create it.
pub fn execute(
    setup: &CommandSetup,
    mode: &SyncMode,
    confirm: &dyn Confirm,
    log: &dyn Log,
    interrupt: &AtomicBool,
) -> Result<BatchResult> {
    let storage = &setup.roots.storage;
    if !storage.is_dir() {
        match mode.operation {
            Operation::Backup if mode.dry_run => {
                log.dry_run(&format!("would create {}", storage.display()));
            }
            Operation::Backup => {
                std::fs::create_dir_all(storage).map_err(|source| ConfigError::Io {
                    path: storage.clone(),
                    source,
                })?;
                log.info(&format!("created {}", storage.display()));
            }
            Operation::Restore | Operation::Uninstall => {
                return Err(ConfigError::StorageNotFound(storage.clone()).into());
            }
        }
    }

    let enabled = setup.enabled(log);
    log.stage(&stage_title(mode, enabled.len()));
    Ok(batch::run(
        enabled,
        mode,
        &setup.roots,
        confirm,
        log,
        interrupt,
    ))
}

fn stage_title(mode: &SyncMode, apps: usize) -> String {
    let verb = match mode.operation {
        Operation::Backup => "Backing up",
        Operation::Restore => "Restoring",
        Operation::Uninstall => "Uninstalling",
    };
    let how = if mode.copy_only { " (copy only)" } else { "" };
    format!("{verb} {apps} application(s){how}")
}

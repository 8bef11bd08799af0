//! Command: list catalog applications.
use anyhow::{Context as _, Result};
use serde::Serialize;
use std::path::PathBuf;

use super::CommandSetup;
use crate::cli::{GlobalOpts, ListOpts};
use crate::logging::Log;

/// One row of `appsync list`.
#[derive(Debug, Serialize)]
struct Entry<'a> {
    id: &'a str,
    name: &'a str,
    enabled: bool,
    paths: &'a [PathBuf],
}

/// Print every catalog application and whether it is enabled.
///
/// # Errors
///
/// Returns an error if configuration fails to load.
#[allow(clippy::print_stdout)]
pub fn run(global: &GlobalOpts, opts: &ListOpts, log: &dyn Log) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let entries = entries(&setup, log);

    if opts.json {
        let json = serde_json::to_string_pretty(&entries).context("serializing catalog")?;
        println!("{json}");
        return Ok(());
    }

    log.stage("Applications");
    for entry in &entries {
        let mark = if entry.enabled { "+" } else { "-" };
        log.info(&format!(
            "{mark} {} ({}), {} path(s)",
            entry.id,
            entry.name,
            entry.paths.len()
        ));
    }
    Ok(())
}

fn entries<'a>(setup: &'a CommandSetup, log: &dyn Log) -> Vec<Entry<'a>> {
    let enabled = setup.enabled(log);
    setup
        .catalog
        .iter()
        .map(|app| Entry {
            id: &app.id,
            name: &app.name,
            enabled: enabled.iter().any(|e| e.id == app.id),
            paths: &app.paths,
        })
        .collect()
}

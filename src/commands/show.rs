//! Command: show the state of one application's paths.
use anyhow::Result;

use super::CommandSetup;
use crate::cli::{GlobalOpts, ShowOpts};
use crate::config::catalog::Application;
use crate::engine::{Roots, TrackedPath, state};
use crate::error::ConfigError;
use crate::logging::Log;

/// Inspect and report every path of the named application. Never mutates.
///
/// # Errors
///
/// Returns an error if configuration fails to load or no application
/// matches the given id or name.
pub fn run(global: &GlobalOpts, opts: &ShowOpts, log: &dyn Log) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let app = setup
        .catalog
        .iter()
        .find(|app| app.matches(&opts.application))
        .ok_or_else(|| ConfigError::UnknownApplication(opts.application.clone()))?;

    let enabled = setup.settings.applications.is_enabled(app);
    log.stage(&format!(
        "{} ({}){}",
        app.name,
        app.id,
        if enabled { "" } else { ", disabled" }
    ));
    for line in describe(app, &setup.roots) {
        log.info(&line);
    }
    Ok(())
}

/// One line per tracked path: the relative path and its current state.
fn describe(app: &Application, roots: &Roots) -> Vec<String> {
    app.paths
        .iter()
        .map(|relative| {
            let tracked = TrackedPath::resolve(roots, &app.name, relative);
            let stored = if tracked.storage_path.exists() {
                "stored"
            } else {
                "not stored"
            };
            match state::inspect(&tracked.home_path, &tracked.storage_path) {
                Ok(state) => format!("{}: {state}, {stored}", relative.display()),
                Err(e) => format!("{}: cannot inspect: {e}", relative.display()),
            }
        })
        .collect()
}

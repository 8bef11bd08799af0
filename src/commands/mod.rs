//! Top-level subcommand orchestration.
pub mod list;
pub mod show;
pub mod sync;
pub mod version;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::catalog::{self, Application};
use crate::config::{self, CATALOG_DIR, SETTINGS_FILE, Settings};
use crate::engine::Roots;
use crate::logging::Log;

/// Shared state produced by the common command setup sequence.
///
/// Resolves the home and storage roots, loads the settings file, and loads
/// the application catalog so each command does not repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Home and storage roots for this run.
    pub roots: Roots,
    /// Loaded settings.
    pub settings: Settings,
    /// Every application in the catalog, sorted by id.
    pub catalog: Vec<Application>,
}

impl CommandSetup {
    /// Resolve roots and load settings and the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined, or the
    /// settings file or any catalog file fails to load.
    pub fn init(global: &GlobalOpts, log: &dyn Log) -> Result<Self> {
        let home = match &global.home {
            Some(home) => home.clone(),
            None => config::home_dir()?,
        };

        log.stage("Loading configuration");
        let settings_path = global
            .config
            .clone()
            .unwrap_or_else(|| home.join(SETTINGS_FILE));
        let settings = Settings::load(&settings_path)
            .with_context(|| format!("loading {}", settings_path.display()))?;
        log.debug(&format!("settings: {}", settings_path.display()));

        let storage = global
            .storage
            .clone()
            .unwrap_or_else(|| settings.storage_root(&home));

        let catalog_dir = global
            .catalog
            .clone()
            .unwrap_or_else(|| home.join(CATALOG_DIR));
        let catalog = catalog::load_dir(&catalog_dir)
            .with_context(|| format!("loading catalog from {}", catalog_dir.display()))?;
        if catalog.is_empty() {
            log.warn(&format!(
                "no applications found in {}",
                catalog_dir.display()
            ));
        }

        log.info(&format!("home: {}", home.display()));
        log.info(&format!("storage: {}", storage.display()));
        log.info(&format!("loaded {} application(s)", catalog.len()));

        Ok(Self {
            roots: Roots::new(home, storage),
            settings,
            catalog,
        })
    }

    /// Applications enabled by the `[applications]` filter, in catalog order.
    /// Filter entries naming no application are reported as warnings.
    pub fn enabled(&self, log: &dyn Log) -> Vec<&Application> {
        let (enabled, warnings) = self.settings.applications.select(&self.catalog);
        for warning in &warnings {
            log.warn(warning);
        }
        enabled
    }
}

//! Command-line interface definition.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::engine::{Operation, SyncMode};

/// Top-level CLI entry point for appsync.
#[derive(Parser, Debug)]
#[command(
    name = "appsync",
    about = "Keep application settings in a shared storage directory",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'n', long, global = true)]
    pub dry_run: bool,

    /// Overwrite conflicting content without asking
    #[arg(short, long, global = true)]
    pub force: bool,

    /// Copy files instead of linking them
    #[arg(short, long, global = true)]
    pub copy_only: bool,

    /// Override the home directory
    #[arg(long, global = true, value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Override the storage directory
    #[arg(long, global = true, value_name = "DIR")]
    pub storage: Option<PathBuf>,

    /// Override the application catalog directory
    #[arg(long, global = true, value_name = "DIR")]
    pub catalog: Option<PathBuf>,

    /// Override the settings file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl GlobalOpts {
    /// Translate the flags into a [`SyncMode`] for `operation`.
    #[must_use]
    pub const fn sync_mode(&self, operation: Operation) -> SyncMode {
        SyncMode::new(operation)
            .with_copy_only(self.copy_only)
            .with_force(self.force)
            .with_dry_run(self.dry_run)
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Move application settings into storage and link them back
    Backup,
    /// Link (or copy) application settings from storage
    Restore,
    /// Replace links into storage with independent copies
    Uninstall,
    /// List catalog applications and whether they are enabled
    List(ListOpts),
    /// Show the state of every path of one application
    Show(ShowOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Short name used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Backup => "backup",
            Self::Restore => "restore",
            Self::Uninstall => "uninstall",
            Self::List(_) => "list",
            Self::Show(_) => "show",
            Self::Version => "version",
        }
    }
}

/// Options for the `list` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct ListOpts {
    /// Print the catalog as JSON
    #[arg(long)]
    pub json: bool,
}

/// Options for the `show` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ShowOpts {
    /// Application id or name
    pub application: String,
}

//! appsync: keep per-application settings in a shared storage directory.
//!
//! Each application in the catalog declares paths relative to the home
//! directory. `backup` moves them into storage and links them back,
//! `restore` links (or copies) them from storage on another machine, and
//! `uninstall` turns the links back into independent copies.
//!
//! - **[`engine`]**: state inspection and the per-path sync decision
//! - **[`config`]**: settings file, roots, and the application catalog
//! - **[`commands`]**: top-level subcommand orchestration
//! - **[`logging`]**: console and file output through `tracing`
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;

// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed home, storage root, and catalog, and
// a fluent builder so each integration test can set up an isolated
// environment without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::AtomicBool;

use appsync_cli::cli::GlobalOpts;
use appsync_cli::commands::CommandSetup;
use appsync_cli::commands::sync::execute;
use appsync_cli::engine::{BatchResult, Confirm, Operation, Outcome, SyncMode};
use appsync_cli::logging::Log;

/// A [`Log`] that keeps messages in memory so tests can inspect them.
#[derive(Debug, Default)]
pub struct MemoryLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryLog {
    fn push(&self, level: &str, msg: &str) {
        self.lines
            .lock()
            .expect("log lock")
            .push(format!("{level}: {msg}"));
    }

    /// Every recorded line, prefixed with its level.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("log lock").clone()
    }
}

impl Log for MemoryLog {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn dry_run(&self, msg: &str) {
        self.push("dry_run", msg);
    }
    fn outcome(&self, outcome: &Outcome) {
        self.push("outcome", &appsync_cli::logging::describe_outcome(outcome));
    }
}

/// An isolated home, storage root, and catalog backed by a
/// [`tempfile::TempDir`], deleted when dropped.
pub struct IntegrationTestContext {
    /// Temporary directory holding `home/`, `storage/`, and `apps/`.
    pub root: tempfile::TempDir,
}

impl IntegrationTestContext {
    /// Create a context with an empty home and catalog. The storage root is
    /// created so restore and uninstall can run.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        for dir in ["home", "storage", "apps"] {
            std::fs::create_dir_all(root.path().join(dir)).expect("create fixture dir");
        }
        Self { root }
    }

    /// Home directory.
    pub fn home(&self) -> PathBuf {
        self.root.path().join("home")
    }

    /// Storage root.
    pub fn storage(&self) -> PathBuf {
        self.root.path().join("storage")
    }

    /// Catalog directory.
    pub fn catalog(&self) -> PathBuf {
        self.root.path().join("apps")
    }

    /// Global options pointing every root at this context.
    pub fn global(&self) -> GlobalOpts {
        GlobalOpts {
            home: Some(self.home()),
            storage: Some(self.storage()),
            catalog: Some(self.catalog()),
            config: Some(self.root.path().join("appsync.toml")),
            ..GlobalOpts::default()
        }
    }

    /// Load settings and catalog the way every command does.
    pub fn setup(&self) -> CommandSetup {
        CommandSetup::init(&self.global(), &MemoryLog::default()).expect("command setup")
    }

    /// Run `mode` over the enabled applications.
    pub fn run(&self, mode: &SyncMode, confirm: &dyn Confirm) -> BatchResult {
        self.run_logged(mode, confirm, &MemoryLog::default())
    }

    /// Run `mode` over the enabled applications, logging into `log`.
    pub fn run_logged(&self, mode: &SyncMode, confirm: &dyn Confirm, log: &MemoryLog) -> BatchResult {
        execute(&self.setup(), mode, confirm, log, &AtomicBool::new(false)).expect("run batch")
    }

    /// Run `mode` with caller-supplied global options.
    pub fn run_with(&self, global: &GlobalOpts, mode: &SyncMode, confirm: &dyn Confirm) -> BatchResult {
        let log = MemoryLog::default();
        let setup = CommandSetup::init(global, &log).expect("command setup");
        execute(&setup, mode, confirm, &log, &AtomicBool::new(false)).expect("run batch")
    }

    /// Shortcut for a plain (linked, interactive) run of `operation`.
    pub fn run_op(&self, operation: Operation, confirm: &dyn Confirm) -> BatchResult {
        self.run(&SyncMode::new(operation), confirm)
    }

    /// Read a home-relative file.
    pub fn read_home(&self, relative: &str) -> String {
        std::fs::read_to_string(self.home().join(relative)).expect("read home file")
    }

    /// Read a storage-relative file.
    pub fn read_storage(&self, relative: &str) -> String {
        std::fs::read_to_string(self.storage().join(relative)).expect("read storage file")
    }

    /// Returns `true` if the home-relative path is a symlink.
    pub fn home_is_link(&self, relative: &str) -> bool {
        is_link(&self.home().join(relative))
    }
}

/// Returns `true` if `path` itself is a symlink.
pub fn is_link(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink())
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, content).expect("write fixture file");
}

/// Fluent builder for [`IntegrationTestContext`].
pub struct TestContextBuilder {
    ctx: IntegrationTestContext,
}

impl TestContextBuilder {
    /// Begin building a new context.
    pub fn new() -> Self {
        Self {
            ctx: IntegrationTestContext::new(),
        }
    }

    /// Add `<id>.toml` to the catalog.
    pub fn with_app(self, id: &str, name: &str, paths: &[&str]) -> Self {
        let paths = paths
            .iter()
            .map(|p| format!("{p:?}"))
            .collect::<Vec<_>>()
            .join(", ");
        write_file(
            &self.ctx.catalog().join(format!("{id}.toml")),
            &format!("name = {name:?}\npaths = [{paths}]\n"),
        );
        self
    }

    /// Write a file under the home directory.
    pub fn with_home_file(self, relative: &str, content: &str) -> Self {
        write_file(&self.ctx.home().join(relative), content);
        self
    }

    /// Write a file under the storage root.
    pub fn with_storage_file(self, relative: &str, content: &str) -> Self {
        write_file(&self.ctx.storage().join(relative), content);
        self
    }

    /// Write the settings file.
    pub fn with_settings(self, content: &str) -> Self {
        write_file(&self.ctx.root.path().join("appsync.toml"), content);
        self
    }

    /// Remove the storage root so restore and uninstall find none.
    pub fn without_storage(self) -> Self {
        std::fs::remove_dir_all(self.ctx.storage()).expect("remove storage dir");
        self
    }

    /// Finish building and return the configured context.
    pub fn build(self) -> IntegrationTestContext {
        self.ctx
    }
}

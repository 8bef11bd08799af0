//! The [`Log`] trait shared by the engine and command handlers.
use crate::engine::Outcome;

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) renders through `tracing`; tests use a
/// recording implementation. The engine only ever talks to this trait, so it
/// emits structured outcomes and never formats console output itself.
pub trait Log {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Report the outcome of one tracked path.
    fn outcome(&self, outcome: &Outcome);
}

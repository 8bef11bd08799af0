//! Confirmation providers consulted before overwriting conflicting content.
use anyhow::Result;

/// Answers "may this content be overwritten?" questions for the engine.
///
/// The engine never prompts directly; it calls through this trait so that
/// `--force`, scripted runs, and tests can supply a deterministic answer.
#[cfg_attr(test, mockall::automock)]
pub trait Confirm {
    /// Ask whether the action described by `prompt` may proceed.
    ///
    /// # Errors
    ///
    /// Returns an error if no answer can be obtained (e.g. stdin is not a
    /// terminal). The engine treats that as an unresolved conflict.
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// Interactive terminal prompt, defaulting to "no".
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        let answer = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?;
        Ok(answer)
    }
}

/// Always answers "yes"; selected by `--force`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Always answers "no".
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeNo;

impl Confirm for AssumeNo {
    fn confirm(&self, _prompt: &str) -> Result<bool> {
        Ok(false)
    }
}

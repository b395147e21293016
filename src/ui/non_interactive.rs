//! Non-interactive UI for CI/headless environments.

use std::collections::HashMap;

use crate::error::{DsommError, Result};

use super::{OutputMode, ProgressHandle, Prompt, PromptResult, RunProgressBar, UserInterface};

/// Environment variables with this prefix answer prompts by key,
/// e.g. `DSOMM_PROMPT_REPOS=acme/api`.
pub const PROMPT_ENV_PREFIX: &str = "DSOMM_PROMPT_";

/// UI that never asks.
///
/// Prompts are answered from `DSOMM_PROMPT_<KEY>` variables, then from the
/// prompt's default; a prompt with neither is an error.
pub struct NonInteractiveUI {
    mode: OutputMode,
    env_overrides: HashMap<String, String>,
}

impl NonInteractiveUI {
    pub fn new(mode: OutputMode) -> Self {
        let env_overrides = std::env::vars()
            .filter(|(k, _)| k.starts_with(PROMPT_ENV_PREFIX))
            .collect();

        Self {
            mode,
            env_overrides,
        }
    }

    /// Create with explicit overrides instead of reading the environment.
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            env_overrides: overrides,
        }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("✓ {}", msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("⚠ {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        let env_key = format!("{}{}", PROMPT_ENV_PREFIX, prompt.key.to_uppercase());
        if let Some(value) = self.env_overrides.get(&env_key) {
            tracing::debug!(key = %prompt.key, "Prompt answered from environment");
            return Ok(PromptResult::String(value.clone()));
        }

        if let Some(default) = &prompt.default {
            return Ok(PromptResult::String(default.clone()));
        }

        Err(DsommError::PromptUnavailable {
            key: prompt.key.clone(),
        })
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", title);
        }
    }

    fn start_progress(&mut self, _total: usize) -> Box<dyn ProgressHandle> {
        Box::new(RunProgressBar::hidden())
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

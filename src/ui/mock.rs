//! Mock UI implementation for testing.
//!
//! `MockUI` captures every interaction for later assertion and answers
//! prompts from pre-configured responses.
//!
//! # Example
//!
//! ```
//! use dsomm::ui::{MockUI, Prompt, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.set_prompt_response("repos", "acme/api");
//!
//! let answer = ui.prompt(&Prompt::input("repos", "Repositories?")).unwrap();
//! assert_eq!(answer.as_string(), "acme/api");
//! assert!(ui.prompts_shown().contains(&"repos".to_string()));
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{DsommError, Result};

use super::{OutputMode, ProgressHandle, Prompt, PromptResult, UserInterface};

/// Mock UI implementation for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    interactive: bool,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    prompt_responses: HashMap<String, String>,
    prompts_shown: Vec<String>,
    progress: Rc<RefCell<ProgressLog>>,
}

/// What the mock progress handles saw.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProgressLog {
    pub total: usize,
    pub advanced: Vec<String>,
    pub lines: Vec<String>,
    pub finished: Option<String>,
}

impl MockUI {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Answer prompts with this key using `response`.
    pub fn set_prompt_response(&mut self, key: &str, response: &str) {
        self.prompt_responses
            .insert(key.to_string(), response.to_string());
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Keys of every prompt shown, in order.
    pub fn prompts_shown(&self) -> &[String] {
        &self.prompts_shown
    }

    pub fn progress(&self) -> ProgressLog {
        self.progress.borrow().clone()
    }

    /// Whether any message contains `needle`.
    pub fn has_message(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.contains(needle))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        self.prompts_shown.push(prompt.key.clone());

        if let Some(response) = self.prompt_responses.get(&prompt.key) {
            return Ok(PromptResult::String(response.clone()));
        }
        match &prompt.default {
            Some(default) => Ok(PromptResult::String(default.clone())),
            None => Err(DsommError::PromptUnavailable {
                key: prompt.key.clone(),
            }),
        }
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn start_progress(&mut self, total: usize) -> Box<dyn ProgressHandle> {
        self.progress.borrow_mut().total = total;
        Box::new(MockProgress {
            log: Rc::clone(&self.progress),
        })
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

struct MockProgress {
    log: Rc<RefCell<ProgressLog>>,
}

impl ProgressHandle for MockProgress {
    fn advance(&mut self, msg: &str) {
        self.log.borrow_mut().advanced.push(msg.to_string());
    }

    fn println(&mut self, line: &str) {
        self.log.borrow_mut().lines.push(line.to_string());
    }

    fn finish(&mut self, msg: &str) {
        self.log.borrow_mut().finished = Some(msg.to_string());
    }
}

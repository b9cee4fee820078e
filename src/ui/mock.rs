//! Mock UI for testing commands.
//!
//! # Example
//!
//! ```
//! use pipdesk::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.set_prompt_response("interpreter", "/usr/bin/python3");
//! ui.success("Selected Python 3.12.1");
//! assert!(ui.has_success("3.12.1"));
//! ```

use std::collections::HashMap;

use crate::error::{PipdeskError, Result};
use crate::process::OutputLine;

use super::prompts::parse_bool;
use super::{OutputMode, Prompt, PromptResult, PromptType, SpinnerHandle, Table, UserInterface};

/// Records everything shown and answers prompts from a map.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    interactive: bool,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    hints: Vec<String>,
    tables: Vec<Table>,
    pip_lines: Vec<String>,
    spinners: Vec<String>,
    prompt_responses: HashMap<String, String>,
    prompts_shown: Vec<String>,
}

impl MockUI {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer for prompts with `key`.
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

    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// pip lines in the order they were shown.
    pub fn pip_lines(&self) -> &[String] {
        &self.pip_lines
    }

    pub fn spinners(&self) -> &[String] {
        &self.spinners
    }

    pub fn prompts_shown(&self) -> &[String] {
        &self.prompts_shown
    }

    pub fn has_message(&self, msg: &str) -> bool {
        self.messages.iter().any(|m| m.contains(msg))
    }

    pub fn has_success(&self, msg: &str) -> bool {
        self.successes.iter().any(|m| m.contains(msg))
    }

    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(msg))
    }

    pub fn has_error(&self, msg: &str) -> bool {
        self.errors.iter().any(|m| m.contains(msg))
    }

    pub fn has_hint(&self, msg: &str) -> bool {
        self.hints.iter().any(|m| m.contains(msg))
    }

    /// Whether any table cell contains `text`.
    pub fn has_table_cell(&self, text: &str) -> bool {
        self.tables
            .iter()
            .flat_map(|t| t.rows())
            .flatten()
            .any(|cell| cell.contains(text))
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

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn show_hint(&mut self, hint: &str) {
        self.hints.push(hint.to_string());
    }

    fn show_table(&mut self, table: &Table) {
        self.tables.push(table.clone());
    }

    fn pip_line(&mut self, line: &OutputLine) {
        self.pip_lines.push(line.display_text());
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        self.prompts_shown.push(prompt.key.clone());

        let answer = self
            .prompt_responses
            .get(&prompt.key)
            .or(prompt.default.as_ref())
            .cloned()
            .ok_or_else(|| {
                PipdeskError::invalid_request(format!("no mock answer for '{}'", prompt.key))
            })?;

        Ok(match prompt.prompt_type {
            PromptType::Confirm => PromptResult::Bool(parse_bool(&answer)),
            PromptType::Select { .. } => PromptResult::String(answer),
        })
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        self.spinners.push(message.to_string());
        Box::new(MockSpinner::default())
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

/// Spinner that remembers how it finished.
#[derive(Debug, Default)]
pub struct MockSpinner {
    pub message: String,
    pub finished: Option<(bool, String)>,
}

impl SpinnerHandle for MockSpinner {
    fn set_message(&mut self, msg: &str) {
        self.message = msg.to_string();
    }

    fn finish_success(&mut self, msg: &str) {
        self.finished = Some((true, msg.to_string()));
    }

    fn finish_error(&mut self, msg: &str) {
        self.finished = Some((false, msg.to_string()));
    }
}

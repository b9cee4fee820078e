//! Terminal user interface for the CLI.
//!
//! This module provides:
//! - [`UserInterface`] trait so commands can be tested with [`MockUI`]
//! - [`TerminalUI`] for interactive terminals
//! - [`NonInteractiveUI`] for pipes and scripts
//! - Spinners, prompts, and tables
//!
//! # Example
//!
//! ```
//! use pipdesk::ui::{create_ui, OutputMode};
//!
//! let mut ui = create_ui(false, OutputMode::Quiet);
//! ui.success("Selected Python 3.12.1");
//! ```

pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod prompts;
pub mod spinner;
pub mod table;
pub mod terminal;
pub mod theme;

pub use mock::{MockSpinner, MockUI};
pub use non_interactive::NonInteractiveUI;
pub use output::OutputMode;
pub use prompts::prompt_user;
pub use spinner::{live_output, ProgressSpinner};
pub use table::Table;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, PipdeskTheme};

use indicatif::ProgressBar;

use crate::error::Result;
use crate::process::OutputLine;

/// Everything a command may show or ask.
pub trait UserInterface {
    fn output_mode(&self) -> OutputMode;

    fn message(&mut self, msg: &str);

    fn success(&mut self, msg: &str);

    fn warning(&mut self, msg: &str);

    /// Errors are shown in every mode.
    fn error(&mut self, msg: &str);

    fn show_header(&mut self, title: &str);

    /// A suggestion for what to do next.
    fn show_hint(&mut self, hint: &str);

    fn show_table(&mut self, table: &Table);

    /// One pip output line, shown only when the mode echoes pip output.
    fn pip_line(&mut self, line: &OutputLine);

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult>;

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle>;

    /// Whether prompts can be answered by a person.
    fn is_interactive(&self) -> bool;
}

/// Handle for a running spinner.
pub trait SpinnerHandle {
    fn set_message(&mut self, msg: &str);

    fn finish_success(&mut self, msg: &str);

    fn finish_error(&mut self, msg: &str);

    /// The underlying bar, for live output from another closure.
    fn progress_bar(&self) -> Option<ProgressBar> {
        None
    }
}

/// A question for the user.
#[derive(Debug, Clone)]
pub struct Prompt {
    /// Stable key; non-interactive runs read `PIPDESK_PROMPT_<KEY>`.
    pub key: String,
    pub question: String,
    pub prompt_type: PromptType,
    pub default: Option<String>,
}

#[derive(Debug, Clone)]
pub enum PromptType {
    Confirm,
    Select { options: Vec<PromptOption> },
}

/// One choice in a select prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptOption {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResult {
    Bool(bool),
    String(String),
}

impl PromptResult {
    pub fn as_string(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::String(s) => s.clone(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::String(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_result_conversions() {
        assert_eq!(PromptResult::Bool(true).as_string(), "true");
        assert_eq!(PromptResult::String("/usr/bin/python3".into()).as_string(), "/usr/bin/python3");
        assert_eq!(PromptResult::Bool(false).as_bool(), Some(false));
        assert_eq!(PromptResult::String("x".into()).as_bool(), None);
    }
}

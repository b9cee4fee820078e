//! UI for pipes, scripts and CI.

use std::collections::HashMap;

use crate::error::{PipdeskError, Result};
use crate::process::OutputLine;

use super::prompts::parse_bool;
use super::{
    OutputMode, Prompt, PromptResult, PromptType, SpinnerHandle, Table, UserInterface,
};

const PROMPT_ENV_PREFIX: &str = "PIPDESK_PROMPT_";

/// Plain-text UI that never waits for input.
///
/// Prompts are answered from `PIPDESK_PROMPT_<KEY>` variables, then from
/// the prompt's default; a prompt with neither is an error.
pub struct NonInteractiveUI {
    mode: OutputMode,
    answers: HashMap<String, String>,
}

impl NonInteractiveUI {
    pub fn new(mode: OutputMode) -> Self {
        let answers = std::env::vars()
            .filter(|(k, _)| k.starts_with(PROMPT_ENV_PREFIX))
            .collect();
        Self { mode, answers }
    }

    /// Use explicit answers instead of the environment.
    pub fn with_answers(mode: OutputMode, answers: HashMap<String, String>) -> Self {
        Self { mode, answers }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        println!("{}", msg);
    }

    fn success(&mut self, msg: &str) {
        println!("✓ {}", msg);
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("⚠ {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("{}", title);
        }
    }

    fn show_hint(&mut self, hint: &str) {
        if self.mode.shows_status() {
            eprintln!("  {}", hint);
        }
    }

    fn show_table(&mut self, table: &Table) {
        println!("{}", table.render());
    }

    fn pip_line(&mut self, line: &OutputLine) {
        if self.mode.shows_pip_output() {
            eprintln!("  {}", line.display_text());
        }
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        let env_key = format!("{}{}", PROMPT_ENV_PREFIX, prompt.key.to_uppercase());
        let answer = self
            .answers
            .get(&env_key)
            .or(prompt.default.as_ref())
            .ok_or_else(|| {
                PipdeskError::invalid_request(format!(
                    "cannot ask '{}' without a terminal; set {}",
                    prompt.question, env_key
                ))
            })?;

        match &prompt.prompt_type {
            PromptType::Confirm => Ok(PromptResult::Bool(parse_bool(answer))),
            PromptType::Select { options } => {
                if options.iter().any(|o| o.value == *answer) {
                    Ok(PromptResult::String(answer.clone()))
                } else {
                    Err(PipdeskError::invalid_request(format!(
                        "'{}' is not one of the choices for '{}'",
                        answer, prompt.key
                    )))
                }
            }
        }
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_status() {
            eprintln!("{}", message);
        }
        Box::new(PlainSpinner)
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

/// Spinner stand-in that prints only the outcome.
struct PlainSpinner;

impl SpinnerHandle for PlainSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        eprintln!("✓ {}", msg);
    }

    fn finish_error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::PromptOption;

    fn select(default: Option<&str>) -> Prompt {
        Prompt {
            key: "interpreter".into(),
            question: "Which Python?".into(),
            prompt_type: PromptType::Select {
                options: vec![
                    PromptOption {
                        label: "Python 3.12.1".into(),
                        value: "/usr/bin/python3".into(),
                    },
                    PromptOption {
                        label: "Python 3.11.4 (venv)".into(),
                        value: "/work/.venv/bin/python".into(),
                    },
                ],
            },
            default: default.map(str::to_string),
        }
    }

    #[test]
    fn answer_from_environment_map() {
        let mut answers = HashMap::new();
        answers.insert(
            "PIPDESK_PROMPT_INTERPRETER".to_string(),
            "/work/.venv/bin/python".to_string(),
        );
        let mut ui = NonInteractiveUI::with_answers(OutputMode::Normal, answers);
        let result = ui.prompt(&select(None)).unwrap();
        assert_eq!(result.as_string(), "/work/.venv/bin/python");
    }

    #[test]
    fn falls_back_to_default() {
        let mut ui = NonInteractiveUI::with_answers(OutputMode::Normal, HashMap::new());
        let result = ui.prompt(&select(Some("/usr/bin/python3"))).unwrap();
        assert_eq!(result.as_string(), "/usr/bin/python3");
    }

    #[test]
    fn no_answer_is_an_error() {
        let mut ui = NonInteractiveUI::with_answers(OutputMode::Normal, HashMap::new());
        let err = ui.prompt(&select(None)).unwrap_err();
        assert!(err.to_string().contains("PIPDESK_PROMPT_INTERPRETER"));
    }

    #[test]
    fn answer_must_be_a_choice() {
        let mut ui = NonInteractiveUI::with_answers(OutputMode::Normal, HashMap::new());
        let err = ui.prompt(&select(Some("/opt/python"))).unwrap_err();
        assert_eq!(err.kind(), "invalid_request");
    }

    #[test]
    fn confirm_parses_answer() {
        let mut ui = NonInteractiveUI::with_answers(OutputMode::Normal, HashMap::new());
        let prompt = Prompt {
            key: "proceed".into(),
            question: "Continue?".into(),
            prompt_type: PromptType::Confirm,
            default: Some("yes".into()),
        };
        assert_eq!(ui.prompt(&prompt).unwrap().as_bool(), Some(true));
    }
}

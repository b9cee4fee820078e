//! The `select` command.

use std::path::PathBuf;

use crate::cli::args::SelectArgs;
use crate::commands::{NullSink, Request, Response};
use crate::error::{PipdeskError, Result};
use crate::interpreter::Interpreter;
use crate::ui::{Prompt, PromptOption, PromptType, UserInterface};

use super::context::CommandContext;
use super::display::print_json;
use super::dispatcher::{Command, CommandResult};

/// Selects an interpreter by path or from a list, and remembers it.
pub struct SelectCommand<'a> {
    ctx: &'a CommandContext,
    args: SelectArgs,
}

impl<'a> SelectCommand<'a> {
    pub fn new(ctx: &'a CommandContext, args: SelectArgs) -> Self {
        Self { ctx, args }
    }

    /// Offer every discovered interpreter.
    fn choose(&self, ui: &mut dyn UserInterface) -> Result<PathBuf> {
        let mut spinner = ui.start_spinner("Looking for Python interpreters");
        let found = self.ctx.backend().discovery().discover();
        spinner.finish_success(&format!("Found {} interpreters", found.len()));

        if found.is_empty() {
            return Err(PipdeskError::invalid_request(
                "no interpreters found; pass a path to `pipdesk select`",
            ));
        }

        let current = self
            .ctx
            .backend()
            .selected()
            .current()
            .map(|i| i.path.to_string_lossy().to_string());

        let prompt = Prompt {
            key: "interpreter".to_string(),
            question: "Select a Python interpreter".to_string(),
            prompt_type: PromptType::Select {
                options: found.iter().map(option_for).collect(),
            },
            default: current,
        };
        let answer = ui.prompt(&prompt)?;
        Ok(PathBuf::from(answer.as_string()))
    }
}

fn option_for(interpreter: &Interpreter) -> PromptOption {
    PromptOption {
        label: interpreter.label(),
        value: interpreter.path.to_string_lossy().to_string(),
    }
}

impl Command for SelectCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if self.args.clear {
            self.ctx.forget()?;
            ui.success("Selection cleared");
            return Ok(CommandResult::success());
        }

        let path = match &self.args.path {
            Some(path) => path.clone(),
            None => self.choose(ui)?,
        };

        let response = self
            .ctx
            .handle(Request::SelectPython { path }, &mut NullSink)?;
        if let Response::Interpreter(interpreter) = &response {
            if let Err(e) = self.ctx.remember(interpreter) {
                ui.warning(&format!("Selection not saved: {}", e));
            }
            if !self.ctx.json() {
                ui.success(&format!("Selected {}", interpreter.label()));
            }
        }

        if self.ctx.json() {
            print_json(&response, ui)?;
        }
        Ok(CommandResult::success())
    }
}

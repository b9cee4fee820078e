//! Interactive terminal UI.

use console::Term;
use std::io::Write;

use crate::error::Result;
use crate::process::OutputLine;

use super::{
    prompt_user, should_use_colors, NonInteractiveUI, OutputMode, PipdeskTheme, ProgressSpinner,
    Prompt, PromptResult, SpinnerHandle, Table, UserInterface,
};

/// UI for a person at a terminal.
///
/// Results go to stdout; prompts, spinners, warnings and errors go to
/// stderr so piping stdout stays clean.
pub struct TerminalUI {
    out: Term,
    err: Term,
    theme: PipdeskTheme,
    mode: OutputMode,
}

impl TerminalUI {
    pub fn new(mode: OutputMode) -> Self {
        let theme = if should_use_colors() {
            PipdeskTheme::new()
        } else {
            PipdeskTheme::plain()
        };

        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            theme,
            mode,
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        writeln!(self.out, "{}", msg).ok();
    }

    fn success(&mut self, msg: &str) {
        writeln!(self.out, "{}", self.theme.format_success(msg)).ok();
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.err, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.err, "{}", self.theme.format_error(msg)).ok();
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "{}", self.theme.format_header(title)).ok();
        }
    }

    fn show_hint(&mut self, hint: &str) {
        if self.mode.shows_status() {
            writeln!(self.err, "  {}", self.theme.hint.apply_to(hint)).ok();
        }
    }

    fn show_table(&mut self, table: &Table) {
        let dim = self.theme.dim.clone();
        let rendered = table.render_with(|cell| dim.apply_to(cell).to_string());
        writeln!(self.out, "{}", rendered).ok();
    }

    fn pip_line(&mut self, line: &OutputLine) {
        if self.mode.shows_pip_output() {
            writeln!(
                self.err,
                "  {}",
                self.theme.log.apply_to(line.display_text())
            )
            .ok();
        }
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        prompt_user(prompt, &self.err)
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_spinners() {
            Box::new(ProgressSpinner::new(message, self.theme.clone()))
        } else {
            Box::new(ProgressSpinner::hidden())
        }
    }

    fn is_interactive(&self) -> bool {
        self.err.is_term()
    }
}

/// Terminal UI when stderr is a terminal and prompts are allowed, the plain
/// UI otherwise.
pub fn create_ui(interactive: bool, mode: OutputMode) -> Box<dyn UserInterface> {
    if interactive && Term::stderr().is_term() {
        Box::new(TerminalUI::new(mode))
    } else {
        Box::new(NonInteractiveUI::new(mode))
    }
}

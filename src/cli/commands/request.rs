//! Subcommands that map one-to-one onto a backend request.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crate::cli::interrupt;
use crate::commands::{NullSink, Request, Response};
use crate::error::{PipdeskError, Result};
use crate::process::OutputLine;
use crate::ui::{live_output, should_use_colors, PipdeskTheme, UserInterface};

use super::context::CommandContext;
use super::display::{action_progressive, print_json, show_response, DisplayOptions};
use super::dispatcher::{Command, CommandResult};

/// Exit code after Ctrl-C, as shells report SIGINT.
pub const EXIT_CANCELLED: i32 = 130;

const LIVE_LINES: usize = 3;

/// Sends one request and renders the response.
pub struct RequestCommand<'a> {
    ctx: &'a CommandContext,
    request: Request,
    options: DisplayOptions,
    interrupted: &'a AtomicBool,
}

impl<'a> RequestCommand<'a> {
    pub fn new(ctx: &'a CommandContext, request: Request) -> Self {
        Self {
            ctx,
            request,
            options: DisplayOptions::default(),
            interrupted: interrupt::flag(),
        }
    }

    /// Watch `flag` for Ctrl-C instead of the SIGINT handler's flag.
    #[cfg(test)]
    fn with_interrupt_flag(mut self, flag: &'a AtomicBool) -> Self {
        self.interrupted = flag;
        self
    }

    /// Limit the releases shown by `info`.
    pub fn with_release_limit(mut self, limit: usize) -> Self {
        self.options.release_limit = Some(limit);
        self
    }

    /// Spinner text for requests that may take a while.
    fn spinner_message(&self) -> Option<String> {
        let message = match &self.request {
            Request::DetectPythonInstallations => "Looking for Python interpreters".to_string(),
            Request::ListInstalledPackages { .. } => "Reading installed packages".to_string(),
            Request::SearchPypi { query } => format!("Searching for {}", query.trim()),
            Request::GetPackageInfo { package } => format!("Fetching {}", package),
            Request::ParseRequirements { .. } => "Checking project dependencies".to_string(),
            _ => return None,
        };
        Some(message)
    }

    fn run_query(&self, ui: &mut dyn UserInterface) -> Result<Response> {
        let spinner_message = if self.ctx.json() {
            None
        } else {
            self.spinner_message()
        };

        let Some(message) = spinner_message else {
            return self.ctx.handle(self.request.clone(), &mut NullSink);
        };

        let mut spinner = ui.start_spinner(&message);
        let result = self.ctx.handle(self.request.clone(), &mut NullSink);
        match &result {
            Ok(_) => spinner.finish_success(&message),
            Err(_) => spinner.finish_error(&message),
        }
        result
    }

    fn run_operation(&self, ui: &mut dyn UserInterface) -> Result<Response> {
        let (Some(action), Some(python)) = (self.request.pip_action(), self.request.python_path())
        else {
            return self.ctx.handle(self.request.clone(), &mut NullSink);
        };
        let python = python.to_path_buf();
        let message = format!("{} {}", action_progressive(action), package_of(&self.request));

        let mut spinner = ui.start_spinner(&message);
        let theme = if should_use_colors() {
            PipdeskTheme::new()
        } else {
            PipdeskTheme::plain()
        };
        let mut live = spinner
            .progress_bar()
            .map(|bar| live_output(bar, message.clone(), LIVE_LINES, theme));

        interrupt::install();
        let done = AtomicBool::new(false);
        let orchestrator = self.ctx.backend().orchestrator();

        let result = thread::scope(|s| {
            s.spawn(|| interrupt::watch(self.interrupted, &done, || orchestrator.cancel(&python)));

            let mut sink = |line: &OutputLine| {
                if let Some(live) = live.as_mut() {
                    live(line);
                }
                ui.pip_line(line);
            };
            let result = self.ctx.handle(self.request.clone(), &mut sink);
            done.store(true, Ordering::SeqCst);
            result
        });

        match &result {
            Ok(_) => spinner.finish_success(&message),
            Err(_) => spinner.finish_error(&message),
        }
        result
    }
}

fn package_of(request: &Request) -> String {
    match request {
        Request::InstallPackage {
            package,
            version: Some(version),
            ..
        }
        | Request::DowngradePackage {
            package, version, ..
        } => format!("{}=={}", package, version),
        Request::InstallPackage { package, .. }
        | Request::UninstallPackage { package, .. }
        | Request::UpgradePackage { package, .. } => package.clone(),
        _ => String::new(),
    }
}

impl Command for RequestCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let result = if self.request.pip_action().is_some() {
            self.run_operation(ui)
        } else {
            self.run_query(ui)
        };

        let response = match result {
            Ok(response) => response,
            Err(PipdeskError::OperationCancelled { action, package }) => {
                ui.warning(&format!("pip {} {} was cancelled", action, package));
                return Ok(CommandResult::failure(EXIT_CANCELLED));
            }
            Err(e) => return Err(e),
        };

        if self.ctx.json() {
            print_json(&response, ui)?;
        } else {
            show_response(&response, ui, self.options);
        }
        Ok(CommandResult::success())
    }
}

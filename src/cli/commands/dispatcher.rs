//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands};
use crate::commands::Request;
use crate::error::Result;
use crate::ui::UserInterface;

use super::completions::CompletionsCommand;
use super::context::CommandContext;
use super::request::RequestCommand;
use super::schema::SchemaCommand;
use super::select::SelectCommand;
use super::serve::ServeCommand;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug, PartialEq, Eq)]
pub struct CommandResult {
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Routes CLI subcommands to their implementations.
pub struct CommandDispatcher {
    ctx: CommandContext,
}

impl CommandDispatcher {
    pub fn new(ctx: CommandContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &CommandContext {
        &self.ctx
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let ctx = &self.ctx;
        let request = match &cli.command {
            Commands::Select(args) => return SelectCommand::new(ctx, args.clone()).execute(ui),
            Commands::Serve => return ServeCommand::new(ctx).execute(ui),
            Commands::Schema => return SchemaCommand.execute(ui),
            Commands::Completions(args) => {
                return CompletionsCommand::new(args.clone()).execute(ui)
            }
            Commands::Info(args) => {
                return RequestCommand::new(
                    ctx,
                    Request::GetPackageInfo {
                        package: args.package.clone(),
                    },
                )
                .with_release_limit(args.releases)
                .execute(ui)
            }

            Commands::Detect => Request::DetectPythonInstallations,
            Commands::Validate(args) => Request::ValidatePythonPath {
                path: args.path.clone(),
            },
            Commands::Current => Request::GetSelectedPython,
            Commands::Ls(args) => Request::ListDirectory {
                path: match &args.path {
                    Some(path) => path.clone(),
                    None => crate::browser::home_directory()?,
                },
            },
            Commands::Home => Request::GetHomeDirectory,
            Commands::Drives => Request::GetDrives,
            Commands::Packages(args) => Request::ListInstalledPackages {
                python_path: ctx.python(args.python.as_deref())?,
            },
            Commands::PipVersion(args) => Request::GetPipVersion {
                python_path: ctx.python(args.python.as_deref())?,
            },
            Commands::Search(args) => Request::SearchPypi {
                query: args.query.clone(),
            },
            Commands::Requirements(args) => Request::ParseRequirements {
                project_path: project_dir(args.project.as_deref())?,
                python_path: ctx.python(args.python.python.as_deref())?,
            },
            Commands::Venvs(args) => Request::DetectVenvs {
                project_path: project_dir(args.project.as_deref())?,
            },
            Commands::Files(args) => Request::DetectProjectFiles {
                project_path: project_dir(args.project.as_deref())?,
            },
            Commands::Install(args) => Request::InstallPackage {
                python_path: ctx.python(args.python.python.as_deref())?,
                package: args.package.clone(),
                version: args.version.clone(),
            },
            Commands::Uninstall(args) => Request::UninstallPackage {
                python_path: ctx.python(args.python.python.as_deref())?,
                package: args.package.clone(),
            },
            Commands::Upgrade(args) => Request::UpgradePackage {
                python_path: ctx.python(args.python.python.as_deref())?,
                package: args.package.clone(),
            },
            Commands::Downgrade(args) => Request::DowngradePackage {
                python_path: ctx.python(args.python.python.as_deref())?,
                package: args.package.clone(),
                version: args.version.clone(),
            },
        };

        RequestCommand::new(ctx, request).execute(ui)
    }
}

/// `project`, or the current directory.
fn project_dir(project: Option<&Path>) -> Result<PathBuf> {
    match project {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(std::env::current_dir()?),
    }
}

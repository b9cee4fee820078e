//! CLI argument definitions.
//!
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// pipdesk - find Python interpreters and manage their packages.
#[derive(Debug, Parser)]
#[command(name = "pipdesk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a config file (merged over the user config)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Echo every pip output line
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print results and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List Python interpreters found on this machine
    Detect,

    /// Check that a path is a working Python interpreter
    Validate(PathArgs),

    /// Choose the interpreter other commands use by default
    Select(SelectArgs),

    /// Show the selected interpreter
    Current,

    /// List a directory, showing only folders and interpreters
    Ls(LsArgs),

    /// Print the home directory
    Home,

    /// List filesystem roots
    Drives,

    /// List installed packages
    Packages(PythonArgs),

    /// Show pip's version
    PipVersion(PythonArgs),

    /// Look a package up on the index
    Search(SearchArgs),

    /// Show index metadata and releases for a package
    Info(InfoArgs),

    /// Compare a project's dependencies with what is installed
    Requirements(ProjectArgs),

    /// Find virtual environments in a project
    Venvs(ProjectDirArgs),

    /// List dependency files in a project
    Files(ProjectDirArgs),

    /// Install a package
    Install(InstallArgs),

    /// Uninstall a package
    Uninstall(PackageArgs),

    /// Upgrade a package to the latest version
    Upgrade(PackageArgs),

    /// Install an older version of a package
    Downgrade(DowngradeArgs),

    /// Answer JSON-lines requests on stdin
    Serve,

    /// Print the JSON schema of the request protocol
    Schema,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, clap::Args)]
pub struct PathArgs {
    /// Path to a Python executable
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, clap::Args)]
pub struct SelectArgs {
    /// Path to a Python executable; prompts when omitted
    pub path: Option<PathBuf>,

    /// Forget the saved selection instead
    #[arg(long, conflicts_with = "path")]
    pub clear: bool,
}

#[derive(Debug, Clone, Default, clap::Args)]
pub struct LsArgs {
    /// Directory to list (defaults to the home directory)
    pub path: Option<PathBuf>,
}

/// Interpreter override shared by package commands.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct PythonArgs {
    /// Interpreter to use instead of the selected one
    #[arg(long, value_name = "PATH")]
    pub python: Option<PathBuf>,
}

#[derive(Debug, Clone, clap::Args)]
pub struct SearchArgs {
    /// Package name to look up
    pub query: String,
}

#[derive(Debug, Clone, clap::Args)]
pub struct InfoArgs {
    /// Package name
    pub package: String,

    /// Number of releases to show
    #[arg(long, default_value_t = 10)]
    pub releases: usize,
}

#[derive(Debug, Clone, Default, clap::Args)]
pub struct ProjectArgs {
    /// Project directory (defaults to the current directory)
    pub project: Option<PathBuf>,

    #[command(flatten)]
    pub python: PythonArgs,
}

#[derive(Debug, Clone, Default, clap::Args)]
pub struct ProjectDirArgs {
    /// Project directory (defaults to the current directory)
    pub project: Option<PathBuf>,
}

#[derive(Debug, Clone, clap::Args)]
pub struct InstallArgs {
    /// Package to install, optionally with extras (`name[extra]`)
    pub package: String,

    /// Exact version to install
    #[arg(id = "package_version", value_name = "VERSION")]
    pub version: Option<String>,

    #[command(flatten)]
    pub python: PythonArgs,
}

#[derive(Debug, Clone, clap::Args)]
pub struct PackageArgs {
    pub package: String,

    #[command(flatten)]
    pub python: PythonArgs,
}

#[derive(Debug, Clone, clap::Args)]
pub struct DowngradeArgs {
    pub package: String,

    /// Version to install
    #[arg(id = "package_version", value_name = "VERSION")]
    pub version: String,

    #[command(flatten)]
    pub python: PythonArgs,
}

#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}

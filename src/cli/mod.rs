//! Command-line interface for pipdesk.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations
//! - [`interrupt`] - Ctrl-C handling while pip runs

pub mod args;
pub mod commands;
pub mod interrupt;

pub use args::{Cli, Commands};
pub use commands::{Command, CommandContext, CommandDispatcher, CommandResult};

//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait and is routed by
//! [`CommandDispatcher`]. Most subcommands map straight onto a backend
//! [`Request`](crate::commands::Request) and run through
//! [`RequestCommand`]; the rest own their flow.

pub mod completions;
pub mod context;
pub mod dispatcher;
pub mod display;
pub mod request;
pub mod schema;
pub mod select;
pub mod serve;

pub use context::CommandContext;
pub use dispatcher::{Command, CommandDispatcher, CommandResult};
pub use request::{RequestCommand, EXIT_CANCELLED};
pub use serve::serve;

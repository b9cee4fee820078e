//! Subprocess execution.
//!
//! - [`command`] - run a program to completion with captured output and an
//!   optional deadline
//! - [`stream`] - line pumps that forward child output over a channel as it
//!   is produced

pub mod command;
pub mod stream;

pub use command::{run_captured, CapturedOutput, ProcessError};
pub use stream::{pump_lines, OutputLine, StreamKind};

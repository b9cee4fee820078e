//! pipdesk - Python interpreter discovery, dependency reconciliation, and
//! pip orchestration.
//!
//! The library is the backend of a desktop package manager for Python. A
//! presentation client (the bundled CLI, or anything speaking the JSON
//! protocol of `pipdesk serve`) sends [`commands::Request`]s to a
//! [`commands::Backend`] and renders the [`commands::Response`]s.
//!
//! # Modules
//!
//! - [`browser`] - Directory listing filtered for interpreter hunting
//! - [`cli`] - Command-line interface and argument parsing
//! - [`commands`] - Request/response surface and the backend behind it
//! - [`config`] - Configuration loading
//! - [`error`] - Error types and result aliases
//! - [`index`] - Package index client
//! - [`interpreter`] - Discovery, validation, and selection of interpreters
//! - [`operations`] - Serialized pip install/uninstall/upgrade runs
//! - [`packages`] - Installed-package inventory and name checks
//! - [`process`] - Subprocess capture and line streaming
//! - [`project`] - Project manifests and dependency reconciliation
//! - [`state`] - The remembered interpreter selection
//! - [`ui`] - Prompts, spinners, and terminal output
//! - [`version`] - Package versions and version specifiers
//!
//! # Example
//!
//! ```
//! use pipdesk::version::{Version, VersionSpec};
//!
//! let spec: VersionSpec = ">=2.0,<3.0".parse().unwrap();
//! let installed: Version = "2.31.0".parse().unwrap();
//! assert!(spec.contains(&installed));
//! ```

pub mod browser;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod index;
pub mod interpreter;
pub mod operations;
pub mod packages;
pub mod process;
pub mod project;
pub mod state;
pub mod ui;
pub mod version;

pub use error::{PipdeskError, Result};

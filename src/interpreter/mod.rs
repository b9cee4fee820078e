//! Python interpreter discovery, validation, and selection.
//!
//! # Modules
//!
//! - [`probe`] - Search roots and candidate enumeration
//! - [`validation`] - Confirming a path behaves like a Python interpreter
//! - [`discovery`] - Scanning search roots for interpreters
//! - [`selection`] - The process-wide selected interpreter
//! - [`venv`] - Virtual environment layout detection
//!
//! # Example
//!
//! ```no_run
//! use pipdesk::interpreter::{Discovery, SelectedInterpreter};
//!
//! let found = Discovery::from_environment().discover();
//! let selected = SelectedInterpreter::default();
//! if let Some(first) = found.first() {
//!     selected.select(&first.path).unwrap();
//! }
//! assert!(selected.current().is_some() || found.is_empty());
//! ```

pub mod discovery;
pub mod probe;
pub mod selection;
pub mod validation;
pub mod venv;

pub use discovery::Discovery;
pub use probe::{is_executable, looks_like_python, SearchRoots};
pub use selection::SelectedInterpreter;
pub use validation::{validate, Validator, DEFAULT_VALIDATION_TIMEOUT};
pub use venv::{detect_venvs, VenvInfo};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A validated Python interpreter. Identity is the path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Interpreter {
    /// Absolute path of the executable.
    pub path: PathBuf,

    /// Version reported by `--version`, e.g. `3.11.4`.
    pub version: String,

    /// Whether the interpreter lives inside a virtual environment.
    pub is_venv: bool,

    /// Base installation the environment was created from (`home` in
    /// `pyvenv.cfg`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venv_base: Option<PathBuf>,
}

impl Interpreter {
    /// Short label for lists, e.g. `Python 3.11.4 (venv) /p/.venv/bin/python`.
    pub fn label(&self) -> String {
        let kind = if self.is_venv { " (venv)" } else { "" };
        format!("Python {}{} {}", self.version, kind, self.path.display())
    }
}

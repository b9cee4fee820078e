//! Confirming that a path is a working Python interpreter.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tracing::debug;

use super::probe::is_executable;
use super::venv::{venv_root_for, PyvenvCfg};
use super::Interpreter;
use crate::error::{PipdeskError, Result};
use crate::process::{run_captured, ProcessError};

/// Default bound on how long `--version` may take.
pub const DEFAULT_VALIDATION_TIMEOUT: Duration = Duration::from_secs(3);

static VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+\.\d+(?:\.\d+)*(?:(?:a|b|rc)\d+)?(?:\.?(?:post|dev)\d+)?\+?)")
        .expect("VERSION_REGEX must compile")
});

/// Extract a version from `--version` output, e.g. `Python 3.11.4` → `3.11.4`.
pub fn parse_version_output(output: &str) -> Option<String> {
    VERSION_REGEX
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end_matches('+').to_string())
}

/// Validates candidate interpreters.
///
/// Validation has no side effects beyond running `<path> --version`.
#[derive(Debug, Clone, Copy)]
pub struct Validator {
    timeout: Duration,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(DEFAULT_VALIDATION_TIMEOUT)
    }
}

impl Validator {
    /// Create a validator with the given `--version` timeout.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// The `--version` timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Validate `path` and describe the interpreter behind it.
    pub fn validate(&self, path: &Path) -> Result<Interpreter> {
        let invalid = |reason: String| PipdeskError::InvalidInterpreter {
            path: path.to_path_buf(),
            reason,
        };

        if !path.exists() {
            return Err(invalid("not found".to_string()));
        }
        if !path.is_file() {
            return Err(invalid("not a file".to_string()));
        }
        if !is_executable(path) {
            return Err(invalid("not executable".to_string()));
        }

        let path = absolute(path);
        let output = run_captured(&path, ["--version"], Some(self.timeout)).map_err(|e| {
            invalid(match e {
                ProcessError::Spawn(io) => format!("failed to start: {}", io),
                ProcessError::TimedOut(limit) => {
                    format!("timed out after {}ms", limit.as_millis())
                }
                ProcessError::Wait(io) => format!("failed to run: {}", io),
            })
        })?;

        // Python 2 printed its version on stderr, so both streams count.
        let version = parse_version_output(&output.combined()).ok_or_else(|| {
            debug!(
                "Unrecognised --version output from {}: {:?}",
                path.display(),
                output.combined().trim()
            );
            invalid("unrecognised --version output".to_string())
        })?;

        let venv_root = venv_root_for(&path);
        let venv_base = venv_root
            .as_deref()
            .and_then(PyvenvCfg::read)
            .and_then(|cfg| cfg.home().map(PathBuf::from));

        Ok(Interpreter {
            path,
            version,
            is_venv: venv_root.is_some(),
            venv_base,
        })
    }
}

/// Validate with the default timeout.
pub fn validate(path: &Path) -> Result<Interpreter> {
    Validator::default().validate(path)
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

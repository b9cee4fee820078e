//! Configuration schema for pipdesk.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::index::{DEFAULT_INDEX_TIMEOUT, DEFAULT_INDEX_URL};
use crate::interpreter::DEFAULT_VALIDATION_TIMEOUT;
use crate::operations::DEFAULT_TAIL_LINES;

/// Root configuration structure for `config.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipdeskConfig {
    /// Base URL of the package index JSON API.
    pub index_url: String,

    /// Timeout for one index request, in seconds.
    pub index_timeout_secs: u64,

    /// Timeout for `python --version` during validation, in milliseconds.
    pub validation_timeout_ms: u64,

    /// Extra directories scanned for interpreters.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_search_roots: Vec<PathBuf>,

    /// Extra folders whose subdirectories are virtual environments.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub venv_dirs: Vec<PathBuf>,

    /// Output lines kept in an operation report.
    pub log_tail_lines: usize,

    /// Remember the selected interpreter between runs.
    pub persist_selection: bool,
}

impl Default for PipdeskConfig {
    fn default() -> Self {
        Self {
            index_url: DEFAULT_INDEX_URL.to_string(),
            index_timeout_secs: DEFAULT_INDEX_TIMEOUT.as_secs(),
            validation_timeout_ms: DEFAULT_VALIDATION_TIMEOUT.as_millis() as u64,
            extra_search_roots: Vec::new(),
            venv_dirs: Vec::new(),
            log_tail_lines: DEFAULT_TAIL_LINES,
            persist_selection: true,
        }
    }
}

impl PipdeskConfig {
    /// Index request timeout.
    pub fn index_timeout(&self) -> Duration {
        Duration::from_secs(self.index_timeout_secs)
    }

    /// Interpreter validation timeout.
    pub fn validation_timeout(&self) -> Duration {
        Duration::from_millis(self.validation_timeout_ms)
    }

    /// Problems that make the configuration unusable.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.index_url.trim().is_empty() {
            problems.push("index_url must not be empty".to_string());
        }
        if self.index_timeout_secs == 0 {
            problems.push("index_timeout_secs must be greater than 0".to_string());
        }
        if self.validation_timeout_ms == 0 {
            problems.push("validation_timeout_ms must be greater than 0".to_string());
        }
        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_is_default() {
        let config: PipdeskConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, PipdeskConfig::default());
        assert_eq!(config.index_url, "https://pypi.org/pypi");
        assert_eq!(config.validation_timeout(), Duration::from_secs(3));
        assert_eq!(config.index_timeout(), Duration::from_secs(10));
        assert!(config.persist_selection);
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config: PipdeskConfig = serde_yaml::from_str(
            "index_url: https://mirror.example/pypi\nvenv_dirs:\n  - /srv/envs\n",
        )
        .unwrap();
        assert_eq!(config.index_url, "https://mirror.example/pypi");
        assert_eq!(config.venv_dirs, vec![PathBuf::from("/srv/envs")]);
        assert_eq!(config.log_tail_lines, DEFAULT_TAIL_LINES);
    }

    #[test]
    fn zero_timeouts_are_problems() {
        let config = PipdeskConfig {
            index_timeout_secs: 0,
            validation_timeout_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.problems().len(), 2);
        assert!(PipdeskConfig::default().problems().is_empty());
    }
}

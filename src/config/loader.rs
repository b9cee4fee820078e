//! Configuration file discovery and loading.

use crate::config::merger::merge_configs;
use crate::config::schema::PipdeskConfig;
use crate::error::{PipdeskError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the per-user configuration directory.
pub const APP_DIR: &str = "pipdesk";

/// Paths to configuration files in priority order (later overrides earlier).
///
/// Merge order:
/// 1. User config (`<config_dir>/pipdesk/config.yml`)
/// 2. Explicit `--config <path>`
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// User config, if it exists.
    pub user: Option<PathBuf>,

    /// Explicitly requested file. Must exist.
    pub explicit: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover config files, adding `explicit` on top.
    pub fn discover(explicit: Option<&Path>) -> Self {
        Self {
            user: user_config_path().filter(|p| p.exists()),
            explicit: explicit.map(Path::to_path_buf),
        }
    }

    /// Returns all config paths in merge order.
    pub fn all(&self) -> Vec<&PathBuf> {
        self.user.iter().chain(self.explicit.iter()).collect()
    }
}

/// `<config_dir>/pipdesk`, e.g. `~/.config/pipdesk` on Linux.
pub fn user_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR))
}

/// `<config_dir>/pipdesk/config.yml`.
pub fn user_config_path() -> Option<PathBuf> {
    user_config_dir().map(|d| d.join("config.yml"))
}

/// Load a config file as a raw YAML value (for merging).
///
/// An empty file is an empty mapping.
pub fn load_config_value(path: &Path) -> Result<serde_yaml::Value> {
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(serde_yaml::Value::Mapping(Default::default()));
    }
    serde_yaml::from_str(&content).map_err(|e| PipdeskError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Parse YAML content into a config.
pub fn parse_config(content: &str, source_path: &Path) -> Result<PipdeskConfig> {
    if content.trim().is_empty() {
        return Ok(PipdeskConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| PipdeskError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load and merge the given files, then check the result.
pub fn load_from_paths(paths: &ConfigPaths) -> Result<PipdeskConfig> {
    let all = paths.all();
    if all.is_empty() {
        debug!("No config files found, using defaults");
        return Ok(PipdeskConfig::default());
    }

    let mut values = Vec::with_capacity(all.len());
    for path in &all {
        debug!("Loading config from {}", path.display());
        values.push(load_config_value(path)?);
    }

    // Report problems against the most specific file.
    let blame = all[all.len() - 1].clone();
    let config: PipdeskConfig =
        serde_yaml::from_value(merge_configs(&values)).map_err(|e| {
            PipdeskError::ConfigParseError {
                path: blame.clone(),
                message: e.to_string(),
            }
        })?;

    let problems = config.problems();
    if !problems.is_empty() {
        return Err(PipdeskError::ConfigParseError {
            path: blame,
            message: problems.join("; "),
        });
    }

    Ok(config)
}

/// Load the user config merged with an optional explicit file.
pub fn load_config(explicit: Option<&Path>) -> Result<PipdeskConfig> {
    load_from_paths(&ConfigPaths::discover(explicit))
}

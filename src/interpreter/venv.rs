//! Virtual environment layout.
//!
//! A virtual environment is recognised by its `pyvenv.cfg`. The file is a
//! flat list of `key = value` lines; `home` names the base installation's
//! executable directory and `prompt` the display name chosen at creation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PipdeskError, Result};

/// Name of the marker file at an environment's root.
pub const PYVENV_CFG: &str = "pyvenv.cfg";

/// Directory names checked first when looking for environments in a project.
const CONVENTIONAL_NAMES: &[&str] = &[".venv", "venv", "env", ".env"];

/// A virtual environment found inside a project directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VenvInfo {
    /// Environment root.
    pub path: PathBuf,

    /// The environment's interpreter.
    pub python_path: PathBuf,

    /// `home` from `pyvenv.cfg`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<String>,

    /// `prompt` from `pyvenv.cfg`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

/// Parsed `pyvenv.cfg` contents, keys lower-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PyvenvCfg {
    values: HashMap<String, String>,
}

impl PyvenvCfg {
    /// Parse `key = value` lines. Lines without `=` are ignored.
    pub fn parse(content: &str) -> Self {
        let values = content
            .lines()
            .filter_map(|line| {
                let (key, value) = line.split_once('=')?;
                let key = key.trim();
                if key.is_empty() || key.starts_with('#') {
                    return None;
                }
                Some((key.to_ascii_lowercase(), value.trim().to_string()))
            })
            .collect();
        Self { values }
    }

    /// Read `pyvenv.cfg` from an environment root, if present and readable.
    pub fn read(env_root: &Path) -> Option<Self> {
        let path = env_root.join(PYVENV_CFG);
        match std::fs::read_to_string(&path) {
            Ok(content) => Some(Self::parse(&content)),
            Err(e) => {
                if path.exists() {
                    debug!("Could not read {}: {}", path.display(), e);
                }
                None
            }
        }
    }

    /// Look up a key (case-insensitive).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// The base installation directory.
    pub fn home(&self) -> Option<&str> {
        self.get("home")
    }

    /// The environment's prompt.
    pub fn prompt(&self) -> Option<&str> {
        self.get("prompt")
    }
}

/// Whether `dir` is the root of a virtual environment.
pub fn is_venv_dir(dir: &Path) -> bool {
    dir.join(PYVENV_CFG).is_file()
}

/// The environment root an interpreter belongs to, if any.
///
/// Checks for `pyvenv.cfg` in the interpreter's directory and its parent,
/// then for an `activate` script beside the interpreter.
pub fn venv_root_for(python: &Path) -> Option<PathBuf> {
    let dir = python.parent()?;
    if is_venv_dir(dir) {
        return Some(dir.to_path_buf());
    }
    if let Some(parent) = dir.parent() {
        if is_venv_dir(parent) {
            return Some(parent.to_path_buf());
        }
    }
    if dir.join("activate").is_file() {
        return Some(dir.parent().unwrap_or(dir).to_path_buf());
    }
    None
}

/// Directories inside an environment root that hold its executables.
#[cfg(not(windows))]
pub fn executable_dirs(env_root: &Path) -> Vec<PathBuf> {
    vec![env_root.join("bin")]
}

/// Directories inside an environment root that hold its executables.
///
/// Conda environments keep `python.exe` at the root.
#[cfg(windows)]
pub fn executable_dirs(env_root: &Path) -> Vec<PathBuf> {
    vec![env_root.join("Scripts"), env_root.to_path_buf()]
}

/// The interpreter of an environment root, if one exists.
pub fn python_in(env_root: &Path) -> Option<PathBuf> {
    let names: &[&str] = if cfg!(windows) {
        &["python.exe"]
    } else {
        &["python", "python3"]
    };
    executable_dirs(env_root)
        .into_iter()
        .flat_map(|dir| names.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.is_file())
}

/// Find virtual environments directly inside a project directory.
///
/// Conventional names (`.venv`, `venv`, `env`, `.env`) come first, then any
/// other subdirectory with a `pyvenv.cfg`, sorted by name. Directories
/// without an interpreter are skipped.
pub fn detect_venvs(project: &Path) -> Result<Vec<VenvInfo>> {
    if !project.is_dir() {
        return Err(PipdeskError::PathUnreadable {
            path: project.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }

    let mut roots: Vec<PathBuf> = CONVENTIONAL_NAMES
        .iter()
        .map(|name| project.join(name))
        .filter(|p| p.is_dir())
        .collect();

    let mut others: Vec<PathBuf> = std::fs::read_dir(project)
        .map_err(|e| PipdeskError::PathUnreadable {
            path: project.to_path_buf(),
            message: e.to_string(),
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.is_dir() && is_venv_dir(p) && !roots.contains(p))
        .collect();
    others.sort();
    roots.extend(others);

    let found = roots
        .into_iter()
        .filter_map(|root| {
            let python_path = python_in(&root)?;
            let cfg = PyvenvCfg::read(&root).unwrap_or_default();
            Some(VenvInfo {
                home: cfg.home().map(str::to_string),
                prompt: cfg.prompt().map(str::to_string),
                path: root,
                python_path,
            })
        })
        .collect();

    Ok(found)
}

//! Persistence of the last selected interpreter.
//!
//! The file only records what was chosen. Restoring always re-validates
//! through [`SelectedInterpreter::restore`](crate::interpreter::SelectedInterpreter::restore).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::user_config_dir;
use crate::error::{PipdeskError, Result};
use crate::interpreter::Interpreter;

/// Contents of `selection.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSelection {
    /// Schema version for migration.
    pub version: u32,

    /// The interpreter as it was when selected.
    pub interpreter: Interpreter,

    /// When the selection was made.
    pub selected_at: DateTime<Utc>,
}

/// Reads and writes the saved selection file.
#[derive(Debug, Clone)]
pub struct SelectionStore {
    path: PathBuf,
}

impl SelectionStore {
    /// Current schema version.
    pub const CURRENT_VERSION: u32 = 1;

    /// Store backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the user config directory, if there is one.
    pub fn user_default() -> Option<Self> {
        user_config_dir().map(|dir| Self::new(dir.join("selection.json")))
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved selection. A missing file is `None`.
    pub fn load(&self) -> Result<Option<SavedSelection>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        let saved = serde_json::from_str(&content).map_err(|e| PipdeskError::ConfigParseError {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        Ok(Some(saved))
    }

    /// Save `interpreter` as the selection using an atomic write.
    pub fn save(&self, interpreter: &Interpreter) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        let saved = SavedSelection {
            version: Self::CURRENT_VERSION,
            interpreter: interpreter.clone(),
            selected_at: Utc::now(),
        };
        let content = serde_json::to_string_pretty(&saved)
            .map_err(|e| anyhow::anyhow!("Failed to serialize selection: {}", e))?;

        // Write to temp file, then rename
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, &self.path)?;

        Ok(())
    }

    /// Forget the saved selection.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

//! Filesystem browsing for manual interpreter selection.
//!
//! Listings only contain directories and files that look like an
//! interpreter. Each entry carries enough annotation for a picker to
//! highlight environments and executables without a second round trip.

use std::path::{Path, PathBuf};

use anyhow::anyhow;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PipdeskError, Result};
use crate::interpreter::probe::{is_executable, looks_like_python};
use crate::interpreter::venv::is_venv_dir;

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    /// Directory containing a `pyvenv.cfg`.
    pub is_venv: bool,
    /// File with an interpreter name and the executable bit.
    pub is_python: bool,
}

/// List `path`, directories first, then by name.
pub fn list_directory(path: &Path) -> Result<Vec<DirectoryEntry>> {
    let unreadable = |message: String| PipdeskError::PathUnreadable {
        path: path.to_path_buf(),
        message,
    };

    if !path.is_dir() {
        return Err(unreadable("not a directory".to_string()));
    }

    let read_dir = std::fs::read_dir(path).map_err(|e| unreadable(e.to_string()))?;

    let mut entries = Vec::new();
    for entry in read_dir.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_hidden(&name) {
            continue;
        }

        let entry_path = entry.path();
        // Follows symlinks so a linked directory browses like a directory.
        let Ok(metadata) = std::fs::metadata(&entry_path) else {
            debug!("Skipping {}: metadata unavailable", entry_path.display());
            continue;
        };

        let is_dir = metadata.is_dir();
        let is_python = !is_dir && looks_like_python(&name) && is_executable(&entry_path);
        if !is_dir && !is_python {
            continue;
        }

        entries.push(DirectoryEntry {
            is_venv: is_dir && is_venv_dir(&entry_path),
            name,
            path: entry_path,
            is_dir,
            is_python,
        });
    }

    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
    Ok(entries)
}

#[cfg(unix)]
fn is_hidden(name: &str) -> bool {
    name.starts_with('.') && name != ".venv"
}

#[cfg(not(unix))]
fn is_hidden(_name: &str) -> bool {
    false
}

/// The directory above `path`. The filesystem root has none.
pub fn parent(path: &Path) -> Option<PathBuf> {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

/// The current user's home directory.
pub fn home_directory() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| anyhow!("cannot determine home directory").into())
}

/// Roots a browser can start from: `/` on Unix, mounted drive letters on
/// Windows.
pub fn drives() -> Vec<PathBuf> {
    if cfg!(windows) {
        (b'A'..=b'Z')
            .map(|letter| PathBuf::from(format!("{}:\\", letter as char)))
            .filter(|drive| drive.exists())
            .collect()
    } else {
        vec![PathBuf::from("/")]
    }
}

/// A browsing session with a current location.
///
/// The location only moves when the new directory was listed successfully.
#[derive(Debug, Clone)]
pub struct Browser {
    location: PathBuf,
}

impl Browser {
    /// Start at `location` without listing it.
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
        }
    }

    /// Current location.
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// List the current location again.
    pub fn refresh(&self) -> Result<Vec<DirectoryEntry>> {
        list_directory(&self.location)
    }

    /// List `path` and move there on success.
    pub fn open(&mut self, path: &Path) -> Result<Vec<DirectoryEntry>> {
        let entries = list_directory(path)?;
        self.location = path.to_path_buf();
        Ok(entries)
    }

    /// Move to the parent directory. At the root this re-lists the root.
    pub fn up(&mut self) -> Result<Vec<DirectoryEntry>> {
        match parent(&self.location) {
            Some(parent) => self.open(&parent),
            None => self.refresh(),
        }
    }
}

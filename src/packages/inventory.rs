//! Reading the installed-package list from an interpreter.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::names::normalize_name;
use crate::error::{PipdeskError, Result};
use crate::process::run_captured;

/// Bound on `pip --version`; listing itself is unbounded.
const PIP_VERSION_TIMEOUT: Duration = Duration::from_secs(15);

/// A package installed for some interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct InstalledPackage {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// Installed packages keyed by normalized name, in listing order.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    packages: Vec<InstalledPackage>,
    by_name: HashMap<String, usize>,
}

impl Inventory {
    /// Build from packages; later duplicates of a normalized name are dropped.
    pub fn from_packages(packages: impl IntoIterator<Item = InstalledPackage>) -> Self {
        let mut inventory = Self::default();
        for package in packages {
            let key = normalize_name(&package.name);
            if inventory.by_name.contains_key(&key) {
                debug!("Ignoring duplicate package entry {}", package.name);
                continue;
            }
            inventory.by_name.insert(key, inventory.packages.len());
            inventory.packages.push(package);
        }
        inventory
    }

    /// Look up a package by any spelling of its name.
    pub fn get(&self, name: &str) -> Option<&InstalledPackage> {
        self.by_name
            .get(&normalize_name(name))
            .map(|&i| &self.packages[i])
    }

    /// Number of packages.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether nothing is installed.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Iterate in listing order.
    pub fn iter(&self) -> impl Iterator<Item = &InstalledPackage> {
        self.packages.iter()
    }

    /// Consume into the package list.
    pub fn into_packages(self) -> Vec<InstalledPackage> {
        self.packages
    }
}

/// Parse `pip list --format=json` output.
///
/// Entries without a string `name` and `version` are skipped.
pub fn parse_pip_list(python: &Path, json: &str) -> Result<Inventory> {
    let unavailable = |message: String| PipdeskError::InventoryUnavailable {
        python: python.to_path_buf(),
        message,
    };

    let value: serde_json::Value = serde_json::from_str(json.trim())
        .map_err(|e| unavailable(format!("unparsable pip output: {}", e)))?;
    let entries = value
        .as_array()
        .ok_or_else(|| unavailable("pip output is not a JSON array".to_string()))?;

    let packages = entries.iter().filter_map(|entry| {
        let name = entry.get("name").and_then(|v| v.as_str());
        let version = entry.get("version").and_then(|v| v.as_str());
        match (name, version) {
            (Some(name), Some(version)) => Some(InstalledPackage {
                name: name.to_string(),
                version: version.to_string(),
                summary: entry
                    .get("summary")
                    .and_then(|v| v.as_str())
                    .map(str::to_string),
            }),
            _ => {
                debug!("Skipping malformed pip list entry: {}", entry);
                None
            }
        }
    });

    Ok(Inventory::from_packages(packages))
}

/// Run `<python> -m pip list --format=json` and parse the result.
///
/// Nothing is cached; every call runs pip.
pub fn read_inventory(python: &Path) -> Result<Inventory> {
    let output = run_captured(
        python,
        ["-m", "pip", "list", "--format=json", "--disable-pip-version-check"],
        None,
    )
    .map_err(|e| PipdeskError::InventoryUnavailable {
        python: python.to_path_buf(),
        message: e.to_string(),
    })?;

    if !output.success() {
        let stderr = output.stderr.trim();
        return Err(PipdeskError::InventoryUnavailable {
            python: python.to_path_buf(),
            message: if stderr.is_empty() {
                format!("pip list exited with {}", output.status)
            } else {
                stderr.to_string()
            },
        });
    }

    let inventory = parse_pip_list(python, &output.stdout)?;
    info!(
        "Read {} installed packages for {}",
        inventory.len(),
        python.display()
    );
    Ok(inventory)
}

/// Installed packages in listing order.
pub fn list_installed(python: &Path) -> Result<Vec<InstalledPackage>> {
    read_inventory(python).map(Inventory::into_packages)
}

/// The `pip --version` line, e.g. `pip 24.0 from ... (python 3.12)`.
pub fn pip_version(python: &Path) -> Result<String> {
    let unavailable = |message: String| PipdeskError::InventoryUnavailable {
        python: python.to_path_buf(),
        message,
    };

    let output = run_captured(
        python,
        ["-m", "pip", "--version"],
        Some(PIP_VERSION_TIMEOUT),
    )
    .map_err(|e| unavailable(e.to_string()))?;

    let line = output.stdout.trim();
    if !output.success() || line.is_empty() {
        return Err(unavailable(format!(
            "pip is not available: {}",
            output.stderr.trim()
        )));
    }
    Ok(line.to_string())
}

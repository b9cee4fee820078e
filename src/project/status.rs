//! Dependency status types.
//!
//! Each declared dependency is classified against the installed packages of
//! one interpreter. Statuses are always derived from a fresh inventory and
//! never stored.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// How a declared dependency relates to what is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DependencyStatus {
    /// Installed, and the version satisfies the declaration.
    Installed,

    /// Not installed at all.
    Missing,

    /// Installed, but the version does not satisfy the declaration (or one
    /// of the two could not be parsed).
    VersionMismatch,
}

impl DependencyStatus {
    /// Whether nothing needs to change for this dependency.
    pub fn is_satisfied(&self) -> bool {
        matches!(self, DependencyStatus::Installed)
    }

    /// Short label for tables.
    pub fn label(&self) -> &'static str {
        match self {
            DependencyStatus::Installed => "installed",
            DependencyStatus::Missing => "missing",
            DependencyStatus::VersionMismatch => "mismatch",
        }
    }
}

/// A declared dependency with its computed status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReconciledDependency {
    pub name: String,
    pub version_spec: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed_version: Option<String>,
    pub status: DependencyStatus,
}

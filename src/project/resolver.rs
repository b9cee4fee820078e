//! Reconciling declared dependencies with an inventory.

use std::path::Path;

use tracing::debug;

use super::manifest::{read_project_dependencies, DependencySpec};
use super::status::{DependencyStatus, ReconciledDependency};
use crate::error::Result;
use crate::packages::{read_inventory, Inventory};
use crate::version::{Version, VersionSpec};

/// Classify an installed version (if any) against a specifier string.
///
/// An empty specifier or `*` accepts any installed version. A specifier or
/// installed version that does not parse counts as a mismatch.
pub fn classify(version_spec: &str, installed: Option<&str>) -> DependencyStatus {
    let Some(installed) = installed else {
        return DependencyStatus::Missing;
    };

    let spec = match VersionSpec::parse(version_spec) {
        Ok(spec) => spec,
        Err(e) => {
            debug!("{}", e);
            return DependencyStatus::VersionMismatch;
        }
    };
    if spec.is_any() {
        return DependencyStatus::Installed;
    }

    match Version::parse(installed) {
        Ok(version) if spec.contains(&version) => DependencyStatus::Installed,
        Ok(_) => DependencyStatus::VersionMismatch,
        Err(e) => {
            debug!("{}", e);
            DependencyStatus::VersionMismatch
        }
    }
}

/// Reconcile `specs` against `inventory`, preserving input order.
pub fn resolve(specs: &[DependencySpec], inventory: &Inventory) -> Vec<ReconciledDependency> {
    specs
        .iter()
        .map(|spec| {
            let installed_version = inventory.get(&spec.name).map(|p| p.version.clone());
            ReconciledDependency {
                status: classify(&spec.version_spec, installed_version.as_deref()),
                name: spec.name.clone(),
                version_spec: spec.version_spec.clone(),
                source: spec.source.clone(),
                installed_version,
            }
        })
        .collect()
}

/// Read the project's manifests and a fresh inventory of `python`, then
/// reconcile.
pub fn reconcile_project(project: &Path, python: &Path) -> Result<Vec<ReconciledDependency>> {
    let specs = read_project_dependencies(project)?;
    let inventory = read_inventory(python)?;
    Ok(resolve(&specs, &inventory))
}

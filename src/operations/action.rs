//! Package actions and the pip arguments they translate to.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{PipdeskError, Result};
use crate::packages::{check_package_name, check_version};

/// A mutating pip action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PipAction {
    Install,
    Uninstall,
    Upgrade,
    Downgrade,
}

impl PipAction {
    /// Lowercase name, e.g. `install`.
    pub fn as_str(&self) -> &'static str {
        match self {
            PipAction::Install => "install",
            PipAction::Uninstall => "uninstall",
            PipAction::Upgrade => "upgrade",
            PipAction::Downgrade => "downgrade",
        }
    }
}

impl fmt::Display for PipAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated action against one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipRequest {
    action: PipAction,
    package: String,
    version: Option<String>,
}

impl PipRequest {
    /// Validate the package name and version for `action`.
    ///
    /// `install` takes an optional version, `downgrade` requires one, and
    /// `uninstall`/`upgrade` take none.
    pub fn new(action: PipAction, package: &str, version: Option<&str>) -> Result<Self> {
        let package = check_package_name(package)?.to_string();
        let version = version
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(check_version)
            .transpose()?
            .map(str::to_string);

        match (action, &version) {
            (PipAction::Downgrade, None) => {
                return Err(PipdeskError::invalid_request(
                    "downgrade requires a target version",
                ))
            }
            (PipAction::Uninstall | PipAction::Upgrade, Some(_)) => {
                return Err(PipdeskError::invalid_request(format!(
                    "{} does not take a version",
                    action
                )))
            }
            _ => {}
        }

        Ok(Self {
            action,
            package,
            version,
        })
    }

    pub fn action(&self) -> PipAction {
        self.action
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// `pkg` or `pkg==version`.
    pub fn target(&self) -> String {
        match &self.version {
            Some(version) => format!("{}=={}", self.package, version),
            None => self.package.clone(),
        }
    }

    /// Arguments passed to the interpreter.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["-m".to_string(), "pip".to_string()];
        match self.action {
            PipAction::Install | PipAction::Downgrade => {
                args.push("install".to_string());
                args.push(self.target());
            }
            PipAction::Uninstall => {
                args.extend(["uninstall".to_string(), "-y".to_string()]);
                args.push(self.package.clone());
            }
            PipAction::Upgrade => {
                args.extend(["install".to_string(), "--upgrade".to_string()]);
                args.push(self.package.clone());
            }
        }
        args
    }
}

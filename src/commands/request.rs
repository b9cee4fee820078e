//! Request and response payloads of the command surface.
//!
//! On the wire a request is `{"command": "<name>", "args": {...}}` and a
//! response is `{"type": "<kind>", "data": ...}`. Commands without
//! arguments may omit `args`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::browser::DirectoryEntry;
use crate::error::PipdeskError;
use crate::index::{IndexPackage, PackageDetails};
use crate::interpreter::{Interpreter, VenvInfo};
use crate::operations::{OperationReport, OperationState, PipAction};
use crate::packages::InstalledPackage;
use crate::project::ReconciledDependency;

/// A command sent by a presentation client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "command", content = "args", rename_all = "snake_case")]
pub enum Request {
    /// The currently selected interpreter, if any.
    GetSelectedPython,

    /// Scan the machine for interpreters.
    DetectPythonInstallations,

    /// The user's home directory.
    GetHomeDirectory,

    /// Filesystem roots to start browsing from.
    GetDrives,

    /// Browse one directory.
    ListDirectory { path: PathBuf },

    /// Check a path without selecting it.
    ValidatePythonPath { path: PathBuf },

    /// Validate and select an interpreter.
    SelectPython { path: PathBuf },

    /// Packages installed for an interpreter.
    ListInstalledPackages { python_path: PathBuf },

    /// `pip --version` for an interpreter.
    GetPipVersion { python_path: PathBuf },

    /// Look a name up on the package index.
    SearchPypi { query: String },

    /// Full index metadata for one package.
    GetPackageInfo { package: String },

    /// Reconcile a project's declared dependencies with an interpreter.
    ParseRequirements {
        project_path: PathBuf,
        python_path: PathBuf,
    },

    /// Virtual environments inside a project.
    DetectVenvs { project_path: PathBuf },

    /// Dependency manifests present in a project.
    DetectProjectFiles { project_path: PathBuf },

    InstallPackage {
        python_path: PathBuf,
        package: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version: Option<String>,
    },

    UninstallPackage {
        python_path: PathBuf,
        package: String,
    },

    UpgradePackage {
        python_path: PathBuf,
        package: String,
    },

    DowngradePackage {
        python_path: PathBuf,
        package: String,
        version: String,
    },

    /// Whether an operation is running for an interpreter.
    GetOperationState { python_path: PathBuf },

    /// Ask the running operation for an interpreter to stop.
    CancelOperation { python_path: PathBuf },
}

impl Request {
    /// The wire name of the command.
    pub fn name(&self) -> &'static str {
        match self {
            Request::GetSelectedPython => "get_selected_python",
            Request::DetectPythonInstallations => "detect_python_installations",
            Request::GetHomeDirectory => "get_home_directory",
            Request::GetDrives => "get_drives",
            Request::ListDirectory { .. } => "list_directory",
            Request::ValidatePythonPath { .. } => "validate_python_path",
            Request::SelectPython { .. } => "select_python",
            Request::ListInstalledPackages { .. } => "list_installed_packages",
            Request::GetPipVersion { .. } => "get_pip_version",
            Request::SearchPypi { .. } => "search_pypi",
            Request::GetPackageInfo { .. } => "get_package_info",
            Request::ParseRequirements { .. } => "parse_requirements",
            Request::DetectVenvs { .. } => "detect_venvs",
            Request::DetectProjectFiles { .. } => "detect_project_files",
            Request::InstallPackage { .. } => "install_package",
            Request::UninstallPackage { .. } => "uninstall_package",
            Request::UpgradePackage { .. } => "upgrade_package",
            Request::DowngradePackage { .. } => "downgrade_package",
            Request::GetOperationState { .. } => "get_operation_state",
            Request::CancelOperation { .. } => "cancel_operation",
        }
    }

    /// The interpreter a mutating request runs against.
    pub fn python_path(&self) -> Option<&Path> {
        match self {
            Request::InstallPackage { python_path, .. }
            | Request::UninstallPackage { python_path, .. }
            | Request::UpgradePackage { python_path, .. }
            | Request::DowngradePackage { python_path, .. } => Some(python_path.as_path()),
            _ => None,
        }
    }

    /// The pip action this request runs, for mutating requests.
    pub fn pip_action(&self) -> Option<PipAction> {
        match self {
            Request::InstallPackage { .. } => Some(PipAction::Install),
            Request::UninstallPackage { .. } => Some(PipAction::Uninstall),
            Request::UpgradePackage { .. } => Some(PipAction::Upgrade),
            Request::DowngradePackage { .. } => Some(PipAction::Downgrade),
            _ => None,
        }
    }
}

/// Result of a successfully handled [`Request`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Response {
    Selected(Option<Interpreter>),
    Interpreters(Vec<Interpreter>),
    Interpreter(Interpreter),
    Path(PathBuf),
    Paths(Vec<PathBuf>),
    Entries(Vec<DirectoryEntry>),
    Packages(Vec<InstalledPackage>),
    PipVersion(String),
    SearchResults(Vec<IndexPackage>),
    PackageInfo(PackageDetails),
    Dependencies(Vec<ReconciledDependency>),
    Venvs(Vec<VenvInfo>),
    ProjectFiles(Vec<String>),
    Operation(OperationReport),
    OperationState(OperationState),
    /// Whether a running operation was found to cancel.
    CancelRequested(bool),
}

/// Error half of the protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ErrorPayload {
    /// Stable tag, see [`PipdeskError::kind`].
    pub kind: String,
    pub message: String,
}

impl From<&PipdeskError> for ErrorPayload {
    fn from(err: &PipdeskError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<PipdeskError> for ErrorPayload {
    fn from(err: PipdeskError) -> Self {
        Self::from(&err)
    }
}

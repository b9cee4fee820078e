//! Dispatching requests to the library.

use std::path::Path;

use tracing::debug;

use super::{Request, Response};
use crate::browser;
use crate::config::PipdeskConfig;
use crate::error::{PipdeskError, Result};
use crate::index::IndexClient;
use crate::interpreter::{self, Discovery, SearchRoots, SelectedInterpreter, Validator};
use crate::operations::{Orchestrator, PipAction, PipRequest};
use crate::packages;
use crate::process::OutputLine;
use crate::project;

/// Receives `pip-log` lines while a mutating request runs.
pub trait LogSink {
    fn pip_log(&mut self, line: &OutputLine);
}

impl<F> LogSink for F
where
    F: FnMut(&OutputLine),
{
    fn pip_log(&mut self, line: &OutputLine) {
        self(line)
    }
}

/// Discards every line.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn pip_log(&mut self, _line: &OutputLine) {}
}

/// Owns the long-lived state behind the command surface.
///
/// `Backend` is `Sync`; one instance can serve requests from several
/// threads. Operations against the same interpreter are still serialized by
/// the orchestrator.
#[derive(Debug)]
pub struct Backend {
    config: PipdeskConfig,
    validator: Validator,
    selected: SelectedInterpreter,
    orchestrator: Orchestrator,
    index: IndexClient,
}

impl Backend {
    /// Build a backend from loaded configuration.
    pub fn new(config: PipdeskConfig) -> Result<Self> {
        let validator = Validator::new(config.validation_timeout());
        let index = IndexClient::new(&config.index_url, config.index_timeout())?;
        Ok(Self {
            selected: SelectedInterpreter::new(validator),
            orchestrator: Orchestrator::new(config.log_tail_lines),
            validator,
            index,
            config,
        })
    }

    pub fn config(&self) -> &PipdeskConfig {
        &self.config
    }

    pub fn selected(&self) -> &SelectedInterpreter {
        &self.selected
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn index(&self) -> &IndexClient {
        &self.index
    }

    /// Discovery over the standard roots plus configured extras.
    pub fn discovery(&self) -> Discovery {
        Discovery::new(
            SearchRoots::from_env(&self.config.extra_search_roots, &self.config.venv_dirs),
            self.validator,
        )
    }

    /// Handle one request. Log lines of mutating requests go to `sink`
    /// before this returns.
    pub fn handle(&self, request: Request, sink: &mut dyn LogSink) -> Result<Response> {
        debug!("Handling {}", request.name());

        match request {
            Request::GetSelectedPython => Ok(Response::Selected(self.selected.current())),
            Request::DetectPythonInstallations => {
                Ok(Response::Interpreters(self.discovery().discover()))
            }
            Request::GetHomeDirectory => browser::home_directory().map(Response::Path),
            Request::GetDrives => Ok(Response::Paths(browser::drives())),
            Request::ListDirectory { path } => {
                browser::list_directory(required_path("path", &path)?).map(Response::Entries)
            }
            Request::ValidatePythonPath { path } => self
                .validator
                .validate(required_path("path", &path)?)
                .map(Response::Interpreter),
            Request::SelectPython { path } => self
                .selected
                .select(required_path("path", &path)?)
                .map(Response::Interpreter),
            Request::ListInstalledPackages { python_path } => {
                packages::list_installed(required_path("python_path", &python_path)?)
                    .map(Response::Packages)
            }
            Request::GetPipVersion { python_path } => {
                packages::pip_version(required_path("python_path", &python_path)?)
                    .map(Response::PipVersion)
            }
            Request::SearchPypi { query } => self.index.search(&query).map(Response::SearchResults),
            Request::GetPackageInfo { package } => {
                let package = packages::check_package_name(&package)?;
                self.index.package_details(package).map(Response::PackageInfo)
            }
            Request::ParseRequirements {
                project_path,
                python_path,
            } => project::reconcile_project(
                required_path("project_path", &project_path)?,
                required_path("python_path", &python_path)?,
            )
            .map(Response::Dependencies),
            Request::DetectVenvs { project_path } => {
                interpreter::detect_venvs(required_path("project_path", &project_path)?)
                    .map(Response::Venvs)
            }
            Request::DetectProjectFiles { project_path } => {
                project::detect_project_files(required_path("project_path", &project_path)?)
                    .map(Response::ProjectFiles)
            }
            Request::InstallPackage {
                python_path,
                package,
                version,
            } => self.run_pip(
                &python_path,
                PipAction::Install,
                &package,
                version.as_deref(),
                sink,
            ),
            Request::UninstallPackage {
                python_path,
                package,
            } => self.run_pip(&python_path, PipAction::Uninstall, &package, None, sink),
            Request::UpgradePackage {
                python_path,
                package,
            } => self.run_pip(&python_path, PipAction::Upgrade, &package, None, sink),
            Request::DowngradePackage {
                python_path,
                package,
                version,
            } => self.run_pip(
                &python_path,
                PipAction::Downgrade,
                &package,
                Some(&version),
                sink,
            ),
            Request::GetOperationState { python_path } => Ok(Response::OperationState(
                self.orchestrator
                    .state(required_path("python_path", &python_path)?),
            )),
            Request::CancelOperation { python_path } => Ok(Response::CancelRequested(
                self.orchestrator
                    .cancel(required_path("python_path", &python_path)?),
            )),
        }
    }

    fn run_pip(
        &self,
        python: &Path,
        action: PipAction,
        package: &str,
        version: Option<&str>,
        sink: &mut dyn LogSink,
    ) -> Result<Response> {
        let python = required_path("python_path", python)?;
        let request = PipRequest::new(action, package, version)?;
        let report = self
            .orchestrator
            .run_streaming(python, request, |line| sink.pip_log(line))?;
        report.into_result().map(Response::Operation)
    }
}

fn required_path<'a>(field: &str, path: &'a Path) -> Result<&'a Path> {
    if path.as_os_str().is_empty() {
        return Err(PipdeskError::invalid_request(format!(
            "{} must not be empty",
            field
        )));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn backend() -> Backend {
        Backend::new(PipdeskConfig::default()).unwrap()
    }

    #[test]
    fn nothing_selected_initially() {
        let response = backend()
            .handle(Request::GetSelectedPython, &mut NullSink)
            .unwrap();
        assert_eq!(response, Response::Selected(None));
    }

    #[test]
    fn empty_paths_are_invalid_requests() {
        let backend = backend();
        for request in [
            Request::ListDirectory {
                path: PathBuf::new(),
            },
            Request::SelectPython {
                path: PathBuf::new(),
            },
            Request::ListInstalledPackages {
                python_path: PathBuf::new(),
            },
            Request::InstallPackage {
                python_path: PathBuf::new(),
                package: "flask".into(),
                version: None,
            },
        ] {
            let err = backend.handle(request, &mut NullSink).unwrap_err();
            assert_eq!(err.kind(), "invalid_request");
        }
    }

    #[test]
    fn bad_package_names_never_reach_pip() {
        let err = backend()
            .handle(
                Request::UninstallPackage {
                    python_path: PathBuf::from("/usr/bin/python3"),
                    package: "flask; rm -rf /".into(),
                },
                &mut NullSink,
            )
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_request");
    }

    #[test]
    fn empty_search_is_invalid_request() {
        let err = backend()
            .handle(
                Request::SearchPypi {
                    query: "   ".into(),
                },
                &mut NullSink,
            )
            .unwrap_err();
        assert_eq!(err.kind(), "invalid_request");
    }

    #[test]
    fn idle_interpreter_has_nothing_to_cancel() {
        let response = backend()
            .handle(
                Request::CancelOperation {
                    python_path: PathBuf::from("/usr/bin/python3"),
                },
                &mut NullSink,
            )
            .unwrap();
        assert_eq!(response, Response::CancelRequested(false));
    }

    #[test]
    fn bad_index_url_fails_construction() {
        let config = PipdeskConfig {
            index_url: "not a url".into(),
            ..Default::default()
        };
        assert!(Backend::new(config).is_err());
    }
}

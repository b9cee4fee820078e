//! Project dependency reconciliation.
//!
//! A project declares dependencies in its manifests ([`manifest`]); the
//! [`resolver`] classifies each against a freshly read inventory using the
//! statuses in [`status`].
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use pipdesk::project::reconcile_project;
//!
//! let deps = reconcile_project(Path::new("."), Path::new("/usr/bin/python3")).unwrap();
//! for dep in deps {
//!     println!("{} {} -> {:?}", dep.name, dep.version_spec, dep.status);
//! }
//! ```

pub mod manifest;
pub mod resolver;
pub mod status;

pub use manifest::{
    detect_project_files, parse_requirement, read_project_dependencies, DependencySpec,
};
pub use resolver::{classify, reconcile_project, resolve};
pub use status::{DependencyStatus, ReconciledDependency};

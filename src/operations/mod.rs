//! Mutating package operations.
//!
//! - [`action`] - install / uninstall / upgrade / downgrade requests
//! - [`orchestrator`] - supervised pip subprocesses with live output
//! - [`report`] - the outcome of a finished run
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use pipdesk::operations::{Orchestrator, PipAction, PipRequest};
//!
//! let request = PipRequest::new(PipAction::Install, "requests", None).unwrap();
//! let handle = Orchestrator::default()
//!     .run(Path::new("/usr/bin/python3"), request)
//!     .unwrap();
//! for line in handle.lines() {
//!     println!("{}", line.display_text());
//! }
//! let report = handle.wait();
//! println!("{:?}", report.status);
//! ```

pub mod action;
pub mod orchestrator;
pub mod report;

pub use action::{PipAction, PipRequest};
pub use orchestrator::{CancelToken, OperationHandle, Orchestrator, DEFAULT_TAIL_LINES};
pub use report::{OperationReport, OperationState, OperationStatus};

//! The request/response command surface.
//!
//! Presentation clients talk to pipdesk through [`Request`] values handled
//! by a [`Backend`]. The CLI's `serve` mode speaks this protocol as JSON
//! lines; the human-facing subcommands build requests directly.
//!
//! # Example
//!
//! ```
//! use pipdesk::commands::{Backend, NullSink, Request, Response};
//! use pipdesk::config::PipdeskConfig;
//!
//! let backend = Backend::new(PipdeskConfig::default()).unwrap();
//! let response = backend.handle(Request::GetSelectedPython, &mut NullSink).unwrap();
//! assert_eq!(response, Response::Selected(None));
//! ```

pub mod backend;
pub mod request;

pub use backend::{Backend, LogSink, NullSink};
pub use request::{ErrorPayload, Request, Response};

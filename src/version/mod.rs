//! Version parsing, ordering, and specifier matching.
//!
//! Python package versions loosely follow PEP 440. This module parses the
//! common subset found in the wild (release segments, pre/post/dev tags,
//! epochs, local labels) and matches them against comparator lists such as
//! `>=1.0,<2.0`.
//!
//! # Example
//!
//! ```
//! use pipdesk::version::{Version, VersionSpec};
//!
//! let spec: VersionSpec = ">=2.0,<3.0".parse().unwrap();
//! assert!(spec.contains(&"2.1.0".parse::<Version>().unwrap()));
//! assert!(!spec.contains(&"3.0.0".parse::<Version>().unwrap()));
//! ```

pub mod number;
pub mod specifier;

pub use number::{PreRelease, Version};
pub use specifier::{Comparator, Operator, VersionSpec};

use thiserror::Error;

/// Errors raised while parsing versions or specifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    /// The string is not a recognizable version.
    #[error("Invalid version: '{0}'")]
    InvalidVersion(String),

    /// The string is not a recognizable version specifier.
    #[error("Invalid version specifier: '{0}'")]
    InvalidSpecifier(String),
}

/// Compare two version strings, falling back to string order when either
/// side does not parse.
pub fn compare_version_strings(a: &str, b: &str) -> std::cmp::Ordering {
    match (a.parse::<Version>(), b.parse::<Version>()) {
        (Ok(va), Ok(vb)) => va.cmp(&vb),
        (Ok(_), Err(_)) => std::cmp::Ordering::Greater,
        (Err(_), Ok(_)) => std::cmp::Ordering::Less,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

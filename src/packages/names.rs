//! Package name and version validation.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{PipdeskError, Result};

static PACKAGE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?(?:\[[A-Za-z0-9._-]+(?:\s*,\s*[A-Za-z0-9._-]+)*\])?$")
        .expect("PACKAGE_NAME regex must compile")
});

static VERSION_ARG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d+!)?\d+(?:\.\d+)*[A-Za-z0-9.+-]*$").expect("VERSION_ARG regex must compile")
});

static SEPARATOR_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_.]+").expect("SEPARATOR_RUN regex must compile"));

/// Normalize a distribution name: lowercase, runs of `-`, `_`, `.` become `-`.
///
/// # Example
///
/// ```
/// use pipdesk::packages::normalize_name;
///
/// assert_eq!(normalize_name("Flask_SQLAlchemy"), "flask-sqlalchemy");
/// assert_eq!(normalize_name("zope.interface"), "zope-interface");
/// ```
pub fn normalize_name(name: &str) -> String {
    SEPARATOR_RUN
        .replace_all(name.trim(), "-")
        .to_ascii_lowercase()
}

/// Whether `name` is acceptable as a pip argument: letters, digits, `.`,
/// `_`, `-`, optionally followed by `[extra,...]`.
pub fn is_valid_package_name(name: &str) -> bool {
    PACKAGE_NAME.is_match(name)
}

/// Whether `version` looks like something pip would accept after `==`.
pub fn is_valid_version(version: &str) -> bool {
    VERSION_ARG.is_match(version)
}

/// Reject a package name before it reaches a subprocess.
pub fn check_package_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PipdeskError::invalid_request("package name must not be empty"));
    }
    if !is_valid_package_name(name) {
        return Err(PipdeskError::invalid_request(format!(
            "invalid package name '{}'",
            name
        )));
    }
    Ok(name)
}

/// Reject a version string before it reaches a subprocess.
pub fn check_version(version: &str) -> Result<&str> {
    let version = version.trim();
    if !is_valid_version(version) {
        return Err(PipdeskError::invalid_request(format!(
            "invalid version '{}'",
            version
        )));
    }
    Ok(version)
}

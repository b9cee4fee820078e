//! Version numbers.

use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use super::VersionError;

/// PEP 440 public version pattern, with the usual spelling variants.
static VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)
        ^\s*v?
        (?:(?P<epoch>\d+)!)?
        (?P<release>\d+(?:\.\d+)*)
        (?:[-_.]?(?P<pre_l>alpha|beta|preview|pre|rc|a|b|c)[-_.]?(?P<pre_n>\d+)?)?
        (?:-(?P<post_n1>\d+)|[-_.]?(?P<post_l>post|rev|r)[-_.]?(?P<post_n2>\d+)?)?
        (?:[-_.]?(?P<dev_l>dev)[-_.]?(?P<dev_n>\d+)?)?
        (?:\+(?P<local>[a-z0-9]+(?:[-_.][a-z0-9]+)*))?
        \s*$",
    )
    .expect("VERSION_REGEX must compile")
});

/// Pre-release phase. Declaration order is sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreRelease {
    Alpha,
    Beta,
    ReleaseCandidate,
}

impl PreRelease {
    fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "a" | "alpha" => PreRelease::Alpha,
            "b" | "beta" => PreRelease::Beta,
            _ => PreRelease::ReleaseCandidate,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            PreRelease::Alpha => "a",
            PreRelease::Beta => "b",
            PreRelease::ReleaseCandidate => "rc",
        }
    }
}

/// A parsed package version.
///
/// Ordering follows PEP 440: `1.0.dev1 < 1.0a1 < 1.0b1 < 1.0rc1 < 1.0 <
/// 1.0.post1`, trailing zero release segments are insignificant, and local
/// labels (`+ubuntu1`) do not take part in comparisons.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    epoch: u64,
    release: Vec<u64>,
    pre: Option<(PreRelease, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Option<String>,
}

/// Sort key for the pre-release slot.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum PreKey {
    DevOnly,
    Pre(PreRelease, u64),
    Final,
}

impl Version {
    /// Parse a version string.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let caps = VERSION_REGEX
            .captures(input)
            .ok_or_else(|| VersionError::InvalidVersion(input.to_string()))?;

        let number = |name: &str| -> Result<Option<u64>, VersionError> {
            caps.name(name)
                .map(|m| {
                    m.as_str()
                        .parse::<u64>()
                        .map_err(|_| VersionError::InvalidVersion(input.to_string()))
                })
                .transpose()
        };

        let release = caps["release"]
            .split('.')
            .map(|s| {
                s.parse::<u64>()
                    .map_err(|_| VersionError::InvalidVersion(input.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let pre = match caps.name("pre_l") {
            Some(label) => Some((
                PreRelease::from_label(label.as_str()),
                number("pre_n")?.unwrap_or(0),
            )),
            None => None,
        };

        let post = match (number("post_n1")?, caps.name("post_l")) {
            (Some(n), _) => Some(n),
            (None, Some(_)) => Some(number("post_n2")?.unwrap_or(0)),
            (None, None) => None,
        };

        let dev = match caps.name("dev_l") {
            Some(_) => Some(number("dev_n")?.unwrap_or(0)),
            None => None,
        };

        Ok(Self {
            raw: input.trim().to_string(),
            epoch: number("epoch")?.unwrap_or(0),
            release,
            pre,
            post,
            dev,
            local: caps.name("local").map(|m| m.as_str().to_lowercase()),
        })
    }

    /// The string this version was parsed from (trimmed).
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Release segments, e.g. `[1, 4, 2]` for `1.4.2`.
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    /// Epoch (`N!` prefix), zero when absent.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether this is a pre-release or development release.
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    /// Whether this is a post-release.
    pub fn is_postrelease(&self) -> bool {
        self.post.is_some()
    }

    /// Local version label, if any.
    pub fn local(&self) -> Option<&str> {
        self.local.as_deref()
    }

    /// Normalized rendering, e.g. `1.0-ALPHA.1` becomes `1.0a1`.
    pub fn normalized(&self) -> String {
        let mut out = String::new();
        if self.epoch != 0 {
            out.push_str(&format!("{}!", self.epoch));
        }
        let release: Vec<String> = self.release.iter().map(|n| n.to_string()).collect();
        out.push_str(&release.join("."));
        if let Some((phase, n)) = self.pre {
            out.push_str(&format!("{}{}", phase.as_str(), n));
        }
        if let Some(n) = self.post {
            out.push_str(&format!(".post{}", n));
        }
        if let Some(n) = self.dev {
            out.push_str(&format!(".dev{}", n));
        }
        if let Some(local) = &self.local {
            out.push_str(&format!("+{}", local));
        }
        out
    }

    /// Same release as `other`, ignoring pre/post/dev/local parts.
    pub(crate) fn same_release(&self, other: &Version) -> bool {
        self.epoch == other.epoch && compare_release(&self.release, &other.release).is_eq()
    }

    /// Whether the first `prefix.len()` release segments equal `prefix`,
    /// padding this version's release with zeros.
    pub(crate) fn release_starts_with(&self, prefix: &[u64]) -> bool {
        prefix
            .iter()
            .enumerate()
            .all(|(i, p)| self.release.get(i).copied().unwrap_or(0) == *p)
    }

    fn pre_key(&self) -> PreKey {
        match (self.pre, self.post, self.dev) {
            (None, None, Some(_)) => PreKey::DevOnly,
            (Some((phase, n)), _, _) => PreKey::Pre(phase, n),
            _ => PreKey::Final,
        }
    }

    fn dev_key(&self) -> (u8, u64) {
        match self.dev {
            Some(n) => (0, n),
            None => (1, 0),
        }
    }
}

fn compare_release(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    for i in 0..len {
        let left = a.get(i).copied().unwrap_or(0);
        let right = b.get(i).copied().unwrap_or(0);
        match left.cmp(&right) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| compare_release(&self.release, &other.release))
            .then_with(|| self.pre_key().cmp(&other.pre_key()))
            .then_with(|| self.post.cmp(&other.post))
            .then_with(|| self.dev_key().cmp(&other.dev_key()))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

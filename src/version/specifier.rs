//! Version specifiers (`>=1.0,<2.0`, `~=1.4.2`, `==1.*`).

use std::fmt;
use std::str::FromStr;

use super::{Version, VersionError};

/// Comparison operator of a single clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `~=`
    Compatible,
    /// `===`
    Arbitrary,
}

impl Operator {
    /// Longest tokens first so `===` is not read as `==`.
    const TOKENS: &'static [(&'static str, Operator)] = &[
        ("===", Operator::Arbitrary),
        ("~=", Operator::Compatible),
        ("==", Operator::Equal),
        ("!=", Operator::NotEqual),
        ("<=", Operator::LessEqual),
        (">=", Operator::GreaterEqual),
        ("<", Operator::Less),
        (">", Operator::Greater),
    ];

    /// The textual token, e.g. `>=`.
    pub fn as_str(self) -> &'static str {
        Self::TOKENS
            .iter()
            .find(|(_, op)| *op == self)
            .map(|(token, _)| *token)
            .unwrap_or("==")
    }

    fn split(clause: &str) -> (Operator, &str) {
        for (token, op) in Self::TOKENS {
            if let Some(rest) = clause.strip_prefix(token) {
                return (*op, rest.trim());
            }
        }
        // A bare version means an exact pin.
        (Operator::Equal, clause)
    }
}

/// One clause of a specifier, e.g. `<2.0`.
#[derive(Debug, Clone)]
pub struct Comparator {
    op: Operator,
    raw_version: String,
    version: Option<Version>,
    /// Release prefix for `==1.4.*` / `!=1.4.*`.
    wildcard: Option<Vec<u64>>,
}

impl Comparator {
    /// Parse a single clause.
    pub fn parse(clause: &str) -> Result<Self, VersionError> {
        let clause = clause.trim();
        let invalid = || VersionError::InvalidSpecifier(clause.to_string());
        let (op, rest) = Operator::split(clause);

        if rest.is_empty() {
            return Err(invalid());
        }

        if op == Operator::Arbitrary {
            return Ok(Self {
                op,
                raw_version: rest.to_string(),
                version: None,
                wildcard: None,
            });
        }

        if let Some(prefix) = rest.strip_suffix(".*") {
            if !matches!(op, Operator::Equal | Operator::NotEqual) {
                return Err(invalid());
            }
            let segments = prefix
                .split('.')
                .map(|s| s.parse::<u64>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| invalid())?;
            return Ok(Self {
                op,
                raw_version: rest.to_string(),
                version: None,
                wildcard: Some(segments),
            });
        }

        let version = Version::parse(rest).map_err(|_| invalid())?;
        if op == Operator::Compatible && version.release().len() < 2 {
            return Err(invalid());
        }

        Ok(Self {
            op,
            raw_version: rest.to_string(),
            version: Some(version),
            wildcard: None,
        })
    }

    /// The clause operator.
    pub fn operator(&self) -> Operator {
        self.op
    }

    /// Whether `candidate` satisfies this clause.
    pub fn matches(&self, candidate: &Version) -> bool {
        if let Some(prefix) = &self.wildcard {
            let hit = candidate.release_starts_with(prefix);
            return match self.op {
                Operator::NotEqual => !hit,
                _ => hit,
            };
        }

        let Some(target) = &self.version else {
            // `===` compares the literal strings.
            return candidate.as_str().eq_ignore_ascii_case(&self.raw_version);
        };

        match self.op {
            Operator::Equal => candidate == target,
            Operator::NotEqual => candidate != target,
            Operator::LessEqual => candidate <= target,
            Operator::GreaterEqual => candidate >= target,
            Operator::Less => {
                // `<2.0` must not admit `2.0a1`.
                candidate < target
                    && !(candidate.is_prerelease()
                        && !target.is_prerelease()
                        && candidate.same_release(target))
            }
            Operator::Greater => {
                // `>1.0` must not admit `1.0.post1`.
                candidate > target
                    && !(candidate.is_postrelease()
                        && !target.is_postrelease()
                        && candidate.same_release(target))
            }
            Operator::Compatible => {
                let release = target.release();
                candidate >= target
                    && candidate.epoch() == target.epoch()
                    && candidate.release_starts_with(&release[..release.len() - 1])
            }
            Operator::Arbitrary => candidate.as_str() == self.raw_version,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.as_str(), self.raw_version)
    }
}

/// A conjunctive list of comparators. Empty means "any version".
#[derive(Debug, Clone, Default)]
pub struct VersionSpec {
    comparators: Vec<Comparator>,
}

impl VersionSpec {
    /// A specifier that accepts every version.
    pub fn any() -> Self {
        Self::default()
    }

    /// Parse a comma-separated specifier. Empty input and `*` mean "any".
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed == "*" {
            return Ok(Self::any());
        }

        let comparators = trimmed
            .split(',')
            .map(|clause| {
                if clause.trim().is_empty() {
                    Err(VersionError::InvalidSpecifier(input.to_string()))
                } else {
                    Comparator::parse(clause)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { comparators })
    }

    /// Whether this accepts every version.
    pub fn is_any(&self) -> bool {
        self.comparators.is_empty()
    }

    /// The individual clauses.
    pub fn comparators(&self) -> &[Comparator] {
        &self.comparators
    }

    /// Whether every clause is satisfied by `version`.
    pub fn contains(&self, version: &Version) -> bool {
        self.comparators.iter().all(|c| c.matches(version))
    }
}

impl FromStr for VersionSpec {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VersionSpec::parse(s)
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.comparators.is_empty() {
            return f.write_str("*");
        }
        let parts: Vec<String> = self.comparators.iter().map(|c| c.to_string()).collect();
        f.write_str(&parts.join(","))
    }
}

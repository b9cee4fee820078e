//! Scanning search roots for interpreters.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::probe::{candidates_in, SearchRoots};
use super::{Interpreter, Validator};

/// Scans [`SearchRoots`] and validates every candidate it finds.
#[derive(Debug, Clone)]
pub struct Discovery {
    roots: SearchRoots,
    validator: Validator,
}

impl Discovery {
    /// Create a scanner over explicit roots.
    pub fn new(roots: SearchRoots, validator: Validator) -> Self {
        Self { roots, validator }
    }

    /// Scanner over the process environment with default settings.
    pub fn from_environment() -> Self {
        Self::new(SearchRoots::from_env(&[], &[]), Validator::default())
    }

    /// The roots this scanner visits.
    pub fn roots(&self) -> &SearchRoots {
        &self.roots
    }

    /// Run a fresh scan.
    ///
    /// System interpreters come before virtual-environment ones; inside each
    /// group the scan order is kept. Candidates that fail validation are
    /// dropped, and two candidates resolving to the same file count once
    /// unless they belong to different environments.
    pub fn discover(&self) -> Vec<Interpreter> {
        let mut seen: HashSet<(PathBuf, Option<PathBuf>)> = HashSet::new();
        let mut system = Vec::new();
        let mut environments = Vec::new();

        for dir in self.roots.directories() {
            for candidate in candidates_in(dir) {
                let interpreter = match self.validator.validate(&candidate) {
                    Ok(interpreter) => interpreter,
                    Err(e) => {
                        debug!("Discarding candidate: {}", e);
                        continue;
                    }
                };

                if !seen.insert(identity(&interpreter)) {
                    continue;
                }

                if interpreter.is_venv {
                    environments.push(interpreter);
                } else {
                    system.push(interpreter);
                }
            }
        }

        debug!(
            "Discovered {} system and {} environment interpreters",
            system.len(),
            environments.len()
        );
        system.extend(environments);
        system
    }
}

/// Resolved executable plus, for environment interpreters, the folder it
/// was found in. A venv's `python` is usually a symlink to its base
/// interpreter, so the resolved path alone would merge the two.
fn identity(interpreter: &Interpreter) -> (PathBuf, Option<PathBuf>) {
    let resolved = canonical(&interpreter.path);
    let scope = interpreter
        .is_venv
        .then(|| interpreter.path.parent().map(canonical))
        .flatten();
    (resolved, scope)
}

fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

//! Search roots for interpreter discovery.
//!
//! Interpreters live in a handful of predictable places: the platform's
//! install prefixes, whatever is on PATH, pyenv's version tree, and the
//! folders people keep virtual environments in. [`SearchRoots`] collects
//! those directories in scan order; [`candidates_in`] lists the files in one
//! directory whose names look like an interpreter.
//!
//! Environment lookups go through an injectable function so tests can probe
//! a fake home and PATH without touching the real process environment.

use std::env::VarError;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::venv;

static PYTHON_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^python(?:3(?:\.\d+)?)?$").expect("PYTHON_NAME regex must compile")
});

/// Virtual-environment parent folders relative to the home directory.
const HOME_VENV_PARENTS: &[&str] = &[".virtualenvs", ".venvs", "venvs"];

/// Environment variables that point at an active environment root.
const ACTIVE_ENV_VARS: &[&str] = &["VIRTUAL_ENV", "CONDA_PREFIX"];

/// Check whether a file has executable permission bits set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// On Windows, executability is determined by file extension, not permission bits.
#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("exe"))
        .unwrap_or(false)
}

/// Whether a file name is one an interpreter is installed under.
///
/// `python`, `python3` and `python3.N` on Unix; `python.exe` on Windows.
pub fn looks_like_python(name: &str) -> bool {
    if cfg!(windows) {
        name.eq_ignore_ascii_case("python.exe")
    } else {
        PYTHON_NAME.is_match(name)
    }
}

/// Files in `dir` whose names look like an interpreter, sorted by name.
///
/// An unreadable directory yields nothing.
pub fn candidates_in(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Skipping search root {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut found: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .map(looks_like_python)
                .unwrap_or(false)
        })
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    found.sort();
    found
}

/// Ordered, de-duplicated directories to scan for interpreters.
#[derive(Debug, Clone, Default)]
pub struct SearchRoots {
    directories: Vec<PathBuf>,
}

impl SearchRoots {
    /// Roots for the current process environment.
    ///
    /// `extra_roots` are scanned directly (and their `bin` folder, if any);
    /// every child of each `venv_parents` entry is treated as an environment.
    pub fn from_env(extra_roots: &[PathBuf], venv_parents: &[PathBuf]) -> Self {
        Self::with_env(dirs::home_dir(), extra_roots, venv_parents, |key: &str| {
            std::env::var(key)
        })
    }

    /// Roots computed with a custom home directory and env var lookup.
    ///
    /// This allows testing without modifying actual environment variables.
    pub fn with_env<F>(
        home: Option<PathBuf>,
        extra_roots: &[PathBuf],
        venv_parents: &[PathBuf],
        env_fn: F,
    ) -> Self
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        let mut roots = Self::default();

        for prefix in platform_prefixes(&env_fn) {
            roots.push(prefix);
        }

        if let Ok(path) = env_fn("PATH") {
            for dir in std::env::split_paths(&path) {
                roots.push(dir);
            }
        }

        let pyenv_root = env_fn("PYENV_ROOT")
            .ok()
            .map(PathBuf::from)
            .or_else(|| home.as_ref().map(|h| h.join(".pyenv")));
        if let Some(pyenv_root) = pyenv_root {
            for version in sorted_children(&pyenv_root.join("versions")) {
                roots.push(version.join("bin"));
            }
        }

        for root in extra_roots {
            roots.push(root.clone());
            roots.push(root.join("bin"));
        }

        for var in ACTIVE_ENV_VARS {
            if let Ok(value) = env_fn(var) {
                if !value.is_empty() {
                    roots.push_env_root(Path::new(&value));
                }
            }
        }

        let mut parents: Vec<PathBuf> = home
            .iter()
            .flat_map(|h| HOME_VENV_PARENTS.iter().map(move |p| h.join(p)))
            .collect();
        parents.extend(venv_parents.iter().cloned());
        for parent in parents {
            for env_root in sorted_children(&parent) {
                roots.push_env_root(&env_root);
            }
        }

        roots
    }

    /// Roots made of exactly these directories, in order.
    pub fn from_dirs(dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut roots = Self::default();
        for dir in dirs {
            roots.push(dir);
        }
        roots
    }

    /// Directories in scan order.
    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    fn push(&mut self, dir: PathBuf) {
        if !dir.as_os_str().is_empty() && !self.directories.contains(&dir) {
            self.directories.push(dir);
        }
    }

    fn push_env_root(&mut self, env_root: &Path) {
        for dir in venv::executable_dirs(env_root) {
            self.push(dir);
        }
    }
}

/// Subdirectories of `dir`, sorted by name. Missing or unreadable → empty.
fn sorted_children(dir: &Path) -> Vec<PathBuf> {
    let mut children: Vec<PathBuf> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_dir())
                .collect()
        })
        .unwrap_or_default();
    children.sort();
    children
}

#[cfg(not(windows))]
fn platform_prefixes<F>(_env_fn: &F) -> Vec<PathBuf>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    ["/usr/bin", "/usr/local/bin", "/opt/homebrew/bin"]
        .iter()
        .map(PathBuf::from)
        .collect()
}

#[cfg(windows)]
fn platform_prefixes<F>(env_fn: &F) -> Vec<PathBuf>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    // C:\Python311 and friends, plus per-user installs.
    let mut prefixes: Vec<PathBuf> = std::fs::read_dir("C:\\")
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| {
                    e.file_name()
                        .to_str()
                        .map(|n| n.to_ascii_lowercase().starts_with("python"))
                        .unwrap_or(false)
                })
                .map(|e| e.path())
                .collect()
        })
        .unwrap_or_default();
    prefixes.sort();

    if let Ok(local) = env_fn("LOCALAPPDATA") {
        prefixes.extend(sorted_children(
            &PathBuf::from(local).join("Programs").join("Python"),
        ));
    }
    prefixes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    /// Create a fake binary at a path (creates parent dirs as needed).
    fn create_fake_binary(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "#!/bin/sh\n").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    fn env_from(vars: &[(&str, String)]) -> impl Fn(&str) -> Result<String, VarError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        move |key: &str| map.get(key).cloned().ok_or(VarError::NotPresent)
    }

    #[cfg(unix)]
    #[test]
    fn python_names_on_unix() {
        for name in ["python", "python3", "python3.12"] {
            assert!(looks_like_python(name), "{}", name);
        }
        for name in ["python2", "python3-config", "pythonw", "ipython", "python3.12m"] {
            assert!(!looks_like_python(name), "{}", name);
        }
    }

    #[cfg(unix)]
    #[test]
    fn candidates_in_lists_matching_files_sorted() {
        let temp = TempDir::new().unwrap();
        create_fake_binary(&temp.path().join("python3.11"));
        create_fake_binary(&temp.path().join("python"));
        create_fake_binary(&temp.path().join("pip"));
        fs::create_dir(temp.path().join("python3")).unwrap();

        let found = candidates_in(temp.path());
        assert_eq!(
            found,
            vec![temp.path().join("python"), temp.path().join("python3.11")]
        );
    }

    #[test]
    fn candidates_in_missing_dir_is_empty() {
        assert!(candidates_in(Path::new("/definitely/not/here")).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn with_env_orders_path_pyenv_and_venvs() {
        let temp = TempDir::new().unwrap();
        let home = temp.path().join("home");
        let on_path = temp.path().join("tools/bin");
        fs::create_dir_all(&on_path).unwrap();
        fs::create_dir_all(home.join(".pyenv/versions/3.12.1/bin")).unwrap();
        fs::create_dir_all(home.join(".virtualenvs/api/bin")).unwrap();
        let active = temp.path().join("active-env");
        fs::create_dir_all(active.join("bin")).unwrap();

        let roots = SearchRoots::with_env(
            Some(home.clone()),
            &[],
            &[],
            env_from(&[
                ("PATH", on_path.display().to_string()),
                ("VIRTUAL_ENV", active.display().to_string()),
            ]),
        );

        let dirs = roots.directories();
        let pos = |p: &Path| dirs.iter().position(|d| d == p).unwrap();
        assert!(dirs.contains(&PathBuf::from("/usr/bin")));
        assert!(pos(&on_path) < pos(&home.join(".pyenv/versions/3.12.1/bin")));
        assert!(pos(&active.join("bin")) < pos(&home.join(".virtualenvs/api/bin")));
    }

    #[test]
    fn pyenv_root_env_var_wins_over_home() {
        let temp = TempDir::new().unwrap();
        let custom = temp.path().join("custom-pyenv");
        fs::create_dir_all(custom.join("versions/3.11.4")).unwrap();

        let roots = SearchRoots::with_env(
            Some(temp.path().join("nohome")),
            &[],
            &[],
            env_from(&[("PYENV_ROOT", custom.display().to_string())]),
        );
        assert!(roots
            .directories()
            .contains(&custom.join("versions/3.11.4/bin")));
    }

    #[test]
    fn configured_roots_are_included() {
        let temp = TempDir::new().unwrap();
        let extra = temp.path().join("opt-python");
        let parent = temp.path().join("envs");
        fs::create_dir_all(parent.join("one")).unwrap();

        let roots = SearchRoots::with_env(
            None,
            std::slice::from_ref(&extra),
            std::slice::from_ref(&parent),
            env_from(&[]),
        );
        let dirs = roots.directories();
        assert!(dirs.contains(&extra));
        assert!(dirs.contains(&extra.join("bin")));
        assert!(dirs.contains(&venv::executable_dirs(&parent.join("one"))[0]));
    }

    #[test]
    fn from_dirs_deduplicates() {
        let roots = SearchRoots::from_dirs(vec![
            PathBuf::from("/a"),
            PathBuf::from("/b"),
            PathBuf::from("/a"),
        ]);
        assert_eq!(roots.directories().len(), 2);
    }
}

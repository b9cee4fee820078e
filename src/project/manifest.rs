//! Reading declared dependencies from project manifests.
//!
//! Sources, in order: `pyproject.toml` (`[project].dependencies`, then each
//! `[project].optional-dependencies` group), `requirements.txt`, then
//! `requirements-dev.txt`. Missing files contribute nothing.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{PipdeskError, Result};

/// Manifest files reported by [`detect_project_files`], in report order.
pub const PROJECT_FILES: &[&str] = &[
    "pyproject.toml",
    "requirements.txt",
    "requirements-dev.txt",
    "setup.py",
    "Pipfile",
    "poetry.lock",
];

const PYPROJECT: &str = "pyproject.toml";
const REQUIREMENT_FILES: &[&str] = &["requirements.txt", "requirements-dev.txt"];

static REQUIREMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)\s*(?:\[[^\]]*\])?\s*(.*)$")
        .expect("REQUIREMENT regex must compile")
});

/// A dependency as declared in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DependencySpec {
    pub name: String,
    /// Specifier text, `*` when the declaration has none.
    pub version_spec: String,
    /// Manifest the declaration came from.
    pub source: String,
}

/// Parse one requirement into `(name, version_spec)`.
///
/// Accepts `name`, `name[extras]`, `name>=1.0,<2`, `name (>=1.0)`,
/// `name 1.0` (read as `==1.0`) and drops environment markers after `;`.
/// Per-requirement options such as `--hash=sha256:...` are dropped too.
/// Direct references (`name @ url`) are kept with an any-version spec.
/// Returns `None` for options, URLs and anything else without a usable name.
pub fn parse_requirement(line: &str) -> Option<(String, String)> {
    let line = strip_comment(line).trim();
    if line.is_empty() || line.starts_with('-') {
        return None;
    }

    let requirement = strip_options(line.split(';').next().unwrap_or_default()).trim();
    let caps = REQUIREMENT.captures(requirement)?;
    let name = caps.get(1)?.as_str().to_string();
    let rest = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();

    let rest = rest
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .map(str::trim)
        .unwrap_or(rest);

    let spec = match rest.chars().next() {
        None | Some('@') => "*".to_string(),
        Some(c) if c.is_ascii_digit() => format!("=={}", rest),
        Some('=' | '<' | '>' | '!' | '~') => rest.to_string(),
        Some(_) => {
            debug!("Skipping unrecognised requirement '{}'", line);
            return None;
        }
    };

    Some((name, spec))
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Cut at the first whitespace-separated token starting with `-`.
fn strip_options(requirement: &str) -> &str {
    let mut previous = '\0';
    for (idx, c) in requirement.char_indices() {
        if c == '-' && previous.is_whitespace() {
            return &requirement[..idx];
        }
        previous = c;
    }
    requirement
}

/// Join lines ending in `\` with the line that follows.
fn logical_lines(content: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending = String::new();
    for line in content.lines() {
        match line.trim_end().strip_suffix('\\') {
            Some(head) => {
                pending.push_str(head);
                pending.push(' ');
            }
            None => {
                pending.push_str(line);
                lines.push(std::mem::take(&mut pending));
            }
        }
    }
    if !pending.is_empty() {
        lines.push(pending);
    }
    lines
}

/// Parse the contents of a requirements file.
pub fn parse_requirements_txt(content: &str, source: &str) -> Vec<DependencySpec> {
    logical_lines(content)
        .iter()
        .filter_map(|line| parse_requirement(line))
        .map(|(name, version_spec)| DependencySpec {
            name,
            version_spec,
            source: source.to_string(),
        })
        .collect()
}

/// Parse `[project]` dependency arrays from `pyproject.toml` contents.
pub fn parse_pyproject(
    content: &str,
    source: &str,
) -> std::result::Result<Vec<DependencySpec>, toml::de::Error> {
    let doc: toml::Table = content.parse()?;
    let Some(project) = doc.get("project").and_then(|p| p.as_table()) else {
        return Ok(Vec::new());
    };

    let mut specs = Vec::new();
    let mut push_all = |values: Option<&toml::Value>, source: String| {
        let Some(values) = values.and_then(|v| v.as_array()) else {
            return;
        };
        for value in values {
            let Some(text) = value.as_str() else { continue };
            if let Some((name, version_spec)) = parse_requirement(text) {
                specs.push(DependencySpec {
                    name,
                    version_spec,
                    source: source.clone(),
                });
            }
        }
    };

    push_all(project.get("dependencies"), source.to_string());

    if let Some(groups) = project
        .get("optional-dependencies")
        .and_then(|g| g.as_table())
    {
        for (group, values) in groups {
            push_all(Some(values), format!("{} [{}]", source, group));
        }
    }

    Ok(specs)
}

/// Read every declared dependency of the project at `project`.
pub fn read_project_dependencies(project: &Path) -> Result<Vec<DependencySpec>> {
    ensure_dir(project)?;
    let mut specs = Vec::new();

    if let Some(content) = read_optional(&project.join(PYPROJECT)) {
        match parse_pyproject(&content, PYPROJECT) {
            Ok(found) => specs.extend(found),
            Err(e) => warn!("Ignoring unparsable {}: {}", PYPROJECT, e),
        }
    }

    for file in REQUIREMENT_FILES {
        if let Some(content) = read_optional(&project.join(file)) {
            specs.extend(parse_requirements_txt(&content, file));
        }
    }

    debug!(
        "Read {} declared dependencies from {}",
        specs.len(),
        project.display()
    );
    Ok(specs)
}

/// Which well-known manifest files exist in `project`.
pub fn detect_project_files(project: &Path) -> Result<Vec<String>> {
    ensure_dir(project)?;
    Ok(PROJECT_FILES
        .iter()
        .filter(|name| project.join(name).exists())
        .map(|name| name.to_string())
        .collect())
}

fn ensure_dir(project: &Path) -> Result<()> {
    if project.is_dir() {
        Ok(())
    } else {
        Err(PipdeskError::PathUnreadable {
            path: project.to_path_buf(),
            message: "not a directory".to_string(),
        })
    }
}

/// File contents, or `None` when missing. Unreadable files are logged.
fn read_optional(path: &Path) -> Option<String> {
    if !path.exists() {
        return None;
    }
    match std::fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            warn!("Cannot read {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn req(line: &str) -> Option<(String, String)> {
        parse_requirement(line)
    }

    fn pair(name: &str, spec: &str) -> Option<(String, String)> {
        Some((name.to_string(), spec.to_string()))
    }

    #[test]
    fn plain_and_pinned_requirements() {
        assert_eq!(req("flask"), pair("flask", "*"));
        assert_eq!(req("requests==2.31.0"), pair("requests", "==2.31.0"));
        assert_eq!(req("Django >= 4.2, < 5"), pair("Django", ">= 4.2, < 5"));
        assert_eq!(req("numpy~=1.26"), pair("numpy", "~=1.26"));
    }

    #[test]
    fn extras_markers_and_comments() {
        assert_eq!(req("uvicorn[standard]>=0.20"), pair("uvicorn", ">=0.20"));
        assert_eq!(
            req("pywin32>=306 ; sys_platform == 'win32'"),
            pair("pywin32", ">=306")
        );
        assert_eq!(req("black  # formatter"), pair("black", "*"));
        assert_eq!(req("zope.interface (>=5.0)"), pair("zope.interface", ">=5.0"));
    }

    #[test]
    fn bare_version_is_pinned() {
        assert_eq!(req("pytest 7.4.0"), pair("pytest", "==7.4.0"));
    }

    #[test]
    fn direct_reference_accepts_any_version() {
        assert_eq!(
            req("mylib @ https://example.com/mylib-1.0.tar.gz"),
            pair("mylib", "*")
        );
    }

    #[test]
    fn skips_options_blank_and_urls() {
        let lines = [
            "",
            "   ",
            "# comment",
            "-r base.txt",
            "-e .",
            "--index-url https://x",
            "git+https://github.com/a/b.git",
            "./local/pkg",
        ];
        for line in lines {
            assert_eq!(req(line), None, "{:?}", line);
        }
    }

    #[test]
    fn requirements_file_keeps_order_and_source() {
        let specs = parse_requirements_txt(
            "# deps\nflask>=2.0\n\n-r other.txt\nrequests\n",
            "requirements.txt",
        );
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name, "flask");
        assert_eq!(specs[1].name, "requests");
        assert!(specs.iter().all(|s| s.source == "requirements.txt"));
    }

    #[test]
    fn hash_options_are_not_part_of_the_specifier() {
        assert_eq!(
            req("flask>=2.0,<3.0 --hash=sha256:abcdef"),
            pair("flask", ">=2.0,<3.0")
        );
        assert_eq!(req("black --no-binary :all:"), pair("black", "*"));
        assert_eq!(req("my-package-name==1.0"), pair("my-package-name", "==1.0"));
    }

    #[test]
    fn continuation_lines_are_joined() {
        let specs = parse_requirements_txt(
            "flask>=2.0,<3.0 \\\n    --hash=sha256:abcdef \\\n    --hash=sha256:fedcba\nrequests==2.31.0 \\\n    --hash=sha256:0123\n",
            "requirements.txt",
        );
        let parsed: Vec<_> = specs
            .iter()
            .map(|s| (s.name.as_str(), s.version_spec.as_str()))
            .collect();
        assert_eq!(parsed, [("flask", ">=2.0,<3.0"), ("requests", "==2.31.0")]);
    }

    #[test]
    fn trailing_continuation_keeps_the_requirement() {
        let specs = parse_requirements_txt("numpy>=1.26 \\", "requirements.txt");
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].version_spec, ">=1.26");
    }

    #[test]
    fn pyproject_dependencies_and_optional_groups() {
        let content = r#"
[project]
name = "demo"
dependencies = [
    "httpx>=0.25",
    "pydantic[email]==2.5.0; python_version >= '3.8'",
]

[project.optional-dependencies]
test = ["pytest>=7"]

[tool.black]
line-length = 100
"#;
        let specs = parse_pyproject(content, "pyproject.toml").unwrap();
        let names: Vec<_> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["httpx", "pydantic", "pytest"]);
        assert_eq!(specs[1].version_spec, "==2.5.0");
        assert_eq!(specs[2].source, "pyproject.toml [test]");
    }

    #[test]
    fn pyproject_without_project_table_is_empty() {
        let specs = parse_pyproject("[tool.poetry]\nname = \"x\"\n", "pyproject.toml").unwrap();
        assert!(specs.is_empty());
        assert!(parse_pyproject("[project\n", "pyproject.toml").is_err());
    }

    #[test]
    fn reads_all_manifests_in_order() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("pyproject.toml"),
            "[project]\ndependencies = [\"click\"]\n",
        )
        .unwrap();
        fs::write(temp.path().join("requirements.txt"), "flask>=2.0\n").unwrap();
        fs::write(temp.path().join("requirements-dev.txt"), "pytest\n").unwrap();

        let specs = read_project_dependencies(temp.path()).unwrap();
        let names: Vec<_> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["click", "flask", "pytest"]);
        assert_eq!(specs[2].source, "requirements-dev.txt");
    }

    #[test]
    fn broken_pyproject_does_not_hide_requirements() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("pyproject.toml"), "[project\n").unwrap();
        fs::write(temp.path().join("requirements.txt"), "flask\n").unwrap();
        let specs = read_project_dependencies(temp.path()).unwrap();
        assert_eq!(specs.len(), 1);
    }

    #[test]
    fn detects_project_files() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("setup.py"), "").unwrap();
        fs::write(temp.path().join("requirements.txt"), "").unwrap();
        assert_eq!(
            detect_project_files(temp.path()).unwrap(),
            vec!["requirements.txt", "setup.py"]
        );
    }

    #[test]
    fn missing_project_is_unreadable() {
        let err = read_project_dependencies(Path::new("/no/such/project")).unwrap_err();
        assert_eq!(err.kind(), "path_unreadable");
    }
}

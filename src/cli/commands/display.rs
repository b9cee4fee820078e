//! Rendering responses for people and for `--json`.

use std::time::Duration;

use crate::browser::DirectoryEntry;
use crate::commands::Response;
use crate::error::Result;
use crate::index::PackageDetails;
use crate::interpreter::Interpreter;
use crate::operations::{OperationReport, OperationState, PipAction};
use crate::project::ReconciledDependency;
use crate::ui::{should_use_colors, PipdeskTheme, Table, UserInterface};

/// Rendering knobs that depend on the subcommand.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayOptions {
    /// How many releases `info` lists. `None` lists all.
    pub release_limit: Option<usize>,
}

/// Print the response's data as pretty JSON.
pub fn print_json(response: &Response, ui: &mut dyn UserInterface) -> Result<()> {
    let value = serde_json::to_value(response)
        .map_err(|e| anyhow::anyhow!("Failed to serialize response: {}", e))?;
    let data = value.get("data").cloned().unwrap_or(serde_json::Value::Null);
    let text = serde_json::to_string_pretty(&data)
        .map_err(|e| anyhow::anyhow!("Failed to serialize response: {}", e))?;
    ui.message(&text);
    Ok(())
}

/// Show a response in human form.
pub fn show_response(response: &Response, ui: &mut dyn UserInterface, options: DisplayOptions) {
    let theme = theme();
    match response {
        Response::Selected(Some(interpreter)) => {
            ui.message(&format!("Selected: {}", interpreter.label()));
        }
        Response::Selected(None) => {
            ui.message("No interpreter selected");
            ui.show_hint("Run `pipdesk select` to choose one.");
        }
        Response::Interpreters(found) => show_interpreters(found, ui),
        Response::Interpreter(interpreter) => {
            ui.success(&format!("{} is valid", interpreter.label()));
            if let Some(base) = &interpreter.venv_base {
                ui.message(&format!("  base interpreter: {}", base.display()));
            }
        }
        Response::Path(path) => ui.message(&path.display().to_string()),
        Response::Paths(paths) => {
            for path in paths {
                ui.message(&path.display().to_string());
            }
        }
        Response::Entries(entries) => show_entries(entries, ui),
        Response::Packages(packages) => {
            if packages.is_empty() {
                ui.warning("No packages installed");
                return;
            }
            let mut table = Table::new(["Package", "Version"]);
            for package in packages {
                table.add_row([package.name.as_str(), package.version.as_str()]);
            }
            ui.show_header(&plural(packages.len(), "package"));
            ui.show_table(&table);
        }
        Response::PipVersion(version) => ui.message(version),
        Response::SearchResults(hits) => {
            if hits.is_empty() {
                ui.warning("No package with that name on the index");
                return;
            }
            let mut table = Table::new(["Package", "Latest", "Summary"]);
            for hit in hits {
                table.add_row([
                    hit.name.as_str(),
                    hit.version.as_str(),
                    hit.summary.as_deref().unwrap_or(""),
                ]);
            }
            ui.show_table(&table);
        }
        Response::PackageInfo(details) => show_package_info(details, ui, options, &theme),
        Response::Dependencies(deps) => show_dependencies(deps, ui, &theme),
        Response::Venvs(venvs) => {
            if venvs.is_empty() {
                ui.warning("No virtual environments found");
                return;
            }
            let mut table = Table::new(["Environment", "Interpreter", "Prompt"]);
            for venv in venvs {
                table.add_row([
                    venv.path.display().to_string(),
                    venv.python_path.display().to_string(),
                    venv.prompt.clone().unwrap_or_default(),
                ]);
            }
            ui.show_table(&table);
        }
        Response::ProjectFiles(files) => {
            if files.is_empty() {
                ui.warning("No dependency files found");
                return;
            }
            for file in files {
                ui.message(file);
            }
        }
        Response::Operation(report) => ui.success(&operation_summary(report)),
        Response::OperationState(state) => ui.message(match state {
            OperationState::Idle => "idle",
            OperationState::Running => "running",
        }),
        Response::CancelRequested(true) => ui.message("Cancellation requested"),
        Response::CancelRequested(false) => ui.message("Nothing to cancel"),
    }
}

fn theme() -> PipdeskTheme {
    if should_use_colors() {
        PipdeskTheme::new()
    } else {
        PipdeskTheme::plain()
    }
}

fn show_interpreters(found: &[Interpreter], ui: &mut dyn UserInterface) {
    if found.is_empty() {
        ui.warning("No Python interpreters found");
        ui.show_hint("Add directories to `extra_search_roots` in the config file.");
        return;
    }

    let mut table = Table::new(["Version", "Kind", "Path"]);
    for interpreter in found {
        table.add_row([
            interpreter.version.clone(),
            if interpreter.is_venv { "venv" } else { "system" }.to_string(),
            interpreter.path.display().to_string(),
        ]);
    }
    ui.show_header(&plural(found.len(), "interpreter"));
    ui.show_table(&table);
}

fn entry_kind(entry: &DirectoryEntry) -> &'static str {
    if entry.is_venv {
        "venv"
    } else if entry.is_dir {
        "dir"
    } else {
        "python"
    }
}

fn show_entries(entries: &[DirectoryEntry], ui: &mut dyn UserInterface) {
    if entries.is_empty() {
        ui.message("No folders or interpreters here");
        return;
    }
    let mut table = Table::new(["Kind", "Name"]);
    for entry in entries {
        table.add_row([entry_kind(entry), entry.name.as_str()]);
    }
    ui.show_table(&table);
}

fn show_package_info(
    details: &PackageDetails,
    ui: &mut dyn UserInterface,
    options: DisplayOptions,
    theme: &PipdeskTheme,
) {
    let meta = &details.metadata;
    ui.show_header(&format!("{} {}", meta.name, meta.version));
    if let Some(summary) = &meta.summary {
        ui.message(summary);
    }

    let fields = [
        ("Author", meta.author.as_deref()),
        ("License", meta.license.as_deref()),
        ("Home page", meta.home_page.as_deref()),
        ("Requires Python", meta.requires_python.as_deref()),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            ui.message(&format!(
                "{} {}",
                theme.highlight.apply_to(format!("{}:", label)),
                value
            ));
        }
    }

    let shown = options.release_limit.unwrap_or(details.releases.len());
    if !details.releases.is_empty() && shown > 0 {
        let mut releases: Vec<&str> = details
            .releases
            .iter()
            .take(shown)
            .map(String::as_str)
            .collect();
        if details.releases.len() > shown {
            releases.push("...");
        }
        ui.message(&format!(
            "{} {}",
            theme.highlight.apply_to("Releases:"),
            releases.join(", ")
        ));
    }
}

fn show_dependencies(
    deps: &[ReconciledDependency],
    ui: &mut dyn UserInterface,
    theme: &PipdeskTheme,
) {
    if deps.is_empty() {
        ui.warning("No dependencies declared");
        return;
    }

    let mut table = Table::new(["Package", "Required", "Installed", "Status", "Source"]);
    for dep in deps {
        table.add_row([
            dep.name.clone(),
            dep.version_spec.clone(),
            dep.installed_version.clone().unwrap_or_else(|| "-".into()),
            theme.format_dependency_status(dep.status),
            dep.source.clone(),
        ]);
    }
    ui.show_table(&table);

    let satisfied = deps.iter().filter(|d| d.status.is_satisfied()).count();
    if satisfied == deps.len() {
        ui.success(&format!("All {} dependencies satisfied", deps.len()));
    } else {
        ui.warning(&format!(
            "{} of {} dependencies satisfied",
            satisfied,
            deps.len()
        ));
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

/// "Installing" and friends, for spinners.
pub fn action_progressive(action: PipAction) -> &'static str {
    match action {
        PipAction::Install => "Installing",
        PipAction::Uninstall => "Uninstalling",
        PipAction::Upgrade => "Upgrading",
        PipAction::Downgrade => "Downgrading",
    }
}

fn action_past(action: PipAction) -> &'static str {
    match action {
        PipAction::Install => "Installed",
        PipAction::Uninstall => "Uninstalled",
        PipAction::Upgrade => "Upgraded",
        PipAction::Downgrade => "Downgraded",
    }
}

/// `Installed flask==3.0.0 in 2.1s`.
pub fn operation_summary(report: &OperationReport) -> String {
    let target = match &report.version {
        Some(version) => format!("{}=={}", report.package, version),
        None => report.package.clone(),
    };
    format!(
        "{} {} in {}",
        action_past(report.action),
        target,
        format_duration(Duration::from_millis(report.duration_ms))
    )
}

/// `850ms`, `2.1s`, `1.5m`.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", d.as_millis())
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}

//! Visual theme and styling.

use console::Style;

use crate::operations::OperationStatus;
use crate::project::DependencyStatus;

/// Styles used by the terminal output.
#[derive(Debug, Clone)]
pub struct PipdeskTheme {
    /// Success messages and installed dependencies (green).
    pub success: Style,
    /// Warnings and version mismatches (orange).
    pub warning: Style,
    /// Errors and missing dependencies (red bold).
    pub error: Style,
    /// Running operations and spinners (cyan).
    pub info: Style,
    /// Secondary text.
    pub dim: Style,
    /// Important text (bold).
    pub highlight: Style,
    /// Section headers (cyan bold).
    pub header: Style,
    /// Hints after errors.
    pub hint: Style,
    /// pip output echoed back to the user.
    pub log: Style,
}

impl Default for PipdeskTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl PipdeskTheme {
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            info: Style::new().cyan(),
            dim: Style::new().dim(),
            highlight: Style::new().bold(),
            header: Style::new().bold().cyan(),
            hint: Style::new().cyan().dim(),
            log: Style::new().dim(),
        }
    }

    /// A theme without colors (for non-TTY or `--no-color`).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            highlight: Style::new(),
            header: Style::new(),
            hint: Style::new(),
            log: Style::new(),
        }
    }

    pub fn format_success(&self, msg: &str) -> String {
        self.success.apply_to(format!("✓ {}", msg)).to_string()
    }

    pub fn format_warning(&self, msg: &str) -> String {
        self.warning.apply_to(format!("⚠ {}", msg)).to_string()
    }

    pub fn format_error(&self, msg: &str) -> String {
        self.error.apply_to(format!("✗ {}", msg)).to_string()
    }

    pub fn format_header(&self, title: &str) -> String {
        self.header.apply_to(title).to_string()
    }

    /// Dependency status with its color.
    pub fn format_dependency_status(&self, status: DependencyStatus) -> String {
        let style = match status {
            DependencyStatus::Installed => &self.success,
            DependencyStatus::VersionMismatch => &self.warning,
            DependencyStatus::Missing => &self.error,
        };
        style.apply_to(status.label()).to_string()
    }

    /// Operation outcome with its color.
    pub fn format_operation_status(&self, status: OperationStatus) -> String {
        match status {
            OperationStatus::Succeeded => self.success.apply_to("succeeded").to_string(),
            OperationStatus::Failed => self.error.apply_to("failed").to_string(),
            OperationStatus::Cancelled => self.warning.apply_to("cancelled").to_string(),
        }
    }
}

/// Whether colored output should be used.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    console::Term::stdout().is_term()
}

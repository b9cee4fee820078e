//! Progress spinners.

use indicatif::{ProgressBar, ProgressStyle};
use std::collections::VecDeque;
use std::time::Duration;

use crate::process::OutputLine;

use super::theme::PipdeskTheme;
use super::SpinnerHandle;

const MAX_LIVE_LINE: usize = 72;

/// A spinner for a long-running request.
pub struct ProgressSpinner {
    bar: ProgressBar,
    theme: PipdeskTheme,
}

impl ProgressSpinner {
    pub fn new(message: &str, theme: PipdeskTheme) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .template("{spinner:.cyan} {msg}")
        {
            bar.set_style(style);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar, theme }
    }

    /// A spinner that draws nothing.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            theme: PipdeskTheme::plain(),
        }
    }

    fn finish_with(&mut self, line: String) {
        if let Ok(style) = ProgressStyle::default_spinner().template("{msg}") {
            self.bar.set_style(style);
        }
        self.bar.finish_with_message(line);
    }
}

impl SpinnerHandle for ProgressSpinner {
    fn set_message(&mut self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }

    fn finish_success(&mut self, msg: &str) {
        let line = self.theme.format_success(msg);
        self.finish_with(line);
    }

    fn finish_error(&mut self, msg: &str) {
        let line = self.theme.format_error(msg);
        self.finish_with(line);
    }

    fn progress_bar(&self) -> Option<ProgressBar> {
        Some(self.bar.clone())
    }
}

/// Keeps the last `max_lines` pip lines under the spinner's message.
pub fn live_output(
    bar: ProgressBar,
    base_message: String,
    max_lines: usize,
    theme: PipdeskTheme,
) -> impl FnMut(&OutputLine) {
    let mut recent: VecDeque<String> = VecDeque::with_capacity(max_lines);

    move |line: &OutputLine| {
        let text = line.display_text();
        let text = text.trim_end();
        if text.is_empty() || max_lines == 0 {
            return;
        }

        let shown = if text.chars().count() > MAX_LIVE_LINE {
            let cut: String = text.chars().take(MAX_LIVE_LINE - 3).collect();
            format!("{}...", cut)
        } else {
            text.to_string()
        };

        if recent.len() == max_lines {
            recent.pop_front();
        }
        recent.push_back(shown);

        let mut msg = base_message.clone();
        for line in &recent {
            msg.push_str("\n  ");
            msg.push_str(&theme.log.apply_to(format!("» {}", line)).to_string());
        }
        bar.set_message(msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_spinner_finishes_quietly() {
        let mut spinner = ProgressSpinner::hidden();
        spinner.set_message("Installing flask");
        spinner.finish_success("Installed flask");
        assert!(spinner.progress_bar().unwrap().is_finished());
    }

    #[test]
    fn live_output_keeps_recent_lines() {
        let bar = ProgressBar::hidden();
        let mut on_line = live_output(bar.clone(), "Installing".into(), 2, PipdeskTheme::plain());

        on_line(&OutputLine::stdout("Collecting flask"));
        on_line(&OutputLine::stderr("WARNING: cache disabled"));
        assert!(bar.message().contains("» [stderr] WARNING: cache disabled"));

        on_line(&OutputLine::stdout("Successfully installed flask-3.0.0"));
        let msg = bar.message();
        assert!(msg.starts_with("Installing"));
        assert!(!msg.contains("Collecting flask"));
        assert!(msg.contains("Successfully installed"));
    }

    #[test]
    fn live_output_skips_blank_and_truncates() {
        let bar = ProgressBar::hidden();
        let mut on_line = live_output(bar.clone(), "Run".into(), 3, PipdeskTheme::plain());

        on_line(&OutputLine::stdout("   "));
        assert_eq!(bar.message(), "");

        on_line(&OutputLine::stdout("x".repeat(100)));
        let msg = bar.message();
        assert!(msg.ends_with("..."));
        assert!(!msg.contains(&"x".repeat(100)));
    }
}

//! Output verbosity.

use std::str::FromStr;

/// How much the CLI prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Echo every pip output line.
    Verbose,
    /// Spinners with a short live tail of pip output.
    #[default]
    Normal,
    /// Final status only.
    Quiet,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "verbose" => Ok(Self::Verbose),
            "normal" => Ok(Self::Normal),
            "quiet" => Ok(Self::Quiet),
            _ => Err(format!("unknown output mode: {}", s)),
        }
    }
}

impl OutputMode {
    /// Pick a mode from the `--verbose` / `--quiet` flags. Quiet wins.
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        match (verbose, quiet) {
            (_, true) => Self::Quiet,
            (true, false) => Self::Verbose,
            (false, false) => Self::Normal,
        }
    }

    /// Whether each pip line is printed as it arrives.
    pub fn shows_pip_output(&self) -> bool {
        matches!(self, Self::Verbose)
    }

    /// Whether spinners are drawn.
    pub fn shows_spinners(&self) -> bool {
        matches!(self, Self::Normal)
    }

    /// Whether informational messages are printed.
    pub fn shows_status(&self) -> bool {
        !matches!(self, Self::Quiet)
    }
}

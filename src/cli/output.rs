//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across both operations.

use console::style;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Output sink handed to the vault workflow.
///
/// Carries the `-q` setting explicitly instead of a process-wide flag.
/// Quiet mode drops progress lines and per-item diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    quiet: bool,
}

impl Reporter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// A reporter that prints nothing (library use and tests).
    pub fn silent() -> Self {
        Self { quiet: true }
    }

    pub fn info(&self, msg: &str) {
        if !self.quiet {
            info(msg);
        }
    }

    pub fn success(&self, msg: &str) {
        if !self.quiet {
            success(msg);
        }
    }

    pub fn warning(&self, msg: &str) {
        if !self.quiet {
            warning(msg);
        }
    }

    pub fn error(&self, msg: &str) {
        if !self.quiet {
            error(msg);
        }
    }
}

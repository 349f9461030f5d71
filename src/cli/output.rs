//! Styled terminal output for gatekeep
//!
//! User-facing messages go through [`Output`]; diagnostics go through
//! `tracing`. Errors are always shown, everything else respects `--quiet`.

use console::style;

/// Output handler for consistent CLI formatting
#[derive(Debug, Clone, Copy)]
pub struct Output {
    verbose: bool,
    quiet: bool,
}

impl Output {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {}", style("✔").green(), message);
        }
    }

    /// Print an error message, even in quiet mode
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✖").red(), message);
    }

    /// Only shown with `-v`
    pub fn verbose(&self, message: &str) {
        if self.verbose && !self.quiet {
            println!("{} {}", style("ℹ").dim(), style(message).dim());
        }
    }

    /// A command about to run (or that would run, under `--dry-run`)
    pub fn step(&self, step: &str) {
        if !self.quiet {
            println!("{} {}", style("❯").cyan(), step);
        }
    }

    /// Unstyled line, for text other tools may grep
    pub fn plain(&self, message: &str) {
        if !self.quiet {
            println!("{message}");
        }
    }

    pub fn header(&self, title: &str) {
        if !self.quiet {
            println!("\n{}", style(title).bold().underlined());
        }
    }

    pub fn key_value(&self, key: &str, value: &str) {
        if !self.quiet {
            println!("  {:<22} {}", style(key).dim(), value);
        }
    }

    pub fn list_item(&self, item: &str) {
        if !self.quiet {
            println!("    • {item}");
        }
    }

    /// Closing line of an aggregate run
    pub fn summary(&self, message: &str, success: bool) {
        if self.quiet {
            return;
        }
        if success {
            println!("{} {}", style("✔").green().bold(), style(message).green());
        } else {
            println!("{} {}", style("✖").red().bold(), style(message).red());
        }
    }
}

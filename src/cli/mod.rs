//! Command-line interface for gatekeep
//!
//! Each quality gate is a subcommand named the way CI scripts call it
//! (`lint`, `test_ci`, `coverage_erase`, ...). Gate commands exit with the
//! exit code of the tool they ran.

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod output;

pub use commands::config::{ConfigAction, ConfigArgs, ConfigFormat};
pub use commands::gate::HtmlArgs;
pub use output::Output;

use crate::config::GatekeepConfig;
use crate::gates::{Dispatcher, Gate, GateContext};
use crate::platform;

/// gatekeep - run code-quality gates with host-aware test concurrency
#[derive(Parser)]
#[command(name = "gatekeep", author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Run as if started in <DIR> instead of the current directory
    #[arg(short = 'C', long = "directory", value_name = "DIR", global = true)]
    pub directory: Option<PathBuf>,

    /// Configuration file, used instead of the user and repository files
    #[arg(long, value_name = "FILE", env = "GATEKEEP_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print the commands gates would run without running them
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run static analysis over the configured targets
    Lint,
    /// Check code style and line length
    Style,
    /// Run the spelling-only analysis pass
    Spell,
    /// Check source files carry the copyright header
    Copyright,
    /// Discover and run the full test suite
    Test,
    /// Run the test suite with host-derived worker concurrency
    #[command(name = "test_ci", alias = "test-ci")]
    TestCi,
    /// Run the test suite under coverage and print a report
    Coverage,
    /// Discard persisted coverage data
    #[command(name = "coverage_erase", alias = "coverage-erase")]
    CoverageErase,
    /// Build the HTML documentation
    Html(HtmlArgs),
    /// Run the documentation doctests
    Doctest,
    /// Remove generated artifacts (same as coverage_erase)
    Clean,
    /// Run spell, style, lint and copyright, reporting every failure
    #[command(name = "all_check", alias = "all-check")]
    AllCheck,
    /// Show detected host, resolved concurrency and targets
    Status,
    /// Configuration management
    Config(ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn run(self) -> Result<ExitCode> {
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)
                .with_context(|| format!("Cannot change directory to {}", dir.display()))?;
        }

        setup_logging(self.verbose, self.quiet);
        let output = Output::new(self.verbose > 0, self.quiet);

        let Some(command) = self.command else {
            Cli::command().print_help()?;
            return Ok(ExitCode::SUCCESS);
        };

        let config = GatekeepConfig::load_with_custom_config(self.config.as_deref())?;
        let dispatcher = Dispatcher::new(&output, self.dry_run);
        let run_gate =
            |gate| commands::gate::execute(gate, &config, &dispatcher, GateContext::default());

        let code = match command {
            Commands::Lint => run_gate(Gate::Lint).await?,
            Commands::Style => run_gate(Gate::Style).await?,
            Commands::Spell => run_gate(Gate::Spell).await?,
            Commands::Copyright => run_gate(Gate::Copyright).await?,
            Commands::Test => run_gate(Gate::Test).await?,
            Commands::TestCi => {
                let host = platform::probe();
                commands::gate::test_ci(&host, &config, &dispatcher, &output).await?
            }
            Commands::Coverage => run_gate(Gate::Coverage).await?,
            Commands::CoverageErase | Commands::Clean => run_gate(Gate::CoverageErase).await?,
            Commands::Html(args) => commands::gate::html(args, &config, &dispatcher).await?,
            Commands::Doctest => run_gate(Gate::Doctest).await?,
            Commands::AllCheck => commands::check::execute(&config, &dispatcher, &output).await?,
            Commands::Status => commands::status::execute(&config, &output)?,
            Commands::Config(args) => commands::config::execute(args, &config, &output)?,
        };

        Ok(exit_code(code))
    }
}

/// Narrow a tool's exit code to what the process can report
pub fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(narrow_exit_code(code))
}

fn narrow_exit_code(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match verbose {
            0 => tracing_subscriber::EnvFilter::new("warn"),
            1 => tracing_subscriber::EnvFilter::new("info"),
            2 => tracing_subscriber::EnvFilter::new("debug"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    // stdout belongs to the gate tools
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

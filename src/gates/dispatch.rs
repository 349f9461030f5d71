//! Spawning gate tools
//!
//! Gates run one at a time with inherited stdio. A failing gate never stops
//! the ones after it in an aggregate run; a gate killed by a signal does.

use super::Gate;
use crate::cli::Output;
use crate::config::ToolConfig;
use anyhow::Result;
use std::fmt;
use std::io;
use std::process::ExitStatus;
use tracing::{debug, info, warn};

/// Exit code reported when a gate's program is not on `PATH`
pub const EXIT_NOT_FOUND: i32 = 127;

/// Exit code reported when a gate's program exists but cannot be executed
pub const EXIT_NOT_EXECUTABLE: i32 = 126;

/// One fully assembled external invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl GateCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn from_tool(tool: &ToolConfig) -> Self {
        Self::new(&tool.program).args(&tool.args)
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn opt_arg(self, arg: Option<impl Into<String>>) -> Self {
        match arg {
            Some(arg) => self.arg(arg),
            None => self,
        }
    }
}

impl fmt::Display for GateCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{arg}'")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// How a gate's process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Exited(i32),
    /// Killed by a signal, carrying the signal number when known
    Terminated(Option<i32>),
}

impl GateOutcome {
    pub fn success(self) -> bool {
        self == GateOutcome::Exited(0)
    }

    /// Exit code to surface for this outcome, shell style for signals
    pub fn exit_code(self) -> i32 {
        match self {
            GateOutcome::Exited(code) => code,
            GateOutcome::Terminated(Some(signal)) => 128 + signal,
            GateOutcome::Terminated(None) => 1,
        }
    }

    fn from_status(status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => GateOutcome::Exited(code),
            None => GateOutcome::Terminated(termination_signal(status)),
        }
    }
}

#[cfg(unix)]
fn termination_signal(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn termination_signal(_status: ExitStatus) -> Option<i32> {
    None
}

/// Outcomes of an aggregate run, in execution order
#[derive(Debug, Default)]
pub struct RunSummary {
    outcomes: Vec<(Gate, GateOutcome)>,
}

impl RunSummary {
    pub fn outcomes(&self) -> &[(Gate, GateOutcome)] {
        &self.outcomes
    }

    pub fn failed(&self) -> impl Iterator<Item = Gate> + '_ {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| !outcome.success())
            .map(|(gate, _)| *gate)
    }

    /// Code of the first failing gate, or 0
    pub fn exit_code(&self) -> i32 {
        self.outcomes
            .iter()
            .map(|(_, outcome)| *outcome)
            .find(|outcome| !outcome.success())
            .map_or(0, GateOutcome::exit_code)
    }
}

/// Runs gate invocations sequentially
pub struct Dispatcher<'a> {
    output: &'a Output,
    dry_run: bool,
}

impl<'a> Dispatcher<'a> {
    pub fn new(output: &'a Output, dry_run: bool) -> Self {
        Self { output, dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Run one invocation and wait for it
    pub async fn run_command(&self, command: &GateCommand) -> Result<GateOutcome> {
        if self.dry_run {
            self.output.step(&command.to_string());
            return Ok(GateOutcome::Exited(0));
        }

        let program = match which::which(&command.program) {
            Ok(path) => path,
            Err(e) => {
                self.output
                    .error(&format!("{}: command not found ({e})", command.program));
                return Ok(GateOutcome::Exited(EXIT_NOT_FOUND));
            }
        };

        debug!("Spawning {command}");
        let status = match tokio::process::Command::new(&program)
            .args(&command.args)
            .status()
            .await
        {
            Ok(status) => status,
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                self.output
                    .error(&format!("{}: permission denied", program.display()));
                return Ok(GateOutcome::Exited(EXIT_NOT_EXECUTABLE));
            }
            Err(e) => {
                self.output
                    .error(&format!("{}: cannot execute ({e})", program.display()));
                return Ok(GateOutcome::Exited(EXIT_NOT_EXECUTABLE));
            }
        };

        let outcome = GateOutcome::from_status(status);
        debug!("{} finished: {outcome:?}", command.program);
        Ok(outcome)
    }

    /// Run a gate's invocations in order, stopping at the first failure
    pub async fn run_gate(&self, gate: Gate, commands: &[GateCommand]) -> Result<GateOutcome> {
        info!("Running {gate} gate");

        let mut outcome = GateOutcome::Exited(0);
        for command in commands {
            outcome = self.run_command(command).await?;
            if !outcome.success() {
                break;
            }
        }

        if !self.dry_run {
            match outcome {
                GateOutcome::Exited(0) => self.output.success(&format!("{gate} passed")),
                GateOutcome::Exited(code) => self
                    .output
                    .error(&format!("{gate} failed with exit code {code}")),
                GateOutcome::Terminated(_) => self.output.error(&format!("{gate} was terminated")),
            }
        }

        Ok(outcome)
    }

    /// Run every gate in `plan`; only a terminated gate stops the pipeline
    pub async fn run_all(&self, plan: &[(Gate, Vec<GateCommand>)]) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for (gate, commands) in plan {
            let outcome = self.run_gate(*gate, commands).await?;
            summary.outcomes.push((*gate, outcome));

            if let GateOutcome::Terminated(signal) = outcome {
                warn!("{gate} terminated by signal {signal:?}, stopping");
                break;
            }
        }

        Ok(summary)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn quiet() -> Output {
        Output::new(false, true)
    }

    fn touch(path: &std::path::Path) -> GateCommand {
        GateCommand::new("touch").arg(path.display().to_string())
    }

    #[test]
    fn test_display_quotes_whitespace() {
        let command = GateCommand::new("make")
            .args(["-C", "docs", "html"])
            .arg("SPHINXOPTS=-W -q");
        assert_eq!(command.to_string(), "make -C docs html 'SPHINXOPTS=-W -q'");
    }

    #[test]
    fn test_outcome_exit_codes() {
        assert_eq!(GateOutcome::Exited(0).exit_code(), 0);
        assert_eq!(GateOutcome::Exited(2).exit_code(), 2);
        assert_eq!(GateOutcome::Terminated(Some(15)).exit_code(), 143);
        assert_eq!(GateOutcome::Terminated(None).exit_code(), 1);
        assert!(!GateOutcome::Terminated(None).success());
    }

    #[tokio::test]
    async fn test_exit_code_is_passed_through() {
        let output = quiet();
        let dispatcher = Dispatcher::new(&output, false);

        let ok = dispatcher.run_command(&GateCommand::new("true")).await.unwrap();
        assert_eq!(ok, GateOutcome::Exited(0));

        let failed = dispatcher
            .run_command(&GateCommand::new("sh").args(["-c", "exit 3"]))
            .await
            .unwrap();
        assert_eq!(failed, GateOutcome::Exited(3));
    }

    #[tokio::test]
    async fn test_missing_program_is_127() {
        let output = quiet();
        let dispatcher = Dispatcher::new(&output, false);
        let outcome = dispatcher
            .run_command(&GateCommand::new("gatekeep-no-such-tool-42"))
            .await
            .unwrap();
        assert_eq!(outcome, GateOutcome::Exited(EXIT_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_dry_run_spawns_nothing() {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("ran");
        let output = quiet();
        let dispatcher = Dispatcher::new(&output, true);

        let outcome = dispatcher.run_command(&touch(&marker)).await.unwrap();
        assert!(outcome.success());
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn test_gate_stops_at_first_failing_step() {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("report");
        let output = quiet();
        let dispatcher = Dispatcher::new(&output, false);

        let outcome = dispatcher
            .run_gate(Gate::Coverage, &[GateCommand::new("false"), touch(&marker)])
            .await
            .unwrap();
        assert_eq!(outcome, GateOutcome::Exited(1));
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn test_run_all_continues_after_failure() {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("style-ran");
        let output = quiet();
        let dispatcher = Dispatcher::new(&output, false);

        let plan = vec![
            (Gate::Spell, vec![GateCommand::new("sh").args(["-c", "exit 4"])]),
            (Gate::Style, vec![touch(&marker)]),
            (Gate::Lint, vec![GateCommand::new("false")]),
        ];
        let summary = dispatcher.run_all(&plan).await.unwrap();

        assert!(marker.exists());
        assert_eq!(summary.outcomes().len(), 3);
        assert_eq!(summary.failed().collect::<Vec<_>>(), [Gate::Spell, Gate::Lint]);
        assert_eq!(summary.exit_code(), 4);
    }

    #[tokio::test]
    async fn test_run_all_stops_when_terminated() {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("lint-ran");
        let output = quiet();
        let dispatcher = Dispatcher::new(&output, false);

        let plan = vec![
            (Gate::Spell, vec![GateCommand::new("sh").args(["-c", "kill -TERM $$"])]),
            (Gate::Lint, vec![touch(&marker)]),
        ];
        let summary = dispatcher.run_all(&plan).await.unwrap();

        assert!(!marker.exists());
        assert_eq!(summary.outcomes(), [(Gate::Spell, GateOutcome::Terminated(Some(15)))]);
        assert_eq!(summary.exit_code(), 143);
    }

    #[tokio::test]
    async fn test_run_all_continues_after_exec_format_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let bogus = dir.path().join("bogus-tool");
        std::fs::write(&bogus, b"\x7fELF\0\0\0\0").unwrap();
        std::fs::set_permissions(&bogus, std::fs::Permissions::from_mode(0o755)).unwrap();
        let marker = dir.path().join("style-ran");
        let output = quiet();
        let dispatcher = Dispatcher::new(&output, false);

        let plan = vec![
            (Gate::Spell, vec![GateCommand::new(bogus.display().to_string())]),
            (Gate::Style, vec![touch(&marker)]),
        ];
        let summary = dispatcher.run_all(&plan).await.unwrap();

        assert!(marker.exists());
        assert_eq!(
            summary.outcomes(),
            [
                (Gate::Spell, GateOutcome::Exited(EXIT_NOT_EXECUTABLE)),
                (Gate::Style, GateOutcome::Exited(0)),
            ]
        );
        assert_eq!(summary.exit_code(), EXIT_NOT_EXECUTABLE);
    }

    #[tokio::test]
    async fn test_all_passing_summary_is_zero() {
        let output = quiet();
        let dispatcher = Dispatcher::new(&output, false);
        let plan = vec![
            (Gate::Spell, vec![GateCommand::new("true")]),
            (Gate::Style, vec![GateCommand::new("true")]),
        ];
        let summary = dispatcher.run_all(&plan).await.unwrap();
        assert_eq!(summary.exit_code(), 0);
        assert_eq!(summary.failed().count(), 0);
    }
}

//! Quality gates
//!
//! Each gate is one external tool run over the configured targets. This
//! module turns a [`Gate`] plus configuration into concrete
//! [`GateCommand`]s; [`Dispatcher`] runs them.
//!
//! ```text
//! gate            │ targets │ concurrency
//! ────────────────┼─────────┼────────────
//! lint            │   yes   │
//! style           │   yes   │
//! spell           │   yes   │
//! copyright       │         │
//! test            │         │
//! test_ci         │         │    yes
//! coverage        │   yes   │
//! coverage_erase  │         │
//! html            │         │
//! doctest         │         │
//! ```

mod dispatch;
mod targets;

pub use dispatch::{Dispatcher, GateCommand, GateOutcome, RunSummary};
pub use targets::TargetSet;

use crate::config::GatekeepConfig;
use crate::parallel::ConcurrencyLevel;
use crate::platform::HostProfile;
use std::fmt;

/// Option the test runner takes its worker count from
pub const CONCURRENCY_FLAG: &str = "--concurrency";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gate {
    Lint,
    Style,
    Spell,
    Copyright,
    Test,
    TestCi,
    Coverage,
    CoverageErase,
    Html,
    Doctest,
}

impl Gate {
    /// Gates run by `all_check`, in order
    pub const ALL_CHECK: [Gate; 4] = [Gate::Spell, Gate::Style, Gate::Lint, Gate::Copyright];

    pub fn name(self) -> &'static str {
        match self {
            Gate::Lint => "lint",
            Gate::Style => "style",
            Gate::Spell => "spell",
            Gate::Copyright => "copyright",
            Gate::Test => "test",
            Gate::TestCi => "test_ci",
            Gate::Coverage => "coverage",
            Gate::CoverageErase => "coverage_erase",
            Gate::Html => "html",
            Gate::Doctest => "doctest",
        }
    }

    /// Whether the resolved concurrency is passed to this gate's tool
    pub fn uses_concurrency(self) -> bool {
        matches!(self, Gate::TestCi)
    }

    /// Whether this gate runs over the target set
    pub fn uses_targets(self) -> bool {
        matches!(self, Gate::Lint | Gate::Style | Gate::Spell | Gate::Coverage)
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A gate bound to the targets it runs over
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateSpec {
    pub gate: Gate,
    pub target_paths: Vec<String>,
    pub uses_concurrency: bool,
}

/// Values supplied per invocation rather than by configuration
#[derive(Debug, Clone, Default)]
pub struct GateContext {
    pub concurrency: ConcurrencyLevel,

    /// Extra options for the documentation build (`SPHINXOPTS`)
    pub docs_options: Option<String>,
}

/// Builds gate specs and their invocations from configuration
pub struct GatePlanner<'a> {
    config: &'a GatekeepConfig,
    targets: TargetSet,
}

impl<'a> GatePlanner<'a> {
    pub fn new(config: &'a GatekeepConfig) -> Self {
        Self {
            config,
            targets: TargetSet::from_config(&config.targets),
        }
    }

    pub fn targets(&self) -> &TargetSet {
        &self.targets
    }

    pub fn spec(&self, gate: Gate) -> GateSpec {
        let target_paths = if gate.uses_targets() {
            self.targets.paths().to_vec()
        } else {
            Vec::new()
        };

        GateSpec {
            gate,
            target_paths,
            uses_concurrency: gate.uses_concurrency(),
        }
    }

    /// External invocations for `spec`, in the order they must run
    pub fn commands(&self, spec: &GateSpec, context: &GateContext) -> Vec<GateCommand> {
        let config = self.config;
        let exclude = self.targets.exclude();
        let targets = &spec.target_paths;

        let mut commands = match spec.gate {
            Gate::Lint => vec![
                GateCommand::new(&config.lint.program)
                    .args(&config.lint.args)
                    .opt_arg(exclude.map(|dir| format!("--ignore={dir}")))
                    .args(targets),
            ],
            Gate::Style => vec![
                GateCommand::new(&config.style.program)
                    .arg(format!("--max-line-length={}", config.style.max_line_length))
                    .opt_arg(exclude.map(|dir| format!("--exclude={dir}")))
                    .args(targets),
            ],
            Gate::Spell => vec![
                GateCommand::new(&config.spell.program)
                    .args(&config.spell.args)
                    .arg("--disable=all")
                    .arg("--enable=spelling")
                    .arg(format!("--spelling-dict={}", config.spell.dictionary))
                    .arg(format!(
                        "--spelling-private-dict-file={}",
                        config.spell.private_dict
                    ))
                    .opt_arg(exclude.map(|dir| format!("--ignore={dir}")))
                    .args(targets),
            ],
            Gate::Copyright => vec![GateCommand::from_tool(&config.copyright)],
            Gate::Test => vec![GateCommand::from_tool(&config.test)],
            Gate::TestCi => vec![GateCommand::from_tool(&config.test_ci)],
            Gate::Coverage => vec![
                GateCommand::new(&config.coverage.program)
                    .arg("run")
                    .arg("--source")
                    .arg(self.targets.comma_joined())
                    .args(
                        exclude
                            .into_iter()
                            .flat_map(|dir| ["--omit".to_string(), format!("*/{dir}/*")]),
                    )
                    .args(&config.coverage.test_args),
                GateCommand::new(&config.coverage.program).arg("report"),
            ],
            Gate::CoverageErase => {
                vec![GateCommand::new(&config.coverage.erase_program).arg("erase")]
            }
            Gate::Html => vec![
                GateCommand::new(&config.docs.program)
                    .arg("-C")
                    .arg(config.docs.dir.display().to_string())
                    .arg("html")
                    .opt_arg(
                        context
                            .docs_options
                            .as_ref()
                            .map(|opts| format!("SPHINXOPTS={opts}")),
                    ),
            ],
            Gate::Doctest => vec![
                GateCommand::new(&config.docs.program)
                    .arg("-C")
                    .arg(config.docs.dir.display().to_string())
                    .arg("doctest"),
            ],
        };

        if spec.uses_concurrency {
            if let Some(last) = commands.pop() {
                commands.push(
                    last.arg(CONCURRENCY_FLAG)
                        .arg(context.concurrency.to_string()),
                );
            }
        }

        commands
    }

    /// Spec and invocations for a gate in one step
    pub fn plan(&self, gate: Gate, context: &GateContext) -> Vec<GateCommand> {
        self.commands(&self.spec(gate), context)
    }
}

/// Diagnostic line printed before the CI test run
pub fn ci_banner(host: &HostProfile) -> String {
    format!(
        "Detected {} CPUs running with {} workers",
        host.raw_processor_count,
        host.concurrency()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::resolve;
    use crate::platform::OsFamily;

    fn config() -> GatekeepConfig {
        GatekeepConfig::defaults().unwrap()
    }

    fn render(commands: &[GateCommand]) -> Vec<String> {
        commands.iter().map(ToString::to_string).collect()
    }

    const TARGETS: &str = "qiskit/aqua qiskit/chemistry qiskit/finance qiskit/ml qiskit/optimization test tools";

    #[test]
    fn test_lint_command() {
        let config = config();
        let planner = GatePlanner::new(&config);
        let commands = planner.plan(Gate::Lint, &GateContext::default());
        assert_eq!(
            render(&commands),
            vec![format!("pylint -rn --ignore=gauopen {TARGETS}")]
        );
    }

    #[test]
    fn test_style_command() {
        let config = config();
        let commands = GatePlanner::new(&config).plan(Gate::Style, &GateContext::default());
        assert_eq!(
            render(&commands),
            vec![format!(
                "pycodestyle --max-line-length=100 --exclude=gauopen {TARGETS}"
            )]
        );
    }

    #[test]
    fn test_spell_command() {
        let config = config();
        let commands = GatePlanner::new(&config).plan(Gate::Spell, &GateContext::default());
        assert_eq!(
            render(&commands),
            vec![format!(
                "pylint -rn --disable=all --enable=spelling --spelling-dict=en_US \
                 --spelling-private-dict-file=.pylintdict --ignore=gauopen {TARGETS}"
            )]
        );
    }

    #[test]
    fn test_exclusion_is_dropped_when_blank() {
        let mut config = config();
        config.targets.exclude.clear();
        let planner = GatePlanner::new(&config);
        let lint = planner.plan(Gate::Lint, &GateContext::default());
        assert!(!lint[0].args.iter().any(|a| a.starts_with("--ignore")));
        let coverage = planner.plan(Gate::Coverage, &GateContext::default());
        assert!(!coverage[0].args.iter().any(|a| a == "--omit"));
    }

    #[test]
    fn test_only_test_ci_gets_concurrency() {
        let config = config();
        let planner = GatePlanner::new(&config);
        let context = GateContext {
            concurrency: resolve(16),
            docs_options: None,
        };

        let test_ci = planner.plan(Gate::TestCi, &context);
        assert_eq!(render(&test_ci), vec!["stestr run --concurrency 8"]);

        for gate in [
            Gate::Lint,
            Gate::Style,
            Gate::Spell,
            Gate::Copyright,
            Gate::Test,
            Gate::Coverage,
            Gate::CoverageErase,
            Gate::Html,
            Gate::Doctest,
        ] {
            assert!(!planner.spec(gate).uses_concurrency);
            for command in planner.plan(gate, &context) {
                assert!(
                    !command.args.iter().any(|a| a == CONCURRENCY_FLAG),
                    "{gate} should not carry concurrency"
                );
            }
        }
    }

    #[test]
    fn test_zero_concurrency_is_still_forwarded() {
        let config = config();
        let commands =
            GatePlanner::new(&config).plan(Gate::TestCi, &GateContext::default());
        assert_eq!(render(&commands), vec!["stestr run --concurrency 0"]);
    }

    #[test]
    fn test_target_paths_only_for_target_gates() {
        let config = config();
        let planner = GatePlanner::new(&config);
        assert_eq!(planner.spec(Gate::Lint).target_paths, config.targets.paths);
        assert_eq!(planner.spec(Gate::Coverage).target_paths, config.targets.paths);
        assert!(planner.spec(Gate::Test).target_paths.is_empty());
        assert!(planner.spec(Gate::TestCi).target_paths.is_empty());
    }

    #[test]
    fn test_test_command() {
        let config = config();
        let commands = GatePlanner::new(&config).plan(Gate::Test, &GateContext::default());
        assert_eq!(
            render(&commands),
            vec!["python -m unittest discover -v test"]
        );
    }

    #[test]
    fn test_coverage_runs_then_reports() {
        let config = config();
        let commands =
            GatePlanner::new(&config).plan(Gate::Coverage, &GateContext::default());
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].program, "coverage3");
        assert_eq!(
            commands[0].args[..4],
            [
                "run",
                "--source",
                "qiskit/aqua,qiskit/chemistry,qiskit/finance,qiskit/ml,qiskit/optimization,test,tools",
                "--omit",
            ]
        );
        assert_eq!(commands[0].args[4], "*/gauopen/*");
        assert_eq!(render(&commands[1..]), vec!["coverage3 report"]);
    }

    #[test]
    fn test_coverage_erase_and_docs() {
        let config = config();
        let planner = GatePlanner::new(&config);
        assert_eq!(
            render(&planner.plan(Gate::CoverageErase, &GateContext::default())),
            vec!["coverage erase"]
        );
        assert_eq!(
            render(&planner.plan(Gate::Doctest, &GateContext::default())),
            vec!["make -C docs doctest"]
        );
    }

    #[test]
    fn test_html_forwards_options() {
        let config = config();
        let planner = GatePlanner::new(&config);
        assert_eq!(
            render(&planner.plan(Gate::Html, &GateContext::default())),
            vec!["make -C docs html"]
        );

        let context = GateContext {
            docs_options: Some("-W --keep-going".to_string()),
            ..GateContext::default()
        };
        let commands = planner.plan(Gate::Html, &context);
        assert_eq!(
            commands[0].args.last().unwrap(),
            "SPHINXOPTS=-W --keep-going"
        );
    }

    #[test]
    fn test_all_check_order() {
        let names: Vec<_> = Gate::ALL_CHECK.iter().map(|g| g.name()).collect();
        assert_eq!(names, ["spell", "style", "lint", "copyright"]);
    }

    #[test]
    fn test_ci_banner() {
        let linux = HostProfile::new(OsFamily::Linux, 16);
        assert_eq!(ci_banner(&linux), "Detected 16 CPUs running with 8 workers");

        let darwin = HostProfile::new(OsFamily::Darwin, 2);
        assert_eq!(ci_banner(&darwin), "Detected 2 CPUs running with 2 workers");
    }
}

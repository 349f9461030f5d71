//! Single-gate commands

use anyhow::Result;
use clap::Args;

use crate::cli::Output;
use crate::config::GatekeepConfig;
use crate::gates::{Dispatcher, Gate, GateContext, GatePlanner, ci_banner};
use crate::platform::HostProfile;

#[derive(Args, Clone, Debug, Default)]
pub struct HtmlArgs {
    /// Options forwarded to the documentation build as SPHINXOPTS
    #[arg(long, value_name = "OPTIONS", env = "SPHINXOPTS", allow_hyphen_values = true)]
    pub opts: Option<String>,
}

/// Run one gate and return its tool's exit code
pub async fn execute(
    gate: Gate,
    config: &GatekeepConfig,
    dispatcher: &Dispatcher<'_>,
    context: GateContext,
) -> Result<i32> {
    let commands = GatePlanner::new(config).plan(gate, &context);
    let outcome = dispatcher.run_gate(gate, &commands).await?;
    Ok(outcome.exit_code())
}

/// Announce the worker count for `host`, then run the CI test gate
pub async fn test_ci(
    host: &HostProfile,
    config: &GatekeepConfig,
    dispatcher: &Dispatcher<'_>,
    output: &Output,
) -> Result<i32> {
    output.plain(&ci_banner(host));

    let context = GateContext {
        concurrency: host.concurrency(),
        ..GateContext::default()
    };
    execute(Gate::TestCi, config, dispatcher, context).await
}

pub async fn html(
    args: HtmlArgs,
    config: &GatekeepConfig,
    dispatcher: &Dispatcher<'_>,
) -> Result<i32> {
    let context = GateContext {
        docs_options: args.opts,
        ..GateContext::default()
    };
    execute(Gate::Html, config, dispatcher, context).await
}

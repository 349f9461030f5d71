//! `all_check`: every static check in one pass

use anyhow::Result;

use crate::cli::Output;
use crate::config::GatekeepConfig;
use crate::gates::{Dispatcher, Gate, GateContext, GatePlanner};

pub async fn execute(
    config: &GatekeepConfig,
    dispatcher: &Dispatcher<'_>,
    output: &Output,
) -> Result<i32> {
    let planner = GatePlanner::new(config);
    let context = GateContext::default();
    let plan: Vec<_> = Gate::ALL_CHECK
        .iter()
        .map(|&gate| (gate, planner.plan(gate, &context)))
        .collect();

    let summary = dispatcher.run_all(&plan).await?;
    if dispatcher.is_dry_run() {
        return Ok(0);
    }

    let failed: Vec<_> = summary.failed().map(Gate::name).collect();
    if failed.is_empty() {
        output.summary(
            &format!("All {} checks passed", summary.outcomes().len()),
            true,
        );
    } else {
        output.summary(&format!("Failed checks: {}", failed.join(", ")), false);
    }

    Ok(summary.exit_code())
}

//! Show what gatekeep detected and how it will run

use anyhow::Result;

use crate::cli::Output;
use crate::config::GatekeepConfig;
use crate::gates::TargetSet;
use crate::platform::{self, DARWIN_PROCESSOR_COUNT, OsFamily};

pub fn execute(config: &GatekeepConfig, output: &Output) -> Result<i32> {
    let host = platform::probe();
    let concurrency = host.concurrency();

    output.header("Host");
    output.key_value("OS family", &host.os_family.to_string());
    output.key_value("Probed processors", &host.raw_processor_count.to_string());
    output.key_value("Hardware threads", &num_cpus::get().to_string());
    let workers = if concurrency.is_unset() {
        "runner default".to_string()
    } else {
        concurrency.to_string()
    };
    output.key_value("test_ci workers", &workers);

    if host.os_family == OsFamily::Darwin {
        output.verbose(&format!(
            "Darwin hosts always report {DARWIN_PROCESSOR_COUNT} processors"
        ));
    }

    let targets = TargetSet::from_config(&config.targets);
    output.header("Targets");
    for path in targets.paths() {
        output.list_item(path);
    }
    output.key_value("Excluded", targets.exclude().unwrap_or("none"));

    Ok(0)
}

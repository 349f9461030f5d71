//! Host platform probing
//!
//! Classifies the operating system and counts the processors the test
//! runner may use. Probing never fails: anything unreadable degrades to
//! zero processors, which resolves to "no explicit concurrency".
//!
//! Processor counts by family:
//!
//! - **Linux**: one per `processor` entry in `/proc/cpuinfo`
//! - **Darwin**: always [`DARWIN_PROCESSOR_COUNT`], the hardware is not queried
//! - **Other**: zero

mod source;

pub use source::{CPUINFO_PATH, LiveSystem, SystemSource, kernel_name_for_target};

use crate::parallel::{ConcurrencyLevel, resolve};
use std::fmt;
use tracing::{debug, warn};

/// Processor count reported for every Darwin host
pub const DARWIN_PROCESSOR_COUNT: usize = 2;

/// Operating system family, as far as gate concurrency cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsFamily {
    Linux,
    Darwin,
    Other,
}

impl OsFamily {
    /// Classify a kernel name as printed by `uname -s`.
    ///
    /// Only the exact names `Linux` and `Darwin` are recognised.
    pub fn classify(kernel_name: &str) -> Self {
        match kernel_name.trim() {
            "Linux" => OsFamily::Linux,
            "Darwin" => OsFamily::Darwin,
            _ => OsFamily::Other,
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OsFamily::Linux => "Linux",
            OsFamily::Darwin => "Darwin",
            OsFamily::Other => "Other",
        };
        f.write_str(name)
    }
}

/// What the prober learned about the host. Built once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostProfile {
    pub os_family: OsFamily,
    pub raw_processor_count: usize,
}

impl HostProfile {
    pub fn new(os_family: OsFamily, raw_processor_count: usize) -> Self {
        Self {
            os_family,
            raw_processor_count,
        }
    }

    /// Worker count for the test runner on this host
    pub fn concurrency(&self) -> ConcurrencyLevel {
        resolve(self.raw_processor_count)
    }
}

/// Probe the live host.
pub fn probe() -> HostProfile {
    probe_with(&LiveSystem)
}

/// Probe using an explicit source of host facts.
pub fn probe_with<S: SystemSource + ?Sized>(source: &S) -> HostProfile {
    let os_family = source
        .kernel_name()
        .map(|name| OsFamily::classify(&name))
        .unwrap_or(OsFamily::Other);

    let raw_processor_count = match os_family {
        OsFamily::Linux => match source.cpuinfo() {
            Ok(cpuinfo) => count_processors(&cpuinfo),
            Err(e) => {
                warn!("Cannot read {CPUINFO_PATH}, assuming 0 processors: {e}");
                0
            }
        },
        OsFamily::Darwin => DARWIN_PROCESSOR_COUNT,
        OsFamily::Other => 0,
    };

    debug!("Probed host: {os_family} with {raw_processor_count} processors");
    HostProfile::new(os_family, raw_processor_count)
}

/// Count logical CPU entries: lines that begin with `processor`.
pub fn count_processors(cpuinfo: &str) -> usize {
    cpuinfo
        .lines()
        .filter(|line| line.starts_with("processor"))
        .count()
}

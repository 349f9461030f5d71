//! # gatekeep - code-quality gates with host-aware test concurrency
//!
//! gatekeep runs a fixed set of quality gates (lint, style, spelling,
//! copyright headers, tests, coverage, documentation) over a configured,
//! ordered set of module roots. The tools themselves are external programs;
//! gatekeep assembles their arguments and reports their exit codes.
//!
//! The CI test gate additionally gets a worker count derived from the host:
//!
//! ```rust
//! use gatekeep::platform::{HostProfile, OsFamily};
//!
//! let host = HostProfile::new(OsFamily::Linux, 16);
//! assert_eq!(host.concurrency().get(), 8);
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! # Run every static check, continuing past failures
//! gatekeep all_check
//!
//! # Run the suite with host-derived concurrency
//! gatekeep test_ci
//!
//! # See what would run
//! gatekeep --dry-run coverage
//! ```
//!
//! ## Configuration
//!
//! ```toml
//! # gatekeep.toml
//! [targets]
//! paths = ["src/pkg", "test"]
//! exclude = "generated"
//!
//! [style]
//! program = "pycodestyle"
//! max_line_length = 100
//! ```

pub mod cli;
pub mod config;
pub mod gates;
pub mod parallel;
pub mod platform;

pub use cli::{Cli, Output};
pub use config::GatekeepConfig;
pub use parallel::{ConcurrencyLevel, resolve};
pub use platform::{HostProfile, OsFamily, probe};

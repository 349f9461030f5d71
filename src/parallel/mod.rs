//! Test-runner concurrency resolution
//!
//! The orchestrator never runs workers itself. It only decides how many the
//! external test runner should be told to use, based on the processor count
//! reported by [`crate::platform::probe`].
//!
//! # Rule
//!
//! ```text
//! processors │ workers
//! ───────────┼─────────────────────────────
//!      0     │ 0   (no explicit override)
//!      1     │ 1
//!      2     │ 2
//!      3     │ 3
//!      N     │ N / 2, halves round up
//! ```
//!
//! Small counts pass through untouched; anything larger is halved to leave
//! headroom for the rest of the host.
//!
//! ```rust
//! use gatekeep::parallel::resolve;
//!
//! assert_eq!(resolve(3).get(), 3);
//! assert_eq!(resolve(16).get(), 8);
//! assert_eq!(resolve(5).get(), 3);
//! ```

use std::fmt;

/// Number of workers handed to the test runner.
///
/// Zero means "no explicit concurrency": the runner picks its own default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConcurrencyLevel(usize);

impl ConcurrencyLevel {
    pub const fn get(self) -> usize {
        self.0
    }

    /// True when the runner should fall back to its own worker count
    pub const fn is_unset(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ConcurrencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Map a raw processor count to the worker count for the test runner.
///
/// Arms are evaluated top to bottom. Total over `usize` and free of hidden
/// state, so the same input always yields the same level.
pub fn resolve(raw_processor_count: usize) -> ConcurrencyLevel {
    let workers = match raw_processor_count {
        0 => 0,
        1 => 1,
        2 => 2,
        3 => 3,
        // n / 2 rounded half away from zero; for positive n that is the ceiling
        n => n.div_ceil(2),
    };
    ConcurrencyLevel(workers)
}

#![warn(missing_docs)]
//! # PaceBench
//!
//! Microbenchmark execution harness for Rust:
//! - **Streaming statistics**: single-pass, constant-memory accumulation of
//!   mean/variance/skewness/kurtosis/min/max with a lossless merge
//! - **Auto-tuned scaling**: iteration counts grow until a run exceeds the
//!   timer's resolution floor, so fast bodies stay measurable
//! - **Fixture lifecycle**: set_up/on_start/body/on_end/tear_down hooks with
//!   teardown cost guaranteed outside the timed window
//! - **Baseline-relative metrics**: every group designates a baseline;
//!   sibling experiments report ratios against it per problem-space point
//! - **Panic containment**: a panicking benchmark body fails its point and
//!   the sweep continues
//!
//! ## Quick Start
//!
//! ```ignore
//! use pacebench::prelude::*;
//!
//! struct Loop;
//! impl Fixture for Loop {
//!     fn body(&mut self, _value: &ExperimentValue) {
//!         let _ = do_not_optimize_call(|| (0..1000u64).sum::<u64>());
//!     }
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     {
//!         let mut registry = Registry::global().lock().unwrap();
//!         registry.register_baseline("sum", "loop", Default::default(), || {
//!             Box::new(Loop)
//!         })?;
//!     }
//!     pacebench::run()
//! }
//! ```

// Re-export the measurement core
pub use pacebench_core::{
    do_not_optimize_away, do_not_optimize_call, run_threaded, run_timed, timer, Benchmark,
    Experiment, ExperimentOptions, ExperimentResult, ExperimentValue, Fixture, FixtureFactory,
    PointRecord, Registry, RegistryError, Runner, ThreadedFixture, ThreadedFixtureFactory, Timer,
    DEFAULT_PROBLEM_VALUE,
};

// Re-export statistics
pub use pacebench_stats::{StatValue, StreamingStats, DEFAULT_SAMPLE_COUNT};

// Re-export the executor and CLI entry
pub use pacebench_cli::{run, run_with, Cli, Executor, ExecutorError, RunSummary};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        do_not_optimize_away, do_not_optimize_call, Executor, ExperimentOptions, ExperimentValue,
        Fixture, Registry, StreamingStats, ThreadedFixture,
    };
}

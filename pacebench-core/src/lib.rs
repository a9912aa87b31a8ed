#![warn(missing_docs)]
//! PaceBench Core - Measurement Runtime
//!
//! This crate provides the measurement machinery for benchmarks:
//! - Monotonic microsecond timing with a cached clock-resolution probe
//! - Optimization barrier so synthetic benchmark bodies are not elided
//! - `Fixture` lifecycle contract (set_up / on_start / body / on_end / tear_down)
//!   plus a barrier-synchronized threaded variant
//! - Experiment / result model with streaming statistics per problem-space point
//! - Mutex-guarded process-wide benchmark registry

mod experiment;
mod fixture;
mod optimize;
mod record;
mod registry;
pub mod timer;

pub use experiment::{
    Benchmark, Experiment, ExperimentOptions, ExperimentResult, DEFAULT_PROBLEM_VALUE,
};
pub use fixture::{
    run_threaded, run_timed, ExperimentValue, Fixture, FixtureFactory, Runner, ThreadedFixture,
    ThreadedFixtureFactory,
};
pub use optimize::{do_not_optimize_away, do_not_optimize_call};
pub use record::PointRecord;
pub use registry::{Registry, RegistryError};
pub use timer::Timer;

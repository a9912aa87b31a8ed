//! Fixture Lifecycle
//!
//! A fixture wraps one measured execution:
//! `set_up -> (on_start -> body x iterations -> on_end) -> tear_down`.
//!
//! The timing bracket opens immediately before `on_start` and closes
//! immediately after `on_end`; `set_up` and `tear_down` run outside it, so
//! anything that must not count toward the measurement belongs there.
//!
//! The thread-parallel execution strategy is a separate trait selected by
//! configuration (an experiment's `threads` field), not a deeper layer of
//! the same lifecycle.

use crate::timer::Timer;
use std::sync::{Arc, Barrier};

/// One point of a parameterized problem-space sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExperimentValue {
    /// Independent variable (e.g. array size).
    pub value: i64,
    /// Benchmark body invocations per timing sample. 0 = auto-tune.
    pub iterations: u64,
}

impl ExperimentValue {
    /// Point with auto-tuned iterations.
    pub fn new(value: i64) -> Self {
        Self {
            value,
            iterations: 0,
        }
    }

    /// Point with a pinned per-point iteration count.
    pub fn with_iterations(value: i64, iterations: u64) -> Self {
        Self { value, iterations }
    }
}

/// Polymorphic benchmark lifecycle. All hooks except `body` default to
/// no-ops.
pub trait Fixture {
    /// Problem-space points to sweep. Empty = a single default point.
    fn experiment_values(&self) -> Vec<ExperimentValue> {
        Vec::new()
    }

    /// Runs once before the timed window. Not timed; panics here propagate
    /// into the same containment as the measured run.
    fn set_up(&mut self, _value: &ExperimentValue) {}

    /// First hook inside the timed window.
    fn on_start(&mut self, _value: &ExperimentValue) {}

    /// The measured operation. Invoked `iterations` times per sample.
    fn body(&mut self, value: &ExperimentValue);

    /// Last hook inside the timed window.
    fn on_end(&mut self) {}

    /// Runs strictly after the timer stops; cost is excluded from the sample.
    fn tear_down(&mut self) {}

    /// Fixed elapsed-microseconds constant returned instead of running the
    /// loop. Used by synthetic fixtures to unit test the harness itself;
    /// checked before anything else.
    fn hardcoded_measurement(&self) -> Option<u64> {
        None
    }

    /// Optional memory figure for this run, fed into the result's memory
    /// statistics when present.
    fn measured_memory(&self) -> Option<i64> {
        None
    }
}

/// Run the timed window of a fixture once and return elapsed microseconds.
///
/// The returned value is one sample for the statistics accumulator.
pub fn run_timed(fixture: &mut dyn Fixture, iterations: u64, value: &ExperimentValue) -> u64 {
    if let Some(micros) = fixture.hardcoded_measurement() {
        return micros;
    }

    let timer = Timer::start();
    fixture.on_start(value);
    for _ in 0..iterations {
        fixture.body(value);
    }
    fixture.on_end();
    timer.stop()
}

/// Thread-parallel lifecycle variant. The body runs concurrently on shared
/// fixture state, intentionally, to measure contention costs.
pub trait ThreadedFixture: Send + Sync {
    /// Problem-space points to sweep. Empty = a single default point.
    fn experiment_values(&self) -> Vec<ExperimentValue> {
        Vec::new()
    }

    /// Runs once before the timed window, with exclusive access.
    fn set_up(&mut self, _value: &ExperimentValue) {}

    /// The measured operation, shared across workers.
    fn body(&self, value: &ExperimentValue);

    /// Runs after all workers have joined, with exclusive access.
    fn tear_down(&mut self) {}
}

/// Run a threaded fixture once: `iterations / threads` calls per worker
/// (integer division, remainder dropped), all workers released together.
///
/// The timer brackets only the concurrent span - workers rendezvous on a
/// barrier before it starts, and every worker is joined before it stops.
pub fn run_threaded(
    fixture: &dyn ThreadedFixture,
    threads: u64,
    iterations: u64,
    value: &ExperimentValue,
) -> u64 {
    let threads = threads.max(1);
    let calls_per_thread = iterations / threads;
    let barrier = Barrier::new(threads as usize + 1);

    let mut elapsed = 0u64;
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    for _ in 0..calls_per_thread {
                        fixture.body(value);
                    }
                })
            })
            .collect();

        barrier.wait();
        let timer = Timer::start();
        let mut worker_panic = None;
        for handle in handles {
            if let Err(payload) = handle.join() {
                worker_panic.get_or_insert(payload);
            }
        }
        elapsed = timer.stop();

        // Surface a worker panic after every thread has joined, so the
        // outer containment sees it like any body panic.
        if let Some(payload) = worker_panic {
            std::panic::resume_unwind(payload);
        }
    });
    elapsed
}

/// Produces a fresh [`Fixture`] per invocation, enabling clean
/// set_up/tear_down cycles for every sample.
pub trait FixtureFactory: Send + Sync {
    /// Construct a fresh fixture instance.
    fn create(&self) -> Box<dyn Fixture>;
}

impl<F> FixtureFactory for F
where
    F: Fn() -> Box<dyn Fixture> + Send + Sync,
{
    fn create(&self) -> Box<dyn Fixture> {
        self()
    }
}

/// Produces a fresh [`ThreadedFixture`] per invocation.
pub trait ThreadedFixtureFactory: Send + Sync {
    /// Construct a fresh threaded fixture instance.
    fn create(&self) -> Box<dyn ThreadedFixture>;
}

impl<F> ThreadedFixtureFactory for F
where
    F: Fn() -> Box<dyn ThreadedFixture> + Send + Sync,
{
    fn create(&self) -> Box<dyn ThreadedFixture> {
        self()
    }
}

/// Execution strategy for an experiment, selected by configuration.
#[derive(Clone)]
pub enum Runner {
    /// Single-threaded tight loop.
    Sequential(Arc<dyn FixtureFactory>),
    /// Iterations spread across worker threads on shared fixture state.
    Threaded(Arc<dyn ThreadedFixtureFactory>),
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Runner::Sequential(_) => f.write_str("Runner::Sequential"),
            Runner::Threaded(_) => f.write_str("Runner::Threaded"),
        }
    }
}

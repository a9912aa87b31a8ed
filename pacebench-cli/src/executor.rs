//! Auto-Tuning Executor
//!
//! Runs registered experiments point by point on the invoking thread.
//! When an experiment does not pin a sample count, the executor probes the
//! body's cost and grows the iteration count geometrically until one run
//! exceeds twice the timer's resolution, keeping quantization error
//! bounded, then targets about a second of aggregate work and fixes the
//! sample count at [`pacebench_stats::DEFAULT_SAMPLE_COUNT`].
//!
//! A group's baseline always completes before its siblings; panics in user
//! code are contained per point when catching is enabled, and the sweep
//! continues.

use colored::Colorize;
use pacebench_core::{
    run_threaded, run_timed, timer, Benchmark, Experiment, ExperimentValue, PointRecord, Registry,
    Runner,
};
use pacebench_stats::DEFAULT_SAMPLE_COUNT;
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

/// Aggregate measurement time targeted per point, in microseconds.
pub const AGGREGATE_TARGET_US: u64 = 1_000_000;

/// Executor errors. These are the fatal configuration conditions; anything
/// recoverable is reported and absorbed so the sweep can continue.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExecutorError {
    /// The requested group is not registered.
    #[error("no benchmark group named '{0}' is registered")]
    UnknownGroup(String),

    /// The requested experiment is not part of the group.
    #[error("group '{group}' has no experiment named '{name}'")]
    UnknownExperiment {
        /// Group name.
        group: String,
        /// Requested experiment name.
        name: String,
    },

    /// The group has no baseline; every relative metric depends on one.
    #[error("group '{group}' has no baseline experiment; relative metrics cannot be computed")]
    MissingBaseline {
        /// Group name.
        group: String,
    },
}

/// Totals for one executor run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RunSummary {
    /// Problem-space points that produced a record.
    pub points: u64,
    /// Points whose measured run failed.
    pub failures: u64,
    /// Points skipped on a configuration defect.
    pub skipped: u64,
    /// Aggregate measured wall time in microseconds.
    pub total_run_time_us: u64,
}

enum PointStatus {
    Completed,
    Skipped(String),
    Failed(String),
}

/// Runs experiments and feeds completed-point records to registered
/// callbacks, exactly once per point, after its statistics are finalized
/// and before the next point begins.
pub struct Executor {
    catch_panics: bool,
    callbacks: Vec<Box<dyn FnMut(&PointRecord)>>,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Executor {
    /// Create an executor. `catch_panics = false` lets panics in benchmark
    /// bodies propagate, trading robustness for a native debugger break.
    pub fn new(catch_panics: bool) -> Self {
        Self {
            catch_panics,
            callbacks: Vec::new(),
        }
    }

    /// Register a completion callback, invoked once per completed point.
    pub fn on_point_complete(&mut self, callback: impl FnMut(&PointRecord) + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    /// Run every registered group, baseline first within each.
    pub fn run_all(&mut self, registry: &mut Registry) -> Result<RunSummary, ExecutorError> {
        let _ = timer::pin_to_cpu(0);
        let mut summary = RunSummary::default();
        for idx in 0..registry.groups().len() {
            self.run_benchmark(&mut registry.groups_mut()[idx], &mut summary)?;
        }
        Ok(summary)
    }

    /// Run one group by name.
    pub fn run_group(
        &mut self,
        registry: &mut Registry,
        group: &str,
    ) -> Result<RunSummary, ExecutorError> {
        let benchmark = registry
            .group_mut(group)
            .ok_or_else(|| ExecutorError::UnknownGroup(group.to_string()))?;
        let _ = timer::pin_to_cpu(0);
        let mut summary = RunSummary::default();
        self.run_benchmark(benchmark, &mut summary)?;
        Ok(summary)
    }

    /// Run one experiment standalone. If it is not the group's baseline and
    /// the baseline is incomplete, the baseline is run first - relative
    /// metrics require completed baseline statistics.
    pub fn run_experiment(
        &mut self,
        registry: &mut Registry,
        group: &str,
        experiment: &str,
    ) -> Result<RunSummary, ExecutorError> {
        let benchmark = registry
            .group_mut(group)
            .ok_or_else(|| ExecutorError::UnknownGroup(group.to_string()))?;
        let idx = benchmark
            .experiment_index(experiment)
            .ok_or_else(|| ExecutorError::UnknownExperiment {
                group: group.to_string(),
                name: experiment.to_string(),
            })?;

        let _ = timer::pin_to_cpu(0);
        let mut summary = RunSummary::default();

        if !benchmark.experiments()[idx].is_baseline() {
            let baseline_idx =
                benchmark
                    .baseline_index()
                    .ok_or_else(|| ExecutorError::MissingBaseline {
                        group: group.to_string(),
                    })?;
            if !benchmark.experiments()[baseline_idx].is_complete() {
                self.run_single(benchmark, baseline_idx, &mut summary);
            }
        }
        self.run_single(benchmark, idx, &mut summary);
        Ok(summary)
    }

    fn run_benchmark(
        &mut self,
        benchmark: &mut Benchmark,
        summary: &mut RunSummary,
    ) -> Result<(), ExecutorError> {
        let Some(baseline_idx) = benchmark.baseline_index() else {
            return Err(ExecutorError::MissingBaseline {
                group: benchmark.name().to_string(),
            });
        };

        self.run_single(benchmark, baseline_idx, summary);
        for idx in 0..benchmark.experiments().len() {
            if idx != baseline_idx {
                self.run_single(benchmark, idx, summary);
            }
        }
        Ok(())
    }

    fn run_single(&mut self, benchmark: &mut Benchmark, idx: usize, summary: &mut RunSummary) {
        benchmark.experiments_mut()[idx].ensure_default_point();
        let points = benchmark.experiments()[idx].results().len();
        for point in 0..points {
            self.run_point(benchmark, idx, point, summary);
        }
    }

    fn run_point(
        &mut self,
        benchmark: &mut Benchmark,
        idx: usize,
        point: usize,
        summary: &mut RunSummary,
    ) {
        let run_time_before = benchmark.experiments()[idx].total_run_time_us();
        let status = {
            let experiment = &mut benchmark.experiments_mut()[idx];
            Self::measure_point(experiment, point, self.catch_panics)
        };

        match status {
            PointStatus::Completed => {}
            PointStatus::Skipped(message) => {
                eprintln!(
                    "{}",
                    format!(
                        "pacebench: skipping '{}::{}': {message}",
                        benchmark.name(),
                        benchmark.experiments()[idx].name()
                    )
                    .yellow()
                );
                summary.skipped += 1;
                return;
            }
            PointStatus::Failed(message) => {
                let experiment = &mut benchmark.experiments_mut()[idx];
                let result = &mut experiment.results_mut()[point];
                result.set_failure(true);
                result.set_complete(false);
                eprintln!(
                    "{}",
                    format!(
                        "pacebench: experiment '{}::{}' failed: {message}",
                        benchmark.name(),
                        benchmark.experiments()[idx].name()
                    )
                    .red()
                );
            }
        }

        let experiment = &benchmark.experiments()[idx];
        let record = PointRecord::from_result(benchmark, experiment, &experiment.results()[point]);
        summary.points += 1;
        if record.failure {
            summary.failures += 1;
        }
        summary.total_run_time_us = summary
            .total_run_time_us
            .saturating_add(experiment.total_run_time_us() - run_time_before);

        for callback in &mut self.callbacks {
            callback(&record);
        }
    }

    fn measure_point(experiment: &mut Experiment, point: usize, catch: bool) -> PointStatus {
        if catch {
            match panic::catch_unwind(AssertUnwindSafe(|| Self::collect_point(experiment, point))) {
                Ok(status) => status,
                Err(payload) => PointStatus::Failed(panic_message(payload)),
            }
        } else {
            Self::collect_point(experiment, point)
        }
    }

    fn collect_point(experiment: &mut Experiment, point: usize) -> PointStatus {
        let value = *experiment.results()[point].value();
        let threads = experiment.threads();

        let (samples, iterations) = if experiment.samples() > 0 {
            let iterations = if value.iterations > 0 {
                value.iterations
            } else {
                experiment.iterations().max(1)
            };
            (experiment.samples(), iterations)
        } else {
            tune(experiment.runner(), threads, &value)
        };

        // Should not occur after tuning; skip the point, sweep continues.
        if samples == 0 {
            return PointStatus::Skipped("resolved sample count is zero".to_string());
        }

        experiment.set_samples(samples);
        experiment.set_iterations(iterations);
        experiment.results_mut()[point].set_iterations(iterations);

        for _ in 0..samples {
            let (elapsed, memory) = measure_once(experiment.runner(), threads, iterations, &value);
            let result = &mut experiment.results_mut()[point];
            result.time_stats_mut().add_sample(elapsed as i64);
            if let Some(figure) = memory {
                result.memory_stats_mut().add_sample(figure);
            }
            experiment.add_run_time_us(elapsed);
        }

        let result = &mut experiment.results_mut()[point];
        result.set_failure(false);
        result.set_complete(true);
        PointStatus::Completed
    }
}

/// Probe the body's cost and resolve `(samples, iterations)` for one point.
///
/// Grows iterations geometrically from 1 until a run takes at least twice
/// the timer's resolution, then bumps the count toward
/// [`AGGREGATE_TARGET_US`] of aggregate work. The search is unbounded by
/// design; it terminates for any body with positive cost.
fn tune(runner: &Runner, threads: u64, value: &ExperimentValue) -> (u64, u64) {
    let min_test_time_us = 2.0 * timer::resolution_micros(true);

    let mut iterations: u64 = 1;
    let mut elapsed = measure_once(runner, threads, iterations, value).0;
    while (elapsed as f64) < min_test_time_us {
        iterations = iterations.saturating_mul(2);
        elapsed = measure_once(runner, threads, iterations, value).0;
    }

    let iterations = iterations.max(AGGREGATE_TARGET_US / elapsed.max(1));
    (DEFAULT_SAMPLE_COUNT, iterations)
}

/// One full fixture lifetime: fresh instance, set_up, timed run, tear_down.
fn measure_once(
    runner: &Runner,
    threads: u64,
    iterations: u64,
    value: &ExperimentValue,
) -> (u64, Option<i64>) {
    match runner {
        Runner::Sequential(factory) => {
            let mut fixture = factory.create();
            fixture.set_up(value);
            let elapsed = run_timed(fixture.as_mut(), iterations, value);
            let memory = fixture.measured_memory();
            fixture.tear_down();
            (elapsed, memory)
        }
        Runner::Threaded(factory) => {
            let mut fixture = factory.create();
            fixture.set_up(value);
            let elapsed = run_threaded(fixture.as_ref(), threads, iterations, value);
            fixture.tear_down();
            (elapsed, None)
        }
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

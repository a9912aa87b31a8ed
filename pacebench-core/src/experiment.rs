//! Experiment / Result Model
//!
//! An `Experiment` is one named benchmark variant inside a `Benchmark`
//! group, with its sample/iteration/thread configuration and one
//! `ExperimentResult` per problem-space point. Every group has exactly one
//! baseline experiment; relative metrics are ratios against the baseline's
//! result at the matching problem-space value.

use crate::fixture::{ExperimentValue, Runner};
use pacebench_stats::StreamingStats;

/// Reserved problem-space value for experiments that declare no sweep.
pub const DEFAULT_PROBLEM_VALUE: i64 = i64::MIN;

/// Measurements for one problem-space point.
#[derive(Debug, Clone)]
pub struct ExperimentResult {
    value: ExperimentValue,
    time_stats: StreamingStats<i64>,
    memory_stats: StreamingStats<i64>,
    complete: bool,
    failure: bool,
}

impl ExperimentResult {
    /// New, empty result for one point.
    pub fn new(value: ExperimentValue) -> Self {
        Self {
            value,
            time_stats: StreamingStats::new(),
            memory_stats: StreamingStats::new(),
            complete: false,
            failure: false,
        }
    }

    /// The problem-space point this result measures.
    pub fn value(&self) -> &ExperimentValue {
        &self.value
    }

    /// Overwrite the per-point iteration count (set by the auto-tuner).
    pub fn set_iterations(&mut self, iterations: u64) {
        self.value.iterations = iterations;
    }

    /// Elapsed-time statistics, one sample per timed run.
    pub fn time_stats(&self) -> &StreamingStats<i64> {
        &self.time_stats
    }

    /// Mutable elapsed-time statistics.
    pub fn time_stats_mut(&mut self) -> &mut StreamingStats<i64> {
        &mut self.time_stats
    }

    /// Memory statistics; empty unless the fixture reports memory figures.
    pub fn memory_stats(&self) -> &StreamingStats<i64> {
        &self.memory_stats
    }

    /// Mutable memory statistics.
    pub fn memory_stats_mut(&mut self) -> &mut StreamingStats<i64> {
        &mut self.memory_stats
    }

    /// Best-case microseconds per benchmark body call:
    /// `min(time) / iterations`. 0.0 when nothing has been measured.
    pub fn us_per_call(&self) -> f64 {
        if self.time_stats.is_empty() || self.value.iterations == 0 {
            return 0.0;
        }
        self.time_stats.min() as f64 / self.value.iterations as f64
    }

    /// Body calls per second derived from [`Self::us_per_call`].
    pub fn calls_per_sec(&self) -> f64 {
        let us = self.us_per_call();
        if us <= 0.0 { 0.0 } else { 1.0 / (us * 1e-6) }
    }

    /// Whether all samples for this point have been collected.
    pub fn complete(&self) -> bool {
        self.complete
    }

    /// Mark this point complete.
    pub fn set_complete(&mut self, complete: bool) {
        self.complete = complete;
    }

    /// Whether the measured run failed (panicking user code).
    pub fn failure(&self) -> bool {
        self.failure
    }

    /// Mark this point failed.
    pub fn set_failure(&mut self, failure: bool) {
        self.failure = failure;
    }
}

/// Configuration for one experiment.
#[derive(Debug, Clone, Copy)]
pub struct ExperimentOptions {
    /// Timing samples per point. 0 = auto-tune.
    pub samples: u64,
    /// Body calls per sample. 0 = auto-tune.
    pub iterations: u64,
    /// Worker threads for the threaded runner. 1 for ordinary experiments.
    pub threads: u64,
    /// Pass/fail threshold on the baseline ratio. <= 0 disables the check.
    pub baseline_target: f64,
}

impl Default for ExperimentOptions {
    fn default() -> Self {
        Self {
            samples: 0,
            iterations: 0,
            threads: 1,
            baseline_target: 0.0,
        }
    }
}

/// One named benchmark variant and its per-point results.
#[derive(Debug)]
pub struct Experiment {
    name: String,
    samples: u64,
    iterations: u64,
    threads: u64,
    is_baseline: bool,
    baseline_target: f64,
    runner: Runner,
    results: Vec<ExperimentResult>,
    total_run_time_us: u64,
}

impl Experiment {
    /// Create an experiment with the given runner and options.
    pub fn new(name: impl Into<String>, runner: Runner, options: ExperimentOptions) -> Self {
        Self {
            name: name.into(),
            samples: options.samples,
            iterations: options.iterations,
            threads: options.threads.max(1),
            is_baseline: false,
            baseline_target: options.baseline_target,
            runner,
            results: Vec::new(),
            total_run_time_us: 0,
        }
    }

    /// Experiment name, unique within its group.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configured (or auto-tuned) samples per point.
    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// Persist an auto-tuned sample count.
    pub fn set_samples(&mut self, samples: u64) {
        self.samples = samples;
    }

    /// Configured (or auto-tuned) body calls per sample.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Persist an auto-tuned iteration count.
    pub fn set_iterations(&mut self, iterations: u64) {
        self.iterations = iterations;
    }

    /// Worker thread count (1 = sequential tight loop).
    pub fn threads(&self) -> u64 {
        self.threads
    }

    /// Whether this is the group's baseline case.
    pub fn is_baseline(&self) -> bool {
        self.is_baseline
    }

    pub(crate) fn mark_baseline(&mut self) {
        self.is_baseline = true;
    }

    /// Pass/fail threshold on the baseline ratio. <= 0 disables the check.
    pub fn baseline_target(&self) -> f64 {
        self.baseline_target
    }

    /// Execution strategy for this experiment.
    pub fn runner(&self) -> &Runner {
        &self.runner
    }

    /// Append one problem-space point.
    pub fn add_problem_point(&mut self, value: ExperimentValue) {
        self.results.push(ExperimentResult::new(value));
    }

    /// Guarantee at least one measurable point: if no sweep was declared,
    /// synthesize the reserved default point.
    pub fn ensure_default_point(&mut self) {
        if self.results.is_empty() {
            self.results.push(ExperimentResult::new(ExperimentValue {
                value: DEFAULT_PROBLEM_VALUE,
                iterations: self.iterations,
            }));
        }
    }

    /// Per-point results, in sweep order.
    pub fn results(&self) -> &[ExperimentResult] {
        &self.results
    }

    /// Mutable per-point results.
    pub fn results_mut(&mut self) -> &mut Vec<ExperimentResult> {
        &mut self.results
    }

    /// Result at an exact problem-space value. No interpolation.
    pub fn result_for(&self, value: i64) -> Option<&ExperimentResult> {
        self.results.iter().find(|r| r.value().value == value)
    }

    /// Whether every point has completed.
    pub fn is_complete(&self) -> bool {
        !self.results.is_empty() && self.results.iter().all(|r| r.complete())
    }

    /// Aggregate wall time spent measuring this experiment.
    pub fn total_run_time_us(&self) -> u64 {
        self.total_run_time_us
    }

    /// Accumulate measured wall time.
    pub fn add_run_time_us(&mut self, micros: u64) {
        self.total_run_time_us += micros;
    }
}

/// A named group of experiments sharing one baseline.
#[derive(Debug)]
pub struct Benchmark {
    name: String,
    experiments: Vec<Experiment>,
}

impl Benchmark {
    /// Create an empty group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            experiments: Vec::new(),
        }
    }

    /// Group name, unique within the registry.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn push_experiment(&mut self, experiment: Experiment) {
        self.experiments.push(experiment);
    }

    /// Experiments in registration order (baseline included).
    pub fn experiments(&self) -> &[Experiment] {
        &self.experiments
    }

    /// Mutable experiments.
    pub fn experiments_mut(&mut self) -> &mut [Experiment] {
        &mut self.experiments
    }

    /// The group's baseline case, if one was registered.
    pub fn baseline(&self) -> Option<&Experiment> {
        self.experiments.iter().find(|e| e.is_baseline())
    }

    /// Index of the baseline experiment.
    pub fn baseline_index(&self) -> Option<usize> {
        self.experiments.iter().position(|e| e.is_baseline())
    }

    /// Look up an experiment by name.
    pub fn experiment(&self, name: &str) -> Option<&Experiment> {
        self.experiments.iter().find(|e| e.name() == name)
    }

    /// Index of an experiment by name.
    pub fn experiment_index(&self, name: &str) -> Option<usize> {
        self.experiments.iter().position(|e| e.name() == name)
    }

    /// Relative-performance ratio of an experiment's point against the
    /// baseline at the same problem-space value.
    ///
    /// The baseline's own ratio is always exactly 1.0. Returns the -1.0
    /// sentinel (never an error) when the baseline result is missing or its
    /// time per call is non-positive.
    pub fn baseline_measurement(&self, experiment_name: &str, problem_value: i64) -> f64 {
        let Some(experiment) = self.experiment(experiment_name) else {
            return -1.0;
        };
        if experiment.is_baseline() {
            return 1.0;
        }
        let Some(baseline) = self.baseline() else {
            return -1.0;
        };
        let (Some(result), Some(baseline_result)) = (
            experiment.result_for(problem_value),
            baseline.result_for(problem_value),
        ) else {
            return -1.0;
        };

        let baseline_us = baseline_result.us_per_call();
        if baseline_us <= 0.0 {
            return -1.0;
        }
        result.us_per_call() / baseline_us
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{Fixture, FixtureFactory};
    use std::sync::Arc;

    struct Noop;
    impl Fixture for Noop {
        fn body(&mut self, _value: &ExperimentValue) {}
    }

    fn noop_runner() -> Runner {
        let factory: Arc<dyn FixtureFactory> = Arc::new(|| Box::new(Noop) as Box<dyn Fixture>);
        Runner::Sequential(factory)
    }

    fn experiment(name: &str) -> Experiment {
        Experiment::new(name, noop_runner(), ExperimentOptions::default())
    }

    fn feed(result: &mut ExperimentResult, iterations: u64, samples: &[i64]) {
        result.set_iterations(iterations);
        for &s in samples {
            result.time_stats_mut().add_sample(s);
        }
        result.set_complete(true);
    }

    #[test]
    fn test_us_per_call_uses_min() {
        let mut result = ExperimentResult::new(ExperimentValue::new(0));
        feed(&mut result, 1000, &[5000, 4000, 4500]);

        assert!((result.us_per_call() - 4.0).abs() < 1e-12);
        assert!((result.calls_per_sec() - 250_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_us_per_call_guards_empty() {
        let result = ExperimentResult::new(ExperimentValue::new(0));
        assert_eq!(result.us_per_call(), 0.0);
        assert_eq!(result.calls_per_sec(), 0.0);
    }

    #[test]
    fn test_default_point_synthesized_once() {
        let mut exp = experiment("lone");
        exp.ensure_default_point();
        exp.ensure_default_point();

        assert_eq!(exp.results().len(), 1);
        assert_eq!(exp.results()[0].value().value, DEFAULT_PROBLEM_VALUE);
    }

    #[test]
    fn test_declared_sweep_not_overridden() {
        let mut exp = experiment("sweep");
        exp.add_problem_point(ExperimentValue::new(64));
        exp.add_problem_point(ExperimentValue::new(256));
        exp.ensure_default_point();

        assert_eq!(exp.results().len(), 2);
        assert!(exp.result_for(256).is_some());
        assert!(exp.result_for(DEFAULT_PROBLEM_VALUE).is_none());
    }

    #[test]
    fn test_baseline_ratio_identity() {
        let mut group = Benchmark::new("group");

        let mut base = experiment("base");
        base.mark_baseline();
        base.add_problem_point(ExperimentValue::new(0));
        feed(&mut base.results_mut()[0], 100, &[200, 210]);
        group.push_experiment(base);

        let mut other = experiment("other");
        other.add_problem_point(ExperimentValue::new(0));
        feed(&mut other.results_mut()[0], 100, &[200, 250]);
        group.push_experiment(other);

        // Baseline is exactly 1.0 regardless of its own numbers.
        assert_eq!(group.baseline_measurement("base", 0), 1.0);
        // Equal min/iterations -> ratio 1.0
        assert!((group.baseline_measurement("other", 0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_baseline_ratio_sentinels() {
        let mut group = Benchmark::new("group");

        let mut other = experiment("other");
        other.add_problem_point(ExperimentValue::new(0));
        feed(&mut other.results_mut()[0], 100, &[500]);
        group.push_experiment(other);

        // No baseline registered
        assert_eq!(group.baseline_measurement("other", 0), -1.0);
        // Unknown experiment
        assert_eq!(group.baseline_measurement("missing", 0), -1.0);

        let mut base = experiment("base");
        base.mark_baseline();
        base.add_problem_point(ExperimentValue::new(0));
        group.push_experiment(base);

        // Baseline exists but has no measurement: divide-by-zero guard
        assert_eq!(group.baseline_measurement("other", 0), -1.0);
        // Value mismatch: exact match only, no interpolation
        assert_eq!(group.baseline_measurement("other", 42), -1.0);
    }

    #[test]
    fn test_slower_experiment_ratio() {
        let mut group = Benchmark::new("group");

        let mut base = experiment("base");
        base.mark_baseline();
        base.add_problem_point(ExperimentValue::new(8));
        feed(&mut base.results_mut()[0], 10, &[100]);
        group.push_experiment(base);

        let mut slow = experiment("slow");
        slow.add_problem_point(ExperimentValue::new(8));
        feed(&mut slow.results_mut()[0], 10, &[300]);
        group.push_experiment(slow);

        assert!((group.baseline_measurement("slow", 8) - 3.0).abs() < 1e-12);
    }
}

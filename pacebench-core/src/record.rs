//! Completed-Point Record
//!
//! Flat, serializable snapshot of one completed problem-space point. This
//! is what completion callbacks receive and what external writers (console
//! tables, CSV/JUnit exporters) consume; they never reach back into the
//! live model.

use crate::experiment::{Benchmark, Experiment, ExperimentResult};
use serde::{Deserialize, Serialize};

/// Snapshot of one completed (or failed) problem-space point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointRecord {
    /// Benchmark group name.
    pub group: String,
    /// Experiment name within the group.
    pub experiment: String,
    /// Problem-space value measured.
    pub problem_value: i64,
    /// Timing samples collected.
    pub samples: u64,
    /// Body calls per sample.
    pub iterations: u64,
    /// Worker threads used.
    pub threads: u64,
    /// Ratio against the group baseline (1.0 = baseline, -1.0 = unavailable).
    pub baseline: f64,
    /// Pass/fail threshold on the baseline ratio. <= 0 disables the check.
    pub baseline_target: f64,
    /// Best-case microseconds per body call.
    pub us_per_call: f64,
    /// Body calls per second.
    pub calls_per_sec: f64,
    /// Whether the measured run failed.
    pub failure: bool,
    /// Mean sample time in microseconds.
    pub mean_us: f64,
    /// Sample standard deviation in microseconds.
    pub std_dev_us: f64,
    /// Fastest sample in microseconds.
    pub min_us: i64,
    /// Slowest sample in microseconds.
    pub max_us: i64,
    /// Sample skewness.
    pub skewness: f64,
    /// Sample excess kurtosis.
    pub kurtosis: f64,
    /// Mean-above-minimum in standard deviations.
    pub z_score: f64,
    /// Mean reported memory figure, when the fixture supplies one.
    pub memory_mean: Option<f64>,
}

impl PointRecord {
    /// Snapshot a result after its statistics are finalized.
    pub fn from_result(
        benchmark: &Benchmark,
        experiment: &Experiment,
        result: &ExperimentResult,
    ) -> Self {
        let stats = result.time_stats();
        let memory = result.memory_stats();

        Self {
            group: benchmark.name().to_string(),
            experiment: experiment.name().to_string(),
            problem_value: result.value().value,
            samples: stats.len(),
            iterations: result.value().iterations,
            threads: experiment.threads(),
            baseline: benchmark.baseline_measurement(experiment.name(), result.value().value),
            baseline_target: experiment.baseline_target(),
            us_per_call: result.us_per_call(),
            calls_per_sec: result.calls_per_sec(),
            failure: result.failure(),
            mean_us: stats.mean(),
            std_dev_us: stats.std_dev(),
            min_us: stats.min(),
            max_us: stats.max(),
            skewness: stats.skewness(),
            kurtosis: stats.kurtosis(),
            z_score: stats.z_score(),
            memory_mean: if memory.is_empty() {
                None
            } else {
                Some(memory.mean())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::ExperimentOptions;
    use crate::fixture::{ExperimentValue, Fixture, Runner};
    use std::sync::Arc;

    struct Noop;
    impl Fixture for Noop {
        fn body(&mut self, _value: &ExperimentValue) {}
    }

    #[test]
    fn test_record_snapshot_and_serialization() {
        let mut group = Benchmark::new("demo");
        let runner = Runner::Sequential(Arc::new(|| Box::new(Noop) as Box<dyn Fixture>));
        let mut exp = Experiment::new("base", runner, ExperimentOptions::default());
        exp.mark_baseline();
        exp.add_problem_point(ExperimentValue::with_iterations(16, 100));
        {
            let result = &mut exp.results_mut()[0];
            result.time_stats_mut().add_sample(400);
            result.time_stats_mut().add_sample(500);
            result.set_complete(true);
        }
        group.push_experiment(exp);

        let exp = group.experiment("base").unwrap();
        let record = PointRecord::from_result(&group, exp, &exp.results()[0]);

        assert_eq!(record.samples, 2);
        assert_eq!(record.baseline, 1.0);
        assert!((record.us_per_call - 4.0).abs() < 1e-12);
        assert_eq!(record.min_us, 400);
        assert_eq!(record.memory_mean, None);

        let json = serde_json::to_string(&record).unwrap();
        let back: PointRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.group, "demo");
        assert_eq!(back.samples, 2);
    }
}

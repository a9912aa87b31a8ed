//! Integration tests for PaceBench
//!
//! These tests verify the end-to-end behavior of the harness: registration,
//! baseline-first execution, statistics accumulation, timing-window
//! guarantees, threaded fixtures and panic containment.

use pacebench::{
    do_not_optimize_away, Executor, ExperimentOptions, ExperimentValue, Fixture, PointRecord,
    Registry, ThreadedFixture, DEFAULT_PROBLEM_VALUE,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct Increment;

impl Fixture for Increment {
    fn body(&mut self, _value: &ExperimentValue) {
        let mut x = 0u64;
        x += 1;
        let _ = do_not_optimize_away(x);
    }
}

fn increment() -> Box<dyn Fixture> {
    Box::new(Increment)
}

fn pinned(samples: u64, iterations: u64) -> ExperimentOptions {
    ExperimentOptions {
        samples,
        iterations,
        ..ExperimentOptions::default()
    }
}

fn collect_records(executor: &mut Executor) -> Rc<RefCell<Vec<PointRecord>>> {
    let records = Rc::new(RefCell::new(Vec::new()));
    let sink = records.clone();
    executor.on_point_complete(move |record| sink.borrow_mut().push(record.clone()));
    records
}

/// Baseline scenario: samples=5, iterations=1000, no-op increment body.
#[test]
fn test_baseline_scenario() {
    let mut registry = Registry::new();
    registry
        .register_baseline("scenario", "increment", pinned(5, 1000), increment)
        .unwrap();

    let mut executor = Executor::new(true);
    let records = collect_records(&mut executor);
    let summary = executor.run_all(&mut registry).unwrap();

    assert_eq!(summary.points, 1);
    assert_eq!(summary.failures, 0);

    let group = registry.group("scenario").unwrap();
    let stats = group.experiments()[0].results()[0].time_stats();
    assert_eq!(stats.len(), 5);
    assert!(stats.min() as f64 <= stats.mean());
    assert!(stats.mean() <= stats.max() as f64);

    let record = &records.borrow()[0];
    assert_eq!(record.baseline, 1.0);
    assert_eq!(record.samples, 5);
    assert_eq!(record.iterations, 1000);
    assert_eq!(record.problem_value, DEFAULT_PROBLEM_VALUE);
}

/// A fixture whose tear_down sleeps must produce samples independent of
/// that sleep: teardown runs strictly after the timer stops.
#[test]
fn test_teardown_cost_excluded() {
    struct SleepyTeardown;
    impl Fixture for SleepyTeardown {
        fn body(&mut self, _value: &ExperimentValue) {
            let _ = do_not_optimize_away(1u64 + 1);
        }
        fn tear_down(&mut self) {
            std::thread::sleep(Duration::from_millis(40));
        }
    }

    let mut registry = Registry::new();
    registry
        .register_baseline("teardown", "sleepy", pinned(3, 10), || {
            Box::new(SleepyTeardown)
        })
        .unwrap();

    let mut executor = Executor::new(true);
    executor.run_all(&mut registry).unwrap();

    let stats = registry.group("teardown").unwrap().experiments()[0].results()[0].time_stats();
    assert_eq!(stats.len(), 3);
    // 10 trivial iterations time in well under the 40ms teardown sleep.
    assert!(
        stats.max() < 20_000,
        "teardown leaked into timing: max = {} us",
        stats.max()
    );
}

/// Threaded fixture: threads=4, calls=400 means each of 4 workers runs 100
/// calls, and the experiment produces one sample per run bracketing only
/// the concurrent phase.
#[test]
fn test_threaded_experiment() {
    #[derive(Default)]
    struct Contention {
        counter: Arc<AtomicU64>,
    }
    impl ThreadedFixture for Contention {
        fn body(&self, _value: &ExperimentValue) {
            self.counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    let counter = Arc::new(AtomicU64::new(0));
    let shared = counter.clone();

    let mut registry = Registry::new();
    registry
        .register_baseline("threaded", "solo", pinned(1, 400), increment)
        .unwrap();
    registry
        .register_threaded(
            "threaded",
            "contended",
            ExperimentOptions {
                samples: 1,
                iterations: 400,
                threads: 4,
                ..ExperimentOptions::default()
            },
            move || {
                Box::new(Contention {
                    counter: shared.clone(),
                })
            },
        )
        .unwrap();

    let mut executor = Executor::new(true);
    let summary = executor.run_all(&mut registry).unwrap();

    assert_eq!(summary.points, 2);
    // One sample of 400 calls: 4 workers x 100
    assert_eq!(counter.load(Ordering::Relaxed), 400);

    let stats = registry.group("threaded").unwrap().experiments()[1].results()[0].time_stats();
    assert_eq!(stats.len(), 1);
}

/// A panicking body fails its point, does not abort the process, and does
/// not prevent the sibling experiments from completing.
#[test]
fn test_panic_containment_end_to_end() {
    struct Explodes;
    impl Fixture for Explodes {
        fn body(&mut self, _value: &ExperimentValue) {
            panic!("benchmark body fault");
        }
    }

    let mut registry = Registry::new();
    registry
        .register_baseline("containment", "base", pinned(2, 100), increment)
        .unwrap();
    registry
        .register_experiment("containment", "explodes", pinned(2, 1), || {
            Box::new(Explodes)
        })
        .unwrap();
    registry
        .register_experiment("containment", "survivor", pinned(2, 100), increment)
        .unwrap();

    let mut executor = Executor::new(true);
    let records = collect_records(&mut executor);
    let summary = executor.run_all(&mut registry).unwrap();

    assert_eq!(summary.points, 3);
    assert_eq!(summary.failures, 1);

    let group = registry.group("containment").unwrap();
    assert!(group.experiment("explodes").unwrap().results()[0].failure());
    assert!(group.experiment("survivor").unwrap().is_complete());

    let failed: Vec<_> = records
        .borrow()
        .iter()
        .filter(|r| r.failure)
        .map(|r| r.experiment.clone())
        .collect();
    assert_eq!(failed, vec!["explodes".to_string()]);
}

/// A problem-space sweep yields one result and one callback per point, with
/// baseline ratios matched per value.
#[test]
fn test_problem_space_sweep() {
    struct Sweep;
    impl Fixture for Sweep {
        fn experiment_values(&self) -> Vec<ExperimentValue> {
            vec![ExperimentValue::new(64), ExperimentValue::new(256)]
        }
        fn body(&mut self, value: &ExperimentValue) {
            let n = value.value.max(0) as u64;
            let _ = do_not_optimize_away((0..n).sum::<u64>());
        }
    }

    let mut registry = Registry::new();
    // The fixture's experiment_values() declare the sweep at registration.
    registry
        .register_baseline("sweep", "sum", pinned(2, 20), || Box::new(Sweep))
        .unwrap();

    let mut executor = Executor::new(true);
    let records = collect_records(&mut executor);
    executor.run_all(&mut registry).unwrap();

    let seen: Vec<_> = records.borrow().iter().map(|r| r.problem_value).collect();
    assert_eq!(seen, vec![64, 256]);
    for record in records.borrow().iter() {
        assert_eq!(record.baseline, 1.0);
        assert_eq!(record.samples, 2);
    }
}

/// Fixtures that report a memory figure feed the result's memory
/// statistics; those that do not leave it empty.
#[test]
fn test_memory_figures_accumulated() {
    struct WithMemory;
    impl Fixture for WithMemory {
        fn body(&mut self, _value: &ExperimentValue) {}
        fn measured_memory(&self) -> Option<i64> {
            Some(4096)
        }
    }

    let mut registry = Registry::new();
    registry
        .register_baseline("memory", "tracked", pinned(3, 10), || Box::new(WithMemory))
        .unwrap();

    let mut executor = Executor::new(true);
    let records = collect_records(&mut executor);
    executor.run_all(&mut registry).unwrap();

    let memory = registry.group("memory").unwrap().experiments()[0].results()[0].memory_stats();
    assert_eq!(memory.len(), 3);
    assert_eq!(memory.min(), 4096);
    assert_eq!(records.borrow()[0].memory_mean, Some(4096.0));
}

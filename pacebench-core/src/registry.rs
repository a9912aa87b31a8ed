//! Benchmark Registry
//!
//! Process-wide, mutex-guarded, insertion-ordered collection of benchmark
//! groups. Registration is explicit - builder-style calls from `main` or a
//! test - rather than static-initializer-driven, which sidesteps the
//! unspecified cross-translation-unit initialization order that scheme
//! depends on. The mutex still makes registration safe from any thread.

use crate::experiment::{Benchmark, Experiment, ExperimentOptions};
use crate::fixture::{Fixture, Runner, ThreadedFixture};
use std::sync::{Arc, Mutex, OnceLock};
use thiserror::Error;

/// Registration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A second baseline was registered for the same group.
    #[error("group '{group}' already has a baseline experiment ('{existing}')")]
    DuplicateBaseline {
        /// Group name.
        group: String,
        /// The baseline already registered.
        existing: String,
    },

    /// An experiment name was reused within a group.
    #[error("group '{group}' already has an experiment named '{name}'")]
    DuplicateExperiment {
        /// Group name.
        group: String,
        /// The duplicated experiment name.
        name: String,
    },
}

/// Ordered collection of benchmark groups.
#[derive(Debug, Default)]
pub struct Registry {
    groups: Vec<Benchmark>,
}

static GLOBAL: OnceLock<Mutex<Registry>> = OnceLock::new();

impl Registry {
    /// Create an empty registry. Tests and embedders can run sweeps on a
    /// local registry without touching the process-wide one.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static Mutex<Registry> {
        GLOBAL.get_or_init(|| Mutex::new(Registry::new()))
    }

    /// Register the baseline experiment of `group`.
    ///
    /// Every group needs exactly one; relative metrics are ratios against it.
    pub fn register_baseline(
        &mut self,
        group: &str,
        name: &str,
        options: ExperimentOptions,
        factory: impl Fn() -> Box<dyn Fixture> + Send + Sync + 'static,
    ) -> Result<(), RegistryError> {
        let runner = Runner::Sequential(Arc::new(factory));
        self.insert(group, name, options, runner, true)
    }

    /// Register a non-baseline experiment of `group`.
    pub fn register_experiment(
        &mut self,
        group: &str,
        name: &str,
        options: ExperimentOptions,
        factory: impl Fn() -> Box<dyn Fixture> + Send + Sync + 'static,
    ) -> Result<(), RegistryError> {
        let runner = Runner::Sequential(Arc::new(factory));
        self.insert(group, name, options, runner, false)
    }

    /// Register a thread-parallel experiment of `group`. `options.threads`
    /// selects the worker count.
    pub fn register_threaded(
        &mut self,
        group: &str,
        name: &str,
        options: ExperimentOptions,
        factory: impl Fn() -> Box<dyn ThreadedFixture> + Send + Sync + 'static,
    ) -> Result<(), RegistryError> {
        let runner = Runner::Threaded(Arc::new(factory));
        self.insert(group, name, options, runner, false)
    }

    fn insert(
        &mut self,
        group: &str,
        name: &str,
        options: ExperimentOptions,
        runner: Runner,
        baseline: bool,
    ) -> Result<(), RegistryError> {
        let benchmark = self.group_entry(group);

        if benchmark.experiment(name).is_some() {
            return Err(RegistryError::DuplicateExperiment {
                group: group.to_string(),
                name: name.to_string(),
            });
        }
        if baseline {
            if let Some(existing) = benchmark.baseline() {
                return Err(RegistryError::DuplicateBaseline {
                    group: group.to_string(),
                    existing: existing.name().to_string(),
                });
            }
        }

        let mut experiment = Experiment::new(name, runner, options);
        if baseline {
            experiment.mark_baseline();
        }
        // The sweep is declared by the fixture itself, once, at registration.
        for value in probe_values(experiment.runner()) {
            experiment.add_problem_point(value);
        }
        benchmark.push_experiment(experiment);
        Ok(())
    }

    fn group_entry(&mut self, name: &str) -> &mut Benchmark {
        if let Some(idx) = self.groups.iter().position(|g| g.name() == name) {
            &mut self.groups[idx]
        } else {
            self.groups.push(Benchmark::new(name));
            self.groups.last_mut().unwrap()
        }
    }

    /// Groups in registration order.
    pub fn groups(&self) -> &[Benchmark] {
        &self.groups
    }

    /// Mutable groups.
    pub fn groups_mut(&mut self) -> &mut [Benchmark] {
        &mut self.groups
    }

    /// Look up a group by name.
    pub fn group(&self, name: &str) -> Option<&Benchmark> {
        self.groups.iter().find(|g| g.name() == name)
    }

    /// Mutable lookup of a group by name.
    pub fn group_mut(&mut self, name: &str) -> Option<&mut Benchmark> {
        self.groups.iter_mut().find(|g| g.name() == name)
    }
}

/// Ask a fresh fixture instance for its problem-space sweep.
fn probe_values(runner: &Runner) -> Vec<crate::fixture::ExperimentValue> {
    match runner {
        Runner::Sequential(factory) => factory.create().experiment_values(),
        Runner::Threaded(factory) => factory.create().experiment_values(),
    }
}

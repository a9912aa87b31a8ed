//! Example benchmark binary: compares vector summation strategies.
//!
//! Run with `cargo run --example benchmarks -- --group sum`.

use pacebench::prelude::*;

fn sizes() -> Vec<ExperimentValue> {
    [1 << 8, 1 << 12, 1 << 16]
        .into_iter()
        .map(ExperimentValue::new)
        .collect()
}

struct IterSum {
    data: Vec<u64>,
}

impl Fixture for IterSum {
    fn experiment_values(&self) -> Vec<ExperimentValue> {
        sizes()
    }
    fn set_up(&mut self, value: &ExperimentValue) {
        self.data = (0..value.value.max(0) as u64).collect();
    }
    fn body(&mut self, _value: &ExperimentValue) {
        let _ = do_not_optimize_away(self.data.iter().sum::<u64>());
    }
}

struct LoopSum {
    data: Vec<u64>,
}

impl Fixture for LoopSum {
    fn experiment_values(&self) -> Vec<ExperimentValue> {
        sizes()
    }
    fn set_up(&mut self, value: &ExperimentValue) {
        self.data = (0..value.value.max(0) as u64).collect();
    }
    fn body(&mut self, _value: &ExperimentValue) {
        let mut total = 0u64;
        for &x in &self.data {
            total = total.wrapping_add(x);
        }
        let _ = do_not_optimize_away(total);
    }
}

fn main() -> anyhow::Result<()> {
    {
        let mut registry = Registry::global()
            .lock()
            .expect("registry mutex poisoned");

        registry.register_baseline("sum", "iterator", ExperimentOptions::default(), || {
            Box::new(IterSum { data: Vec::new() })
        })?;
        registry.register_experiment("sum", "for-loop", ExperimentOptions::default(), || {
            Box::new(LoopSum { data: Vec::new() })
        })?;
    }

    pacebench::run()
}

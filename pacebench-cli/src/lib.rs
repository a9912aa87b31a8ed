#![warn(missing_docs)]
//! PaceBench CLI Library
//!
//! CLI infrastructure for benchmark binaries. Call `pacebench::run()` (or
//! `pacebench_cli::run()`) from your benchmark binary's `main()` after
//! registering experiments to get group/experiment selection, panic-catch
//! toggling and human/JSON output over the registered benchmarks.
//!
//! # Example
//!
//! ```ignore
//! fn main() -> anyhow::Result<()> {
//!     let mut registry = Registry::global().lock().unwrap();
//!     registry.register_baseline("sort", "std", Default::default(), || {
//!         Box::new(StdSortFixture::default())
//!     })?;
//!     drop(registry);
//!     pacebench_cli::run()
//! }
//! ```

mod executor;
mod formatting;

pub use executor::{Executor, ExecutorError, RunSummary, AGGREGATE_TARGET_US};
pub use formatting::{format_header, format_point_line, format_summary};

use anyhow::{anyhow, Context};
use clap::Parser;
use pacebench_core::{timer, PointRecord, Registry};
use serde::Serialize;
use std::cell::RefCell;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

/// PaceBench CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "pacebench")]
#[command(about = "PaceBench - microbenchmark execution harness")]
pub struct Cli {
    /// Run only this benchmark group
    #[arg(long)]
    pub group: Option<String>,

    /// Run only this experiment within --group
    #[arg(long, requires = "group")]
    pub experiment: Option<String>,

    /// Let panics in benchmark bodies propagate instead of containing them
    /// (useful to get a native debugger break on the first fault)
    #[arg(long)]
    pub no_catch: bool,

    /// Override the sample count for every experiment
    #[arg(short = 'n', long)]
    pub samples: Option<u64>,

    /// Override the iteration count for every experiment
    #[arg(long)]
    pub iterations: Option<u64>,

    /// Output format: human, json
    #[arg(long, default_value = "human")]
    pub format: String,

    /// Write the JSON report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// List registered groups and experiments without running anything
    #[arg(long)]
    pub list: bool,

    /// Print timer diagnostics
    #[arg(short, long)]
    pub verbose: bool,
}

/// Serialized run output for the JSON format.
#[derive(Debug, Serialize)]
struct RunReport {
    summary: RunSummary,
    records: Vec<PointRecord>,
}

/// Parse CLI arguments and run the process-wide registry.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut registry = Registry::global()
        .lock()
        .map_err(|_| anyhow!("benchmark registry mutex poisoned"))?;
    run_with(&cli, &mut registry)
}

/// Run a registry under the given CLI options.
pub fn run_with(cli: &Cli, registry: &mut Registry) -> anyhow::Result<()> {
    if cli.list {
        for group in registry.groups() {
            println!("{}", group.name());
            for experiment in group.experiments() {
                let marker = if experiment.is_baseline() {
                    " (baseline)"
                } else {
                    ""
                };
                println!("  {}{marker}", experiment.name());
            }
        }
        return Ok(());
    }

    // Probe (and optionally report) the timer resolution up front so the
    // first auto-tuned experiment does not absorb the probe cost.
    timer::resolution_micros(!cli.verbose);

    if let Some(samples) = cli.samples {
        for group in registry.groups_mut() {
            for experiment in group.experiments_mut() {
                experiment.set_samples(samples);
            }
        }
    }
    if let Some(iterations) = cli.iterations {
        for group in registry.groups_mut() {
            for experiment in group.experiments_mut() {
                experiment.set_iterations(iterations);
            }
        }
    }

    let human = cli.format == "human";
    let mut executor = Executor::new(!cli.no_catch);

    let records: Rc<RefCell<Vec<PointRecord>>> = Rc::new(RefCell::new(Vec::new()));
    {
        let records = records.clone();
        executor.on_point_complete(move |record| records.borrow_mut().push(record.clone()));
    }
    if human {
        println!("{}", format_header());
        executor.on_point_complete(|record| println!("{}", format_point_line(record)));
    }

    let summary = match (&cli.group, &cli.experiment) {
        (Some(group), Some(experiment)) => executor.run_experiment(registry, group, experiment)?,
        (Some(group), None) => executor.run_group(registry, group)?,
        (None, _) => executor.run_all(registry)?,
    };

    if human {
        println!("\n{}", format_summary(&summary));
    }

    if cli.format == "json" || cli.output.is_some() {
        let report = RunReport {
            summary,
            records: records.borrow().clone(),
        };
        let json = serde_json::to_string_pretty(&report)?;
        match &cli.output {
            Some(path) => {
                let mut file = std::fs::File::create(path)
                    .with_context(|| format!("creating report file {}", path.display()))?;
                file.write_all(json.as_bytes())?;
            }
            None => println!("{json}"),
        }
    }

    Ok(())
}

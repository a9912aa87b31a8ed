//! Console Output
//!
//! Tabular human-readable rendering of completed-point records. The
//! executor has no dependency on any of this; these functions consume the
//! plain record snapshots through the completion callback.

use crate::executor::RunSummary;
use colored::Colorize;
use pacebench_core::{PointRecord, DEFAULT_PROBLEM_VALUE};

const NAME_WIDTH: usize = 16;

/// Column header matching [`format_point_line`].
pub fn format_header() -> String {
    let line = format!(
        "{:<NAME_WIDTH$} | {:<NAME_WIDTH$} | {:>11} | {:>7} | {:>10} | {:>9} | {:>12} | {:>14}",
        "Group", "Experiment", "Prob. Space", "Samples", "Iterations", "Baseline", "us/Call",
        "Calls/Second",
    );
    let rule = "-".repeat(line.len());
    format!("{line}\n{rule}")
}

/// One aligned result row. Failed points render as a red diagnostic; points
/// that exceed their baseline target are flagged yellow.
pub fn format_point_line(record: &PointRecord) -> String {
    if record.failure {
        return format!(
            "{:<NAME_WIDTH$} | {:<NAME_WIDTH$} | {:>11} | {}",
            record.group,
            record.experiment,
            problem_space(record.problem_value),
            "FAILED".red(),
        );
    }

    let line = format!(
        "{:<NAME_WIDTH$} | {:<NAME_WIDTH$} | {:>11} | {:>7} | {:>10} | {:>9.5} | {:>12.5} | {:>14.2}",
        record.group,
        record.experiment,
        problem_space(record.problem_value),
        record.samples,
        record.iterations,
        record.baseline,
        record.us_per_call,
        record.calls_per_sec,
    );

    if record.baseline_target > 0.0 && record.baseline > record.baseline_target {
        format!(
            "{line} {}",
            format!("(exceeds target {:.2})", record.baseline_target).yellow()
        )
    } else {
        line
    }
}

/// End-of-run totals line.
pub fn format_summary(summary: &RunSummary) -> String {
    format!(
        "Completed {} points, {} failures, {} skipped in {:.3} s",
        summary.points,
        summary.failures,
        summary.skipped,
        summary.total_run_time_us as f64 / 1e6,
    )
}

fn problem_space(value: i64) -> String {
    if value == DEFAULT_PROBLEM_VALUE {
        "-".to_string()
    } else {
        value.to_string()
    }
}

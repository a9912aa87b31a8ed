#![warn(missing_docs)]
//! PaceBench Statistical Engine
//!
//! Provides the streaming (online) statistics accumulator used for timing
//! samples:
//! - Single-pass Welford-style central moment accumulation (M1..M4)
//! - Constant memory regardless of sample count - no raw sample history
//! - Associative merge of independently accumulated instances
//! - Total derived getters (mean, variance, skewness, kurtosis, z-score)
//!   that never panic and never produce NaN for degenerate sample counts

mod streaming;

pub use streaming::{StatValue, StreamingStats};

/// Default number of samples collected per measurement point when the
/// experiment does not pin a sample count.
pub const DEFAULT_SAMPLE_COUNT: u64 = 30;

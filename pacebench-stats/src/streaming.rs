//! Streaming Statistics
//!
//! Online accumulator of count, mean, variance, skewness, kurtosis and
//! min/max over a sample stream, in O(1) memory. Central moments are kept
//! in the Welford form (not raw power sums), which stays numerically stable
//! for large sample counts. Two independently filled accumulators can be
//! merged with `+`/`+=` using the Chan et al. parallel-moments formulas,
//! producing the same result (within floating point) as feeding every
//! sample into a single instance.

use std::ops::{Add, AddAssign};

/// Numeric sample type accepted by [`StreamingStats`].
///
/// Implemented for the types the harness actually feeds in: elapsed
/// microseconds as `i64`/`u64` and plain `f64` measurements.
pub trait StatValue: Copy + PartialOrd {
    /// Lossy widening to `f64` for moment arithmetic.
    fn to_f64(self) -> f64;
    /// Saturation value used as the initial `min` (everything compares below it).
    fn upper_sentinel() -> Self;
    /// Saturation value used as the initial `max` (everything compares above it).
    fn lower_sentinel() -> Self;
    /// Zero, returned by the min/max getters of an empty accumulator.
    fn zero() -> Self;
}

impl StatValue for i64 {
    fn to_f64(self) -> f64 {
        self as f64
    }
    fn upper_sentinel() -> Self {
        i64::MAX
    }
    fn lower_sentinel() -> Self {
        i64::MIN
    }
    fn zero() -> Self {
        0
    }
}

impl StatValue for u64 {
    fn to_f64(self) -> f64 {
        self as f64
    }
    fn upper_sentinel() -> Self {
        u64::MAX
    }
    fn lower_sentinel() -> Self {
        u64::MIN
    }
    fn zero() -> Self {
        0
    }
}

impl StatValue for f64 {
    fn to_f64(self) -> f64 {
        self
    }
    fn upper_sentinel() -> Self {
        f64::INFINITY
    }
    fn lower_sentinel() -> Self {
        f64::NEG_INFINITY
    }
    fn zero() -> Self {
        0.0
    }
}

/// Streaming moment accumulator.
///
/// After `n` samples, `m1` is the arithmetic mean and `m2..m4` are the
/// second through fourth central moment sums, so that
/// `variance = m2 / (n - 1)`, `skewness = sqrt(n) * m3 / m2^1.5` and
/// `kurtosis = n * m4 / m2^2 - 3`. Samples can only be added or merged,
/// never removed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamingStats<T: StatValue = i64> {
    count: u64,
    m1: f64,
    m2: f64,
    m3: f64,
    m4: f64,
    min: T,
    max: T,
}

impl<T: StatValue> Default for StreamingStats<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: StatValue> StreamingStats<T> {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self {
            count: 0,
            m1: 0.0,
            m2: 0.0,
            m3: 0.0,
            m4: 0.0,
            min: T::upper_sentinel(),
            max: T::lower_sentinel(),
        }
    }

    /// Return to the empty state, as freshly constructed.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Add one sample, updating all moments and extrema in O(1).
    ///
    /// Uses the one-pass update of Pebay/Welford for the third and fourth
    /// central moments.
    pub fn add_sample(&mut self, x: T) {
        let xf = x.to_f64();

        let n1 = self.count as f64;
        self.count += 1;
        let n = self.count as f64;

        let delta = xf - self.m1;
        let delta_n = delta / n;
        let delta_n2 = delta_n * delta_n;
        let term1 = delta * delta_n * n1;

        self.m1 += delta_n;
        self.m4 += term1 * delta_n2 * (n * n - 3.0 * n + 3.0) + 6.0 * delta_n2 * self.m2
            - 4.0 * delta_n * self.m3;
        self.m3 += term1 * delta_n * (n - 2.0) - 3.0 * delta_n * self.m2;
        self.m2 += term1;

        if x < self.min {
            self.min = x;
        }
        if x > self.max {
            self.max = x;
        }
    }

    /// Number of samples accumulated.
    pub fn len(&self) -> u64 {
        self.count
    }

    /// Whether no samples have been accumulated.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Arithmetic mean. 0 for an empty accumulator.
    pub fn mean(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.m1 }
    }

    /// Sample variance `m2 / (n - 1)`. 0 for `n <= 1`.
    pub fn variance(&self) -> f64 {
        if self.count <= 1 {
            0.0
        } else {
            self.m2 / (self.count as f64 - 1.0)
        }
    }

    /// Sample standard deviation.
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Sample skewness `sqrt(n) * m3 / m2^1.5`. 0 for `n <= 2` or zero spread.
    pub fn skewness(&self) -> f64 {
        if self.count <= 2 || self.m2 <= 0.0 {
            0.0
        } else {
            (self.count as f64).sqrt() * self.m3 / self.m2.powf(1.5)
        }
    }

    /// Excess kurtosis `n * m4 / m2^2 - 3`. 0 for `n <= 3` or zero spread.
    pub fn kurtosis(&self) -> f64 {
        if self.count <= 3 || self.m2 <= 0.0 {
            0.0
        } else {
            self.count as f64 * self.m4 / (self.m2 * self.m2) - 3.0
        }
    }

    /// Distance of the mean above the minimum, in standard deviations.
    /// 0 when the standard deviation is 0.
    pub fn z_score(&self) -> f64 {
        let sd = self.std_dev();
        if sd == 0.0 {
            0.0
        } else {
            (self.mean() - self.min().to_f64()) / sd
        }
    }

    /// Smallest sample seen. Zero for an empty accumulator.
    pub fn min(&self) -> T {
        if self.count == 0 { T::zero() } else { self.min }
    }

    /// Largest sample seen. Zero for an empty accumulator.
    pub fn max(&self) -> T {
        if self.count == 0 { T::zero() } else { self.max }
    }
}

impl<T: StatValue> Add for StreamingStats<T> {
    type Output = StreamingStats<T>;

    /// Merge two independently accumulated instances (Chan et al.).
    ///
    /// The result is statistically equivalent to having fed both sample
    /// streams into one accumulator in some order.
    fn add(self, other: StreamingStats<T>) -> StreamingStats<T> {
        if self.count == 0 {
            return other;
        }
        if other.count == 0 {
            return self;
        }

        let na = self.count as f64;
        let nb = other.count as f64;
        let n = na + nb;

        let delta = other.m1 - self.m1;
        let delta2 = delta * delta;
        let delta3 = delta2 * delta;
        let delta4 = delta2 * delta2;

        let m1 = (na * self.m1 + nb * other.m1) / n;
        let m2 = self.m2 + other.m2 + delta2 * na * nb / n;
        let m3 = self.m3
            + other.m3
            + delta3 * na * nb * (na - nb) / (n * n)
            + 3.0 * delta * (na * other.m2 - nb * self.m2) / n;
        let m4 = self.m4
            + other.m4
            + delta4 * na * nb * (na * na - na * nb + nb * nb) / (n * n * n)
            + 6.0 * delta2 * (na * na * other.m2 + nb * nb * self.m2) / (n * n)
            + 4.0 * delta * (na * other.m3 - nb * self.m3) / n;

        StreamingStats {
            count: self.count + other.count,
            m1,
            m2,
            m3,
            m4,
            min: if other.min < self.min {
                other.min
            } else {
                self.min
            },
            max: if other.max > self.max {
                other.max
            } else {
                self.max
            },
        }
    }
}

impl<T: StatValue> AddAssign for StreamingStats<T> {
    fn add_assign(&mut self, other: StreamingStats<T>) {
        *self = *self + other;
    }
}

//! Optimization Barrier
//!
//! Benchmark bodies that compute a value and drop it are prime targets for
//! dead-code elimination, which would make the measured loop a no-op. These
//! helpers force the optimizer to treat a value as used without adding an
//! observable runtime branch. Built on `std::hint::black_box`, the
//! language-sanctioned barrier, rather than volatile-read tricks.

/// Force `value` to be treated as used by the optimizer and pass it through.
#[inline(always)]
pub fn do_not_optimize_away<T>(value: T) -> T {
    std::hint::black_box(value)
}

/// Invoke `f` and force its result to be treated as used.
#[inline(always)]
pub fn do_not_optimize_call<T, F: FnOnce() -> T>(f: F) -> T {
    std::hint::black_box(f())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passes_value_through() {
        assert_eq!(do_not_optimize_away(42), 42);

        let v = vec![1, 2, 3];
        let v = do_not_optimize_away(v);
        assert_eq!(v.len(), 3);
    }

    #[test]
    fn test_call_returns_result() {
        let sum = do_not_optimize_call(|| (0..100u64).sum::<u64>());
        assert_eq!(sum, 4950);
    }
}

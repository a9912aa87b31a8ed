//! Monotonic Microsecond Timing
//!
//! All measurements in the harness are elapsed wall-clock microseconds from
//! a process-local monotonic epoch. The clock's practical resolution is
//! probed once per process and cached; the executor uses it to decide the
//! smallest duration worth measuring.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

static EPOCH: OnceLock<Instant> = OnceLock::new();
static RESOLUTION_MICROS: OnceLock<f64> = OnceLock::new();

/// Microseconds since the process-local monotonic epoch.
#[inline(always)]
pub fn now_micros() -> u64 {
    EPOCH.get_or_init(Instant::now).elapsed().as_micros() as u64
}

/// Timer bracketing one measured span.
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer.
    #[inline(always)]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Stop the timer and return elapsed microseconds.
    #[inline(always)]
    pub fn stop(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

/// Measure and cache the clock's resolution in microseconds.
///
/// Probes the smallest positive delta observable between back-to-back
/// readings. Returns 0.0 if the clock never advances (unmeasurable
/// platform); callers must guard divisions against that.
pub fn resolution_micros(quiet: bool) -> f64 {
    *RESOLUTION_MICROS.get_or_init(|| {
        let resolution = probe_resolution();
        if !quiet {
            eprintln!("pacebench: timer resolution: {resolution:.3} us");
        }
        resolution
    })
}

fn probe_resolution() -> f64 {
    let mut best = f64::INFINITY;
    for _ in 0..64 {
        let start = Instant::now();
        let mut spins = 0u32;
        let delta = loop {
            let elapsed = start.elapsed();
            if elapsed > Duration::ZERO {
                break Some(elapsed);
            }
            spins += 1;
            if spins > 1_000_000 {
                break None;
            }
        };
        match delta {
            Some(d) => best = best.min(d.as_secs_f64() * 1e6),
            None => return 0.0,
        }
    }
    if best.is_finite() { best } else { 0.0 }
}

/// Pin the current thread to one CPU to reduce scheduler-induced timing
/// noise during a sweep.
#[cfg(target_os = "linux")]
pub fn pin_to_cpu(cpu: usize) -> Result<(), std::io::Error> {
    use std::mem::MaybeUninit;

    unsafe {
        let mut set = MaybeUninit::<libc::cpu_set_t>::zeroed();
        let set_ref = set.assume_init_mut();

        libc::CPU_ZERO(set_ref);
        libc::CPU_SET(cpu, set_ref);

        let result = libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), set_ref);

        if result == 0 {
            Ok(())
        } else {
            Err(std::io::Error::last_os_error())
        }
    }
}

/// CPU pinning is not supported on this platform.
#[cfg(not(target_os = "linux"))]
pub fn pin_to_cpu(_cpu: usize) -> Result<(), std::io::Error> {
    Ok(())
}

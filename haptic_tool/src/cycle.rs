//! Fixed-rate haptic loop.
//!
//! ## RT Setup (feature `rt`)
//! 1. `mlockall(MCL_CURRENT | MCL_FUTURE)` to lock all pages.
//! 2. Prefault stack pages.
//! 3. `sched_setscheduler(SCHED_FIFO, priority)`.
//!
//! Without the feature these steps are no-ops and the loop runs with normal
//! scheduling, which is fine for simulation.
//!
//! ## Pacing
//! Deadlines are absolute (`start + k · period`) so sleep jitter does not
//! accumulate. A cycle that overruns is counted and logged; the loop keeps
//! going. If the loop falls more than one period behind, the schedule is
//! re-anchored at the current time instead of bursting to catch up.
//!
//! ## Failure Policy
//! Stale pose reads and failed force commands are absorbed and logged at
//! most once per [`WARN_INTERVAL_CYCLES`]. A device that fails
//! `max_consecutive_errors` force commands in a row ends the loop.

use crate::controller::ToolController;
use crate::error::ToolError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Absorbed failures are logged at most once per this many cycles.
pub const WARN_INTERVAL_CYCLES: u64 = 1000;

/// Default number of consecutive failed force commands that ends the loop.
pub const DEFAULT_MAX_CONSECUTIVE_ERRORS: u32 = 1000;

/// Default SCHED_FIFO priority used by the binary.
pub const DEFAULT_RT_PRIORITY: i32 = 80;

/// Haptic loop error.
#[derive(Debug, Error)]
pub enum LoopError {
    /// RT environment setup failed.
    #[error("RT setup failed: {0}")]
    RtSetup(String),

    /// The tool failed persistently.
    #[error(transparent)]
    Tool(#[from] ToolError),
}

// ─── Cycle Statistics ───────────────────────────────────────────────

/// Cycle timing statistics. O(1) update, no allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleStats {
    /// Total cycles executed.
    pub cycle_count: u64,
    /// Last cycle duration [ns].
    pub last_cycle_ns: u64,
    /// Minimum cycle duration [ns].
    pub min_cycle_ns: u64,
    /// Maximum cycle duration [ns].
    pub max_cycle_ns: u64,
    /// Running sum for average computation.
    pub sum_cycle_ns: u128,
    /// Cycles whose body took longer than the period.
    pub overruns: u64,
    /// Maximum wake-up latency past the deadline [ns].
    pub max_latency_ns: u64,
    /// Cycles that ran on a stale pose.
    pub stale_cycles: u64,
    /// Cycles whose force command failed.
    pub device_errors: u64,
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleStats {
    /// Create a zeroed stats instance.
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle_ns: 0,
            min_cycle_ns: u64::MAX,
            max_cycle_ns: 0,
            sum_cycle_ns: 0,
            overruns: 0,
            max_latency_ns: 0,
            stale_cycles: 0,
            device_errors: 0,
        }
    }

    /// Record one cycle.
    #[inline]
    pub fn record(&mut self, duration_ns: u64, latency_ns: u64) {
        self.cycle_count += 1;
        self.last_cycle_ns = duration_ns;
        self.min_cycle_ns = self.min_cycle_ns.min(duration_ns);
        self.max_cycle_ns = self.max_cycle_ns.max(duration_ns);
        self.sum_cycle_ns += u128::from(duration_ns);
        self.max_latency_ns = self.max_latency_ns.max(latency_ns);
    }

    /// Average cycle time [ns], 0 before the first cycle.
    #[inline]
    pub fn avg_cycle_ns(&self) -> u64 {
        if self.cycle_count == 0 {
            0
        } else {
            (self.sum_cycle_ns / u128::from(self.cycle_count)) as u64
        }
    }
}

// ─── RT Setup ───────────────────────────────────────────────────────

#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), LoopError> {
    use nix::sys::mman::{MlockallFlags, mlockall};
    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| LoopError::RtSetup(format!("mlockall failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), LoopError> {
    Ok(())
}

#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), LoopError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    // SAFETY: `param` is a valid sched_param for the duration of the call;
    // pid 0 targets the calling thread.
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(LoopError::RtSetup(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), LoopError> {
    Ok(())
}

/// Touch stack pages so the first cycles do not fault them in.
fn prefault_stack() {
    let buf = [0u8; 256 * 1024];
    std::hint::black_box(&buf);
}

/// Prepare the calling thread for real-time execution.
///
/// # Errors
/// `LoopError::RtSetup` if locking memory or raising priority fails.
pub fn rt_setup(rt_priority: i32) -> Result<(), LoopError> {
    rt_mlockall()?;
    prefault_stack();
    rt_set_scheduler(rt_priority)?;
    debug!(
        "RT setup done (rt feature: {}, priority {})",
        cfg!(feature = "rt"),
        rt_priority
    );
    Ok(())
}

// ─── Loop Runner ────────────────────────────────────────────────────

/// Runs a [`ToolController`] cycle at a fixed period.
#[derive(Debug)]
pub struct HapticLoop {
    period: Duration,
    running: Arc<AtomicBool>,
    max_cycles: Option<u64>,
    max_consecutive_errors: u32,
    stats: CycleStats,
}

impl HapticLoop {
    /// Create a loop that runs while `running` is set.
    pub fn new(period: Duration, running: Arc<AtomicBool>) -> Self {
        Self {
            period,
            running,
            max_cycles: None,
            max_consecutive_errors: DEFAULT_MAX_CONSECUTIVE_ERRORS,
            stats: CycleStats::new(),
        }
    }

    /// Stop after `cycles` cycles.
    pub fn with_max_cycles(mut self, cycles: u64) -> Self {
        self.max_cycles = Some(cycles);
        self
    }

    /// Number of consecutive failed force commands that ends the loop.
    pub fn with_max_consecutive_errors(mut self, limit: u32) -> Self {
        self.max_consecutive_errors = limit.max(1);
        self
    }

    /// Cycle period.
    #[inline]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Statistics so far.
    #[inline]
    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    /// Run until the running flag clears or the cycle budget is spent.
    ///
    /// The tool must already be started.
    ///
    /// # Errors
    /// `LoopError::Tool` once the device has failed
    /// `max_consecutive_errors` force commands in a row.
    pub fn run(&mut self, tool: &mut ToolController) -> Result<CycleStats, LoopError> {
        let period_ns = self.period.as_nanos() as u64;
        let mut consecutive_errors = 0u32;
        let mut next_deadline = Instant::now();

        info!(
            "Haptic loop running at {} µs{}",
            self.period.as_micros(),
            self.max_cycles
                .map(|n| format!(" for {n} cycles"))
                .unwrap_or_default()
        );

        while self.running.load(Ordering::Acquire) {
            if self.max_cycles.is_some_and(|n| self.stats.cycle_count >= n) {
                break;
            }

            let cycle_start = Instant::now();
            let latency_ns = cycle_start.saturating_duration_since(next_deadline).as_nanos() as u64;

            // ── Cycle body ──
            let result = tool.run_cycle();

            let duration_ns = cycle_start.elapsed().as_nanos() as u64;
            self.stats.record(duration_ns, latency_ns);
            let n = self.stats.cycle_count;

            if !tool.pose_valid() {
                self.stats.stale_cycles += 1;
                if self.stats.stale_cycles % WARN_INTERVAL_CYCLES == 1 {
                    warn!(
                        "Pose read failed ({} stale cycles so far), output held at zero",
                        self.stats.stale_cycles
                    );
                }
            }

            match result {
                Ok(()) => consecutive_errors = 0,
                Err(e) => {
                    self.stats.device_errors += 1;
                    consecutive_errors += 1;
                    if consecutive_errors >= self.max_consecutive_errors {
                        warn!("Giving up after {} consecutive device errors", consecutive_errors);
                        return Err(e.into());
                    }
                    if self.stats.device_errors % WARN_INTERVAL_CYCLES == 1 {
                        warn!(
                            "Force command failed at cycle {}: {} ({} total)",
                            n, e, self.stats.device_errors
                        );
                    }
                }
            }

            if duration_ns > period_ns {
                self.stats.overruns += 1;
                if self.stats.overruns % WARN_INTERVAL_CYCLES == 1 {
                    warn!(
                        "Cycle overrun: {} ns > {} ns ({} overruns)",
                        duration_ns, period_ns, self.stats.overruns
                    );
                }
            }

            next_deadline += self.period;
            let now = Instant::now();
            if now > next_deadline + self.period {
                next_deadline = now;
            }
            if let Some(remaining) = next_deadline.checked_duration_since(now) {
                std::thread::sleep(remaining);
            }
        }

        info!(
            "Haptic loop finished: {} cycles, avg {} ns, max {} ns, {} overruns",
            self.stats.cycle_count,
            self.stats.avg_cycle_ns(),
            self.stats.max_cycle_ns,
            self.stats.overruns
        );
        Ok(self.stats)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

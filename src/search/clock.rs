//! Time management for a single move request
//!
//! The search never reads the wall clock directly. It asks a
//! [`TimeGovernor`], which reads an injected [`Clock`] at most once every
//! `check_interval` nodes and latches expiry. Tests drive the governor
//! with a [`ManualClock`] to get deterministic cut-offs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Ratio used to predict the cost of the next depth from the last one
pub const BRANCHING_ESTIMATE: u32 = 3;

/// Monotonic time source
pub trait Clock: Send + Sync {
    /// Time elapsed since an arbitrary fixed origin
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`Instant`]
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Settable clock for tests.
///
/// Clones share the same time. With a non-zero step, every read advances
/// the clock by that step after reporting, which simulates a search that
/// burns time at a fixed rate per deadline check.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    state: Arc<ManualClockState>,
}

#[derive(Debug, Default)]
struct ManualClockState {
    now_ns: AtomicU64,
    step_ns: AtomicU64,
}

impl ManualClock {
    /// Clock frozen at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock that advances by `step` on every read
    pub fn auto_advancing(step: Duration) -> Self {
        let clock = Self::new();
        clock.set_step(step);
        clock
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        self.state.now_ns.fetch_add(duration_to_ns(by), Ordering::SeqCst);
    }

    /// Jump to an absolute time
    pub fn set(&self, to: Duration) {
        self.state.now_ns.store(duration_to_ns(to), Ordering::SeqCst);
    }

    /// Change the per-read step
    pub fn set_step(&self, step: Duration) {
        self.state.step_ns.store(duration_to_ns(step), Ordering::SeqCst);
    }

    /// Current time without advancing
    pub fn peek(&self) -> Duration {
        Duration::from_nanos(self.state.now_ns.load(Ordering::SeqCst))
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        let step = self.state.step_ns.load(Ordering::SeqCst);
        Duration::from_nanos(self.state.now_ns.fetch_add(step, Ordering::SeqCst))
    }
}

fn duration_to_ns(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

/// Deadline keeper for one move request.
///
/// - Hard deadline: `budget - safety_buffer` after start. Crossing it
///   aborts the search.
/// - Soft limit: `soft_percent` of the hard deadline. No new depth is
///   started past it.
pub struct TimeGovernor {
    clock: Arc<dyn Clock>,
    start: Duration,
    hard_limit: Duration,
    soft_limit: Duration,
    check_interval: u64,
    nodes_since_check: u64,
    expired: bool,
}

impl TimeGovernor {
    pub fn new(
        clock: Arc<dyn Clock>,
        budget: Duration,
        safety_buffer: Duration,
        soft_percent: u8,
        check_interval: u64,
    ) -> Self {
        let start = clock.now();
        let hard_limit = budget.saturating_sub(safety_buffer);
        let soft_limit = hard_limit * u32::from(soft_percent.min(100)) / 100;
        Self {
            clock,
            start,
            hard_limit,
            soft_limit,
            check_interval: check_interval.max(1),
            nodes_since_check: 0,
            expired: hard_limit.is_zero(),
        }
    }

    /// Usable time before the hard deadline
    #[inline]
    pub fn hard_limit(&self) -> Duration {
        self.hard_limit
    }

    /// Time after which no new depth starts
    #[inline]
    pub fn soft_limit(&self) -> Duration {
        self.soft_limit
    }

    /// Time since the request started (reads the clock)
    pub fn elapsed(&self) -> Duration {
        self.clock.now().saturating_sub(self.start)
    }

    /// Count one visited node; every `check_interval` nodes read the clock.
    ///
    /// Returns `true` once the hard deadline has passed. Expiry latches.
    #[inline]
    pub fn tick(&mut self) -> bool {
        if self.expired {
            return true;
        }
        self.nodes_since_check += 1;
        if self.nodes_since_check >= self.check_interval {
            self.nodes_since_check = 0;
            return self.check_now();
        }
        false
    }

    /// Read the clock immediately and latch expiry
    pub fn check_now(&mut self) -> bool {
        if !self.expired && self.elapsed() >= self.hard_limit {
            self.expired = true;
        }
        self.expired
    }

    /// Hard deadline already observed
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// May another depth start, given how long the last one took?
    ///
    /// False once the soft limit is passed or when the next depth, estimated
    /// as `last_depth_time * BRANCHING_ESTIMATE`, would overrun the hard
    /// deadline.
    pub fn can_start_depth(&mut self, last_depth_time: Duration) -> bool {
        if self.check_now() {
            return false;
        }
        let elapsed = self.elapsed();
        if elapsed >= self.soft_limit {
            return false;
        }
        let estimate = last_depth_time.saturating_mul(BRANCHING_ESTIMATE);
        elapsed.saturating_add(estimate) < self.hard_limit
    }
}

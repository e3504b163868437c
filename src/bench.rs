//! Timing boundary for the benchmark driver.
//!
//! Schedulers never see a clock; only the conformance driver does.
use serde::Serialize;
use std::cell::Cell;
use std::fmt;
use std::time::Instant;

/// Source of monotonic nanosecond readings.
pub trait Clock {
    fn now_nanos(&self) -> u64;
}

/// Wall clock backed by [`Instant`], counting from construction.
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
    fn now_nanos(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}

/// Clock that advances by a fixed amount on every reading.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
    step: u64,
}

impl ManualClock {
    pub fn new(step: u64) -> Self {
        Self {
            now: Cell::new(0),
            step,
        }
    }
}

impl Clock for ManualClock {
    fn now_nanos(&self) -> u64 {
        let now = self.now.get();
        self.now.set(now.saturating_add(self.step));
        now
    }
}

/// Average cost per registration of each operation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Timings {
    pub schedule_ns: u64,
    pub check_ns: u64,
}

impl Timings {
    pub fn per_op(schedule_total: u64, check_total: u64, ops: u64) -> Self {
        if ops == 0 {
            return Self::default();
        }
        Self {
            schedule_ns: schedule_total / ops,
            check_ns: check_total / ops,
        }
    }
}

impl fmt::Display for Timings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Timings schedule:{} check:{}",
            self.schedule_ns, self.check_ns
        )
    }
}

//! Time values and the monotonic checkpoint.

/// Nanoseconds since an arbitrary epoch, supplied entirely by the caller.
pub type Time = u64;

/// A scheduler's notion of "now".
///
/// Only ever moves forward: advancing to an earlier time leaves it unchanged.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Checkpoint(Time);

impl Checkpoint {
    pub fn new(start: Time) -> Self {
        Self(start)
    }

    pub fn now(&self) -> Time {
        self.0
    }

    /// Advance to `max(now, t)` and return the result.
    pub fn advance(&mut self, t: Time) -> Time {
        if t > self.0 {
            self.0 = t;
        }
        self.0
    }
}

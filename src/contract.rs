//! The scheduler contract.
//!
//! A [`Scheduler`] holds future-dated entries, each pairing a deadline with an
//! event handle, and fires them in deadline order as its checkpoint is moved
//! forward by [`Scheduler::check`]. Every implementation in this crate has the
//! same observable behavior:
//!
//! * an entry fires at most once, and only during a `check` whose (clamped)
//!   time is at or past its deadline;
//! * the `now` values handed to successive fires never decrease;
//! * nothing with a deadline at or before the checkpoint is left unfired
//!   after a `check`;
//! * entries with equal deadlines fire in the order they were scheduled.
//!
//! Schedulers are single threaded. Wrap one in `Arc<spin::Mutex<_>>` to share
//! it; that wrapper implements the trait as well.
use crate::event::Event;
use crate::time::Time;
use std::sync::Arc;

pub trait Scheduler<E>
where
    E: Event,
{
    /// Register one future firing of `event` at `deadline`.
    ///
    /// Deadlines at or before the current checkpoint are legal and fire on the
    /// very next `check`.
    fn schedule(&mut self, event: E, deadline: Time);

    /// Advance the checkpoint to `max(checkpoint, t)` and fire, in deadline
    /// order, every pending entry that is now due.
    ///
    /// Returns true if at least one entry fired.
    fn check(&mut self, t: Time) -> bool;

    /// The current checkpoint.
    fn checkpoint(&self) -> Time;

    /// Number of pending entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Earliest pending deadline.
    fn next_deadline(&self) -> Option<Time>;
}

impl<'a, E, S> Scheduler<E> for &'a mut S
where
    E: Event,
    S: Scheduler<E> + ?Sized,
{
    fn schedule(&mut self, event: E, deadline: Time) {
        (**self).schedule(event, deadline)
    }

    fn check(&mut self, t: Time) -> bool {
        (**self).check(t)
    }

    fn checkpoint(&self) -> Time {
        (**self).checkpoint()
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn next_deadline(&self) -> Option<Time> {
        (**self).next_deadline()
    }
}

impl<E, S> Scheduler<E> for Arc<spin::Mutex<S>>
where
    E: Event,
    S: Scheduler<E> + ?Sized,
{
    fn schedule(&mut self, event: E, deadline: Time) {
        self.lock().schedule(event, deadline)
    }

    fn check(&mut self, t: Time) -> bool {
        self.lock().check(t)
    }

    fn checkpoint(&self) -> Time {
        self.lock().checkpoint()
    }

    fn len(&self) -> usize {
        self.lock().len()
    }

    fn next_deadline(&self) -> Option<Time> {
        self.lock().next_deadline()
    }
}

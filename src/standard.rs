//! Reference scheduler backed by an ordered map.
//!
//! `schedule` is O(log N). `check` is O(1) amortized: a check with nothing due
//! only peeks at the first key, and otherwise each entry is visited once and
//! removed with its whole due prefix in a single split of the map.
use crate::event::Event;
use crate::contract::Scheduler;
use crate::time::{Checkpoint, Time};
use std::collections::BTreeMap;

/// Index key: deadline first, insertion sequence to keep ties FIFO and
/// duplicate deadlines distinct.
type EntryKey = (Time, u64);

pub struct StandardScheduler<E> {
    entries: BTreeMap<EntryKey, E>,
    seq: u64,
    current: Checkpoint,
}

impl<E> StandardScheduler<E>
where
    E: Event,
{
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            seq: 0,
            current: Checkpoint::default(),
        }
    }

    /// Remove and return every entry due at the current checkpoint, in
    /// firing order, or `None` without touching the map if nothing is due.
    fn take_due(&mut self) -> Option<BTreeMap<EntryKey, E>> {
        let now = self.current.now();
        match self.entries.first_key_value() {
            Some((&(deadline, _), _)) if deadline <= now => (),
            _ => return None,
        }
        Some(match now.checked_add(1) {
            Some(first_later) => {
                let later = self.entries.split_off(&(first_later, 0));
                std::mem::replace(&mut self.entries, later)
            }
            //checkpoint is at the end of time, everything is due
            None => std::mem::take(&mut self.entries),
        })
    }
}

impl<E> Default for StandardScheduler<E>
where
    E: Event,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Scheduler<E> for StandardScheduler<E>
where
    E: Event,
{
    fn schedule(&mut self, event: E, deadline: Time) {
        self.entries.insert((deadline, self.seq), event);
        self.seq = self.seq.wrapping_add(1);
    }

    fn check(&mut self, t: Time) -> bool {
        let now = self.current.advance(t);
        let Some(due) = self.take_due() else {
            return false;
        };
        tracing::trace!(now, fired = due.len(), pending = self.entries.len(), "check");
        for ((deadline, _), event) in due {
            event.fire(deadline, now);
        }
        true
    }

    fn checkpoint(&self) -> Time {
        self.current.now()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn next_deadline(&self) -> Option<Time> {
        self.entries.keys().next().map(|(deadline, _)| *deadline)
    }
}

//! Hashed timing wheel scheduler.
//!
//! The wheel has a power-of-two number of slots. Every slot holds the entries
//! of exactly one absolute deadline inside the window `[cursor, cursor + slots)`,
//! where `cursor` is one past the checkpoint once anything has been checked.
//! Entries land in one of three places:
//!
//! ```text
//!   deadline <  cursor                 -> due list, fired first by the next check
//!   deadline in [cursor, cursor+slots) -> slot (deadline & mask), FIFO
//!   deadline >= cursor + slots         -> overflow map, promoted as the window moves
//! ```
//!
//! An occupancy bitmap lets `check` skip empty slots a word at a time, and an
//! empty wheel jumps the cursor straight to the next overflow deadline.
//!
//! # Complexity
//!
//! - `schedule`: O(1) inside the horizon, O(log M) for the M overflow entries.
//! - `check`: O(1) amortized per fired entry, plus O(slots / 64) per window
//!   the cursor crosses while the wheel is non-empty.
//!
//! Entries with equal deadlines fire in insertion order, matching
//! [`StandardScheduler`](crate::standard::StandardScheduler).
use crate::error::ConfigError;
use crate::event::Event;
use crate::contract::Scheduler;
use crate::time::{Checkpoint, Time};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_SLOTS: usize = 4096;
const MIN_SLOTS: usize = 64;
const WORD_BITS: usize = u64::BITS as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelConfig {
    /// Number of slots, also the horizon in time units.
    pub slots: usize,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            slots: DEFAULT_SLOTS,
        }
    }
}

impl WheelConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn slots(mut self, slots: usize) -> Self {
        self.slots = slots;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slots < MIN_SLOTS || !self.slots.is_power_of_two() {
            return Err(ConfigError::SlotCount(self.slots));
        }
        Ok(())
    }
}

pub struct WheelScheduler<E> {
    slots: Vec<Vec<E>>,
    slot_key: Vec<Time>,
    occupied: Vec<u64>,
    mask: usize,
    /// Next deadline not yet drained, one past the checkpoint. Wide enough to
    /// step past `Time::MAX`.
    cursor: u128,
    in_slots: usize,
    due: Vec<(Time, E)>,
    overflow: BTreeMap<(Time, u64), E>,
    seq: u64,
    current: Checkpoint,
}

impl<E> WheelScheduler<E>
where
    E: Event,
{
    pub fn new() -> Self {
        Self::build(DEFAULT_SLOTS)
    }

    pub fn with_config(config: WheelConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config.slots))
    }

    fn build(slots: usize) -> Self {
        Self {
            slots: (0..slots).map(|_| Vec::new()).collect(),
            slot_key: vec![0; slots],
            occupied: vec![0; slots / WORD_BITS],
            mask: slots - 1,
            cursor: 0,
            in_slots: 0,
            due: Vec::new(),
            overflow: BTreeMap::new(),
            seq: 0,
            current: Checkpoint::default(),
        }
    }

    /// Span of deadlines held directly in slots.
    pub fn horizon(&self) -> usize {
        self.slots.len()
    }

    fn window_end(&self) -> u128 {
        self.cursor + self.slots.len() as u128
    }

    fn insert_slot(&mut self, deadline: Time, event: E) {
        let slot = deadline as usize & self.mask;
        if self.slots[slot].is_empty() {
            self.slot_key[slot] = deadline;
            self.occupied[slot / WORD_BITS] |= 1 << (slot % WORD_BITS);
        }
        debug_assert_eq!(self.slot_key[slot], deadline, "slot collision");
        self.slots[slot].push(event);
        self.in_slots += 1;
    }

    /// Move overflow entries that fall inside the window into their slots.
    fn promote(&mut self) {
        let end = self.window_end();
        while let Some(entry) = self.overflow.first_entry() {
            let (deadline, _) = *entry.key();
            if deadline as u128 >= end {
                break;
            }
            let event = entry.remove();
            self.insert_slot(deadline, event);
        }
    }

    /// First occupied deadline in `[from, end)`; `end - from` must not exceed
    /// the slot count.
    fn next_occupied(&self, from: u128, end: u128) -> Option<u128> {
        let mut key = from;
        while key < end {
            let slot = key as usize & self.mask;
            let bit = slot % WORD_BITS;
            let bits = self.occupied[slot / WORD_BITS] >> bit;
            if bits != 0 {
                let found = key + bits.trailing_zeros() as u128;
                return (found < end).then_some(found);
            }
            key += (WORD_BITS - bit) as u128;
        }
        None
    }

    fn fire_slot(&mut self, key: u128, now: Time) -> usize {
        let deadline = key as Time;
        let slot = deadline as usize & self.mask;
        debug_assert_eq!(self.slot_key[slot], deadline);
        let mut entries = std::mem::take(&mut self.slots[slot]);
        let count = entries.len();
        for event in entries.drain(..) {
            event.fire(deadline, now);
        }
        //keep the allocation around for the next deadline that hashes here
        self.slots[slot] = entries;
        self.occupied[slot / WORD_BITS] &= !(1 << (slot % WORD_BITS));
        self.in_slots -= count;
        count
    }

    fn fire_due(&mut self, now: Time) -> usize {
        if self.due.is_empty() {
            return 0;
        }
        let mut due = std::mem::take(&mut self.due);
        //stable, ties stay in insertion order
        due.sort_by_key(|(deadline, _)| *deadline);
        let count = due.len();
        for (deadline, event) in due.drain(..) {
            event.fire(deadline, now);
        }
        self.due = due;
        count
    }
}

impl<E> Default for WheelScheduler<E>
where
    E: Event,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Scheduler<E> for WheelScheduler<E>
where
    E: Event,
{
    fn schedule(&mut self, event: E, deadline: Time) {
        let key = deadline as u128;
        if key < self.cursor {
            self.due.push((deadline, event));
        } else if key < self.window_end() {
            self.insert_slot(deadline, event);
        } else {
            self.overflow.insert((deadline, self.seq), event);
            self.seq = self.seq.wrapping_add(1);
        }
    }

    fn check(&mut self, t: Time) -> bool {
        let now = self.current.advance(t);
        let target = now as u128 + 1;
        let mut fired = self.fire_due(now);

        while self.cursor < target {
            if self.in_slots == 0 {
                let next = self.overflow.keys().next().map(|&(deadline, _)| deadline);
                match next {
                    Some(deadline) if (deadline as u128) < target => {
                        self.cursor = deadline as u128;
                        self.promote();
                    }
                    _ => {
                        self.cursor = target;
                        break;
                    }
                }
            }
            let end = target.min(self.window_end());
            while let Some(key) = self.next_occupied(self.cursor, end) {
                fired += self.fire_slot(key, now);
                self.cursor = key + 1;
            }
            self.cursor = end;
            self.promote();
        }
        self.promote();

        if fired > 0 {
            tracing::trace!(now, fired, pending = self.len(), "check");
        }
        fired > 0
    }

    fn checkpoint(&self) -> Time {
        self.current.now()
    }

    fn len(&self) -> usize {
        self.due.len() + self.in_slots + self.overflow.len()
    }

    fn next_deadline(&self) -> Option<Time> {
        let due = self.due.iter().map(|(deadline, _)| *deadline).min();
        if due.is_some() {
            return due;
        }
        if self.in_slots > 0 {
            return self
                .next_occupied(self.cursor, self.window_end())
                .map(|key| key as Time);
        }
        self.overflow.keys().next().map(|(deadline, _)| *deadline)
    }
}

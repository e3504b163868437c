//! Conformance harness.
//!
//! Drives any [`Scheduler`] with randomized deadlines, registering each event
//! several times, then sweeps `check` across the whole deadline range and
//! verifies the ordering and firing-count invariants.
//!
//! Events live in an [`EventArena`]; the scheduler only ever receives
//! [`EventRef`] handles into it, so an entry the scheduler fails to fire can
//! never dangle.
use crate::bench::{Clock, Timings};
use crate::error::{ConfigError, ConformanceError, Error};
use crate::event::Event;
use crate::contract::Scheduler;
use crate::time::Time;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConformanceConfig {
    /// Number of distinct events, N.
    pub samples: u64,
    /// Registrations per event, R.
    pub repeats: u64,
    /// Distance between successive `check` times.
    pub step: u64,
    /// Deadlines are drawn from `[0, samples * horizon_factor]`.
    pub horizon_factor: u64,
    /// Fixed RNG seed, `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for ConformanceConfig {
    fn default() -> Self {
        Self {
            samples: 1000,
            repeats: 1,
            step: 5,
            horizon_factor: 10,
            seed: None,
        }
    }
}

impl ConformanceConfig {
    pub fn new(samples: u64) -> Self {
        Self {
            samples,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn repeats(mut self, repeats: u64) -> Self {
        self.repeats = repeats;
        self
    }

    #[must_use]
    pub fn step(mut self, step: u64) -> Self {
        self.step = step;
        self
    }

    #[must_use]
    pub fn horizon_factor(mut self, factor: u64) -> Self {
        self.horizon_factor = factor;
        self
    }

    #[must_use]
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Last time handed to `check`, also the largest possible deadline.
    pub fn horizon(&self) -> Result<Time, ConfigError> {
        self.samples
            .checked_mul(self.horizon_factor)
            .ok_or(ConfigError::HorizonOverflow {
                samples: self.samples,
                factor: self.horizon_factor,
            })
    }

    /// Total number of registrations, N * R.
    pub fn entries(&self) -> Result<u64, ConfigError> {
        self.samples
            .checked_mul(self.repeats)
            .ok_or(ConfigError::EntryOverflow {
                samples: self.samples,
                repeats: self.repeats,
            })
    }

    /// Number of arena slots, N, as a native index.
    pub fn arena_len(&self) -> Result<usize, ConfigError> {
        usize::try_from(self.samples).map_err(|_| ConfigError::SampleOverflow(self.samples))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.step == 0 {
            return Err(ConfigError::ZeroStep);
        }
        self.horizon()?;
        self.entries()?;
        self.arena_len()?;
        Ok(())
    }
}

/// First invariant violation seen by a [`Notifier`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Violation {
    event: usize,
    scheduled: Time,
    now: Time,
    previous: Option<Time>,
}

impl From<Violation> for ConformanceError {
    fn from(v: Violation) -> Self {
        match v.previous {
            Some(previous) => ConformanceError::OutOfOrder {
                event: v.event,
                scheduled: v.scheduled,
                now: v.now,
                previous,
            },
            None => ConformanceError::Premature {
                event: v.event,
                scheduled: v.scheduled,
                now: v.now,
            },
        }
    }
}

/// Shared record every event in an arena reports to.
#[derive(Debug, Default)]
pub struct Notifier {
    fired: Cell<u64>,
    last_now: Cell<Option<Time>>,
    violation: Cell<Option<Violation>>,
}

impl Notifier {
    pub fn fired(&self) -> u64 {
        self.fired.get()
    }

    /// Largest `now` observed so far.
    pub fn last_now(&self) -> Option<Time> {
        self.last_now.get()
    }

    /// First broken ordering invariant, if any.
    pub fn violation(&self) -> Option<ConformanceError> {
        self.violation.get().map(ConformanceError::from)
    }

    fn observe(&self, event: usize, scheduled: Time, now: Time) {
        self.fired.set(self.fired.get() + 1);
        let previous = self.last_now.get();
        let broken = if now < scheduled {
            Some(Violation {
                event,
                scheduled,
                now,
                previous: None,
            })
        } else {
            match previous {
                Some(p) if now < p => Some(Violation {
                    event,
                    scheduled,
                    now,
                    previous: Some(p),
                }),
                _ => None,
            }
        };
        if let Some(v) = broken {
            if self.violation.get().is_none() {
                tracing::debug!(event, scheduled, now, ?previous, "invariant violated");
                self.violation.set(Some(v));
            }
        }
        if previous.map_or(true, |p| now > p) {
            self.last_now.set(Some(now));
        }
    }
}

/// Fixed-size storage for the harness's events.
#[derive(Debug)]
pub struct EventArena {
    notifier: Notifier,
    fires: Vec<Cell<u64>>,
}

impl EventArena {
    pub fn new(count: usize) -> Rc<Self> {
        Rc::new(Self {
            notifier: Notifier::default(),
            fires: (0..count).map(|_| Cell::new(0)).collect(),
        })
    }

    /// A handle to every event in the arena, by position.
    pub fn handles(self: &Rc<Self>) -> Vec<EventRef> {
        (0..self.fires.len())
            .map(|index| EventRef {
                arena: Rc::clone(self),
                index,
            })
            .collect()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn len(&self) -> usize {
        self.fires.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fires.is_empty()
    }

    /// Times the event at `index` has fired.
    pub fn fire_count(&self, index: usize) -> Option<u64> {
        self.fires.get(index).map(Cell::get)
    }

    /// First event that did not fire exactly `expected` times.
    fn miscounted(&self, expected: u64) -> Option<ConformanceError> {
        self.fires
            .iter()
            .enumerate()
            .find(|(_, c)| c.get() != expected)
            .map(|(event, c)| ConformanceError::EventCountMismatch {
                event,
                expected,
                fired: c.get(),
            })
    }
}

/// Handle to one event in an [`EventArena`], by position.
#[derive(Debug, Clone)]
pub struct EventRef {
    arena: Rc<EventArena>,
    index: usize,
}

impl EventRef {
    pub fn index(&self) -> usize {
        self.index
    }
}

impl Event for EventRef {
    fn fire(&self, scheduled: Time, now: Time) {
        let count = &self.arena.fires[self.index];
        count.set(count.get() + 1);
        self.arena.notifier.observe(self.index, scheduled, now);
    }
}

/// Outcome of one conformance run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConformanceReport {
    pub samples: u64,
    pub repeats: u64,
    pub expected: u64,
    pub fired: u64,
    /// Scheduler checkpoint after the drive.
    pub checkpoint: Time,
    /// Entries the scheduler still holds after the drive.
    pub pending: usize,
    pub timings: Timings,
    pub failure: Option<ConformanceError>,
}

impl ConformanceReport {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }

    pub fn failure(&self) -> Option<&ConformanceError> {
        self.failure.as_ref()
    }

    pub fn into_result(self) -> Result<Self, ConformanceError> {
        match self.failure {
            Some(e) => Err(e),
            None => Ok(self),
        }
    }
}

/// Run the conformance drive against `sched`.
///
/// Only configuration problems are returned as errors; a misbehaving
/// scheduler is reported through [`ConformanceReport::failure`] so the
/// timings are still available.
pub fn run_conformance<S, C>(
    sched: &mut S,
    config: &ConformanceConfig,
    clock: &C,
) -> Result<ConformanceReport, ConfigError>
where
    S: Scheduler<EventRef> + ?Sized,
    C: Clock + ?Sized,
{
    config.validate()?;
    let horizon = config.horizon()?;
    let expected = config.entries()?;
    let len = config.arena_len()?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let dist = Uniform::new_inclusive(0, horizon);
    let deadlines: Vec<Time> = (0..expected).map(|_| dist.sample(&mut rng)).collect();

    let arena = EventArena::new(len);
    let events = arena.handles();
    tracing::debug!(
        samples = config.samples,
        repeats = config.repeats,
        horizon,
        "starting conformance run"
    );

    let t0 = clock.now_nanos();
    for (deadline, event) in deadlines.iter().zip(events.iter().cycle()) {
        sched.schedule(event.clone(), *deadline);
    }
    let t1 = clock.now_nanos();
    let mut now: Time = 0;
    loop {
        sched.check(now);
        if now >= horizon {
            break;
        }
        now = now.saturating_add(config.step).min(horizon);
    }
    let t2 = clock.now_nanos();

    let timings = Timings::per_op(t1.saturating_sub(t0), t2.saturating_sub(t1), expected);
    let notifier = arena.notifier();
    let fired = notifier.fired();
    let failure = notifier
        .violation()
        .or_else(|| {
            (fired != expected).then_some(ConformanceError::CountMismatch { expected, fired })
        })
        .or_else(|| arena.miscounted(config.repeats));

    match &failure {
        Some(e) => tracing::debug!(%e, "conformance failed"),
        None => tracing::debug!(fired, %timings, "conformance passed"),
    }

    Ok(ConformanceReport {
        samples: config.samples,
        repeats: config.repeats,
        expected,
        fired,
        checkpoint: sched.checkpoint(),
        pending: sched.len(),
        timings,
        failure,
    })
}

/// Run the drive and fold any failure into the error.
pub fn check_conformance<S, C>(
    sched: &mut S,
    config: &ConformanceConfig,
    clock: &C,
) -> Result<ConformanceReport, Error>
where
    S: Scheduler<EventRef> + ?Sized,
    C: Clock + ?Sized,
{
    Ok(run_conformance(sched, config, clock)?.into_result()?)
}

use crate::time::Time;
use serde::Serialize;
use thiserror::Error;

/// Rejected configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("wheel slot count {0} must be a power of two no smaller than 64")]
    SlotCount(usize),

    #[error("drive step must be non-zero")]
    ZeroStep,

    #[error("{samples} samples with horizon factor {factor} overflows the time range")]
    HorizonOverflow { samples: u64, factor: u64 },

    #[error("{samples} samples repeated {repeats} times overflows the entry count")]
    EntryOverflow { samples: u64, repeats: u64 },

    #[error("{0} samples do not fit in this platform's address space")]
    SampleOverflow(u64),
}

/// An invariant a scheduler broke during a conformance run.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConformanceError {
    #[error("event {event} scheduled for {scheduled} fired early at {now}")]
    Premature { event: usize, scheduled: Time, now: Time },

    #[error("event {event} scheduled for {scheduled} fired at {now} after a firing at {previous}")]
    OutOfOrder {
        event: usize,
        scheduled: Time,
        now: Time,
        previous: Time,
    },

    #[error("expected {expected} firings in total, observed {fired}")]
    CountMismatch { expected: u64, fired: u64 },

    #[error("event {event} fired {fired} times, expected {expected}")]
    EventCountMismatch { event: usize, expected: u64, fired: u64 },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Conformance(#[from] ConformanceError),
}

//! Timer/event scheduling.
//!
//! A [`Scheduler`] holds future-dated events and fires them in deadline order
//! as its checkpoint is advanced. Two implementations share the contract:
//!
//! * [`StandardScheduler`]: ordered map, O(log N) `schedule`, O(1) amortized
//!   `check`.
//! * [`WheelScheduler`]: hashed timing wheel, O(1) amortized for both inside
//!   its horizon.
//!
//! The [`conformance`] module proves an implementation honors the contract and
//! measures what each operation costs.
//!
//! ```
//! use sched::{from_fn, Scheduler, StandardScheduler};
//! use std::cell::Cell;
//!
//! let fired = Cell::new(0);
//! let event = from_fn(|_scheduled, _now| fired.set(fired.get() + 1));
//! let mut s = StandardScheduler::new();
//! s.schedule(&event, 3);
//! s.schedule(&event, 7);
//! assert!(s.check(5));
//! assert_eq!(1, fired.get());
//! ```

pub mod bench;
pub mod conformance;
pub mod contract;
pub mod error;
pub mod event;
pub mod standard;
pub mod time;
pub mod wheel;

pub use crate::bench::{Clock, ManualClock, MonotonicClock, Timings};
pub use crate::conformance::{
    check_conformance, run_conformance, ConformanceConfig, ConformanceReport, EventArena,
    EventRef,
};
pub use crate::contract::Scheduler;
pub use crate::error::{ConfigError, ConformanceError, Error};
pub use crate::event::{from_fn, Event, FnEvent};
pub use crate::standard::StandardScheduler;
pub use crate::time::{Checkpoint, Time};
pub use crate::wheel::{WheelConfig, WheelScheduler};

use proptest::prelude::*;
use sched::{Event, Scheduler, StandardScheduler, Time, WheelConfig, WheelScheduler};
use std::cell::RefCell;

/// Tags every firing with the id of the registration that produced it.
struct Tagged<'a> {
    id: usize,
    log: &'a RefCell<Vec<(usize, Time, Time)>>,
}

impl Event for Tagged<'_> {
    fn fire(&self, scheduled: Time, now: Time) {
        self.log.borrow_mut().push((self.id, scheduled, now));
    }
}

#[derive(Debug, Clone)]
enum Op {
    Schedule(Time),
    Check(Time),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0u64..2_000).prop_map(Op::Schedule),
        1 => (0u64..2_000).prop_map(Op::Check),
    ]
}

/// Replays `ops`, then checks at `end`, and returns the ids never fired.
fn replay<'a, S>(s: &mut S, events: &'a [Tagged<'a>], ops: &[Op], end: Time) -> Vec<usize>
where
    S: Scheduler<&'a Tagged<'a>>,
{
    let mut next = 0;
    for op in ops {
        match *op {
            Op::Schedule(deadline) => {
                s.schedule(&events[next], deadline);
                next += 1;
            }
            Op::Check(t) => {
                s.check(t);
            }
        }
    }
    s.check(end);
    let fired: Vec<usize> = events[0].log.borrow().iter().map(|f| f.0).collect();
    (0..next).filter(|id| !fired.contains(id)).collect()
}

fn tagged(log: &RefCell<Vec<(usize, Time, Time)>>, count: usize) -> Vec<Tagged<'_>> {
    (0..count).map(|id| Tagged { id, log }).collect()
}

proptest! {
    #[test]
    fn implementations_agree(ops in prop::collection::vec(op(), 1..200), slots_pow in 6u32..9) {
        let schedules = ops.iter().filter(|o| matches!(o, Op::Schedule(_))).count().max(1);

        let standard_log = RefCell::new(Vec::new());
        let standard_events = tagged(&standard_log, schedules);
        let mut standard = StandardScheduler::new();
        let standard_lost = replay(&mut standard, &standard_events, &ops, 2_000);

        let wheel_log = RefCell::new(Vec::new());
        let wheel_events = tagged(&wheel_log, schedules);
        let config = WheelConfig::new().slots(1 << slots_pow);
        let mut wheel = WheelScheduler::with_config(config).unwrap();
        let wheel_lost = replay(&mut wheel, &wheel_events, &ops, 2_000);

        prop_assert!(standard_lost.is_empty());
        prop_assert!(wheel_lost.is_empty());
        prop_assert_eq!(&*standard_log.borrow(), &*wheel_log.borrow());
        prop_assert_eq!(standard.checkpoint(), wheel.checkpoint());
        prop_assert!(wheel.is_empty());
    }

    #[test]
    fn firing_invariants_hold(
        deadlines in prop::collection::vec(0u64..10_000, 0..300),
        mut checks in prop::collection::vec(0u64..10_000, 1..50),
    ) {
        checks.sort_unstable();
        let log = RefCell::new(Vec::new());
        let events = tagged(&log, deadlines.len());
        let mut w = WheelScheduler::new();
        for (e, d) in events.iter().zip(&deadlines) {
            w.schedule(e, *d);
        }

        let mut fired_so_far = 0;
        for &t in &checks {
            let fired = w.check(t);
            let total = log.borrow().len();
            prop_assert_eq!(fired, total > fired_so_far);
            fired_so_far = total;
            // no silent loss: nothing due is left behind
            prop_assert!(w.next_deadline().map_or(true, |d| d > t));
        }

        let log = log.borrow();
        let mut seen = vec![0u32; deadlines.len()];
        for (i, &(id, scheduled, now)) in log.iter().enumerate() {
            prop_assert_eq!(deadlines[id], scheduled);
            prop_assert!(now >= scheduled);
            if i > 0 {
                prop_assert!(now >= log[i - 1].2);
                prop_assert!(scheduled >= log[i - 1].1 || now > log[i - 1].2);
            }
            seen[id] += 1;
        }
        prop_assert!(seen.iter().all(|&c| c <= 1));
        let last = *checks.last().unwrap();
        let due = deadlines.iter().filter(|&&d| d <= last).count();
        prop_assert_eq!(due, log.len());
    }
}

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sched::{from_fn, Event, Scheduler, StandardScheduler, Time, WheelScheduler};

const SIZES: [u64; 3] = [1_000, 10_000, 100_000];

fn deadlines(count: u64) -> Vec<Time> {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let dist = Uniform::new_inclusive(0, count * 10);
    (0..count).map(|_| dist.sample(&mut rng)).collect()
}

fn fill<'a, S>(s: &mut S, event: &'a dyn Event, deadlines: &[Time])
where
    S: Scheduler<&'a dyn Event>,
{
    for &d in deadlines {
        s.schedule(event, d);
    }
}

fn drain<'a, S>(s: &mut S, horizon: Time)
where
    S: Scheduler<&'a dyn Event>,
{
    let mut now = 0;
    while now <= horizon {
        black_box(s.check(now));
        now += 5;
    }
}

fn bench_schedule(c: &mut Criterion) {
    let event = from_fn(|s, n| {
        black_box((s, n));
    });
    let mut group = c.benchmark_group("schedule");
    for count in SIZES {
        let ds = deadlines(count);
        group.bench_with_input(BenchmarkId::new("standard", count), &ds, |b, ds| {
            b.iter_batched_ref(
                StandardScheduler::new,
                |s| fill(s, &event, ds),
                BatchSize::LargeInput,
            )
        });
        group.bench_with_input(BenchmarkId::new("wheel", count), &ds, |b, ds| {
            b.iter_batched_ref(
                WheelScheduler::new,
                |s| fill(s, &event, ds),
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_check(c: &mut Criterion) {
    let event = from_fn(|s, n| {
        black_box((s, n));
    });
    let mut group = c.benchmark_group("check");
    for count in SIZES {
        let ds = deadlines(count);
        let horizon = count * 10;
        group.bench_with_input(BenchmarkId::new("standard", count), &ds, |b, ds| {
            b.iter_batched_ref(
                || {
                    let mut s = StandardScheduler::new();
                    fill(&mut s, &event, ds);
                    s
                },
                |s| drain(s, horizon),
                BatchSize::LargeInput,
            )
        });
        group.bench_with_input(BenchmarkId::new("wheel", count), &ds, |b, ds| {
            b.iter_batched_ref(
                || {
                    let mut s = WheelScheduler::new();
                    fill(&mut s, &event, ds);
                    s
                },
                |s| drain(s, horizon),
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_schedule, bench_check);
criterion_main!(benches);

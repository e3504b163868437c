use clap::{CommandFactory, Parser, ValueEnum};
use sched::{
    run_conformance, ConformanceConfig, ConformanceReport, MonotonicClock, StandardScheduler,
    WheelConfig, WheelScheduler,
};
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Kind {
    Standard,
    Wheel,
}

/// Check a scheduler implementation for conformance and time its operations.
#[derive(Debug, Parser)]
#[command(name = "sched-check")]
struct Cli {
    /// Number of distinct events to schedule.
    numsamples: Option<u64>,

    /// Times each event is scheduled.
    #[arg(default_value_t = 1)]
    repeats: u64,

    #[arg(long, value_enum, default_value_t = Kind::Standard)]
    scheduler: Kind,

    /// Distance between successive check times.
    #[arg(long, default_value_t = 5)]
    step: u64,

    /// Seed for the deadline generator.
    #[arg(long)]
    seed: Option<u64>,

    /// Slot count for the wheel scheduler.
    #[arg(long, default_value_t = sched::wheel::DEFAULT_SLOTS)]
    slots: usize,

    /// Also print the full report as JSON.
    #[arg(long)]
    json: bool,
}

fn run(cli: &Cli, samples: u64) -> anyhow::Result<ConformanceReport> {
    let config = ConformanceConfig::new(samples)
        .repeats(cli.repeats)
        .step(cli.step)
        .seed(cli.seed);
    let clock = MonotonicClock::new();
    let report = match cli.scheduler {
        Kind::Standard => run_conformance(&mut StandardScheduler::new(), &config, &clock)?,
        Kind::Wheel => {
            let mut wheel = WheelScheduler::with_config(WheelConfig::new().slots(cli.slots))?;
            tracing::debug!(horizon = wheel.horizon(), "wheel scheduler");
            run_conformance(&mut wheel, &config, &clock)?
        }
    };
    Ok(report)
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(samples) = cli.numsamples else {
        Cli::command().print_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    let report = run(&cli, samples)?;
    println!("{}", report.timings);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    match report.failure() {
        None => {
            println!("Success!");
            Ok(ExitCode::SUCCESS)
        }
        Some(err) => {
            tracing::error!("conformance failed: {err}");
            println!("Failed!");
            Ok(ExitCode::from(1))
        }
    }
}

use std::rc::Rc;

use anyhow::{ensure, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rxtiming::config::ScenarioConfig;
use rxtiming::scenarios::Scenario;
use rxtiming::sink::{ConsoleSink, Sink};
use rxtiming::Scheduler;

/// Runs the cold / hot / refCount timing scenarios and prints what each
/// observer receives.
#[derive(Parser)]
#[command(name = "rxtiming")]
#[command(about = "Cold vs hot observable timing scenarios", long_about = None)]
struct Cli {
    /// Scenarios to run: control, cold, hot, hotRefCount. Runs all when empty.
    scenarios: Vec<Scenario>,

    /// Clock driving the timers.
    #[arg(long, value_enum, default_value_t = ClockKind::Real)]
    clock: ClockKind,

    /// Divide every delay by this factor.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    speedup: u32,

    /// Compare each run against its expected lines and fail on mismatch.
    /// Checks always run on the virtual clock.
    #[arg(long)]
    check: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ClockKind {
    Real,
    Virtual,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ScenarioConfig::default().scaled(cli.speedup);
    let scenarios = if cli.scenarios.is_empty() { Scenario::ALL.to_vec() } else { cli.scenarios };

    for scenario in scenarios {
        println!("# {scenario}");
        if cli.check {
            let lines = scenario.record(&config);
            for line in &lines {
                println!("{line}");
            }
            ensure!(
                lines.iter().map(String::as_str).eq(scenario.expected().iter().copied()),
                "scenario {scenario} diverged from its expected lines"
            );
            info!(%scenario, "matches expected lines");
            continue;
        }

        let scheduler = match cli.clock {
            ClockKind::Real => Scheduler::real_time(),
            ClockKind::Virtual => Scheduler::virtual_time(),
        };
        let sink: Rc<dyn Sink> = Rc::new(ConsoleSink);
        scenario.run(&scheduler, &config, &sink);
    }

    Ok(())
}

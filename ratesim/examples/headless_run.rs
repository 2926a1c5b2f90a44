//! Headless run: every strategy against the same server, with a summary table.
//!
//! ```bash
//! cargo run --example headless_run
//! cargo run --example headless_run -- path/to/run.json out/run
//! RUST_LOG=ratesim_core::simulation=trace cargo run --example headless_run
//! ```
//!
//! With a config path, only that configuration is run. With an output stem
//! each run is also exported to `<stem>_<strategy>.json`,
//! `<stem>_<strategy>_samples.csv` and `<stem>_<strategy>_buckets.csv`.

use ratesim::core::logging::{events, init_simulation_logging, simulation_span};
use ratesim::metrics::{export_csv, export_json};
use ratesim::prelude::*;
use std::error::Error;
use std::path::PathBuf;

const RUN_LENGTH: SimTime = SimTime::from_secs(300);

fn run(config: &RunConfig) -> Result<(Simulation, RunSummary), Box<dyn Error>> {
    let mut sim = config.build()?;
    let _span = simulation_span(config.strategy.kind.key()).entered();

    Executor::timed(RUN_LENGTH).execute(&mut sim);

    let snapshot = sim.snapshot();
    let summary = RunSummary::from_snapshot(&snapshot)?;
    events::run_completed(
        snapshot.time,
        summary.total_requests,
        summary.success_rate_percent,
    );
    Ok((sim, summary))
}

fn print_row(summary: &RunSummary) {
    println!(
        "{:<26} {:>8} {:>8.1}% {:>10.1} {:>10.1} {:>10.1} {:>10.1}",
        summary.strategy,
        summary.total_requests,
        summary.success_rate_percent,
        summary.average_rpm,
        summary.expected_good_rpm,
        summary.target_rpm.p50,
        summary.target_rpm.p95,
    );
}

fn main() -> Result<(), Box<dyn Error>> {
    init_simulation_logging();

    let mut args = std::env::args().skip(1);
    let config_path = args.next().map(PathBuf::from);
    let output_stem = args.next().map(PathBuf::from);

    let configs = match &config_path {
        Some(path) => vec![RunConfig::from_json_file(path)?],
        None => StrategyKind::ALL
            .iter()
            .map(|kind| RunConfig {
                seed: 42,
                strategy: StrategySpec::new(*kind),
                ..RunConfig::default()
            })
            .collect(),
    };

    println!(
        "{:<26} {:>8} {:>9} {:>10} {:>10} {:>10} {:>10}",
        "strategy", "requests", "success", "avg rpm", "good rpm", "p50 target", "p95 target"
    );

    for config in &configs {
        let (sim, summary) = run(config)?;
        print_row(&summary);

        if let Some(stem) = &output_stem {
            let name = stem
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "run".to_string());
            let base = stem.with_file_name(format!("{name}_{}", config.strategy.kind.key()));

            let snapshot = sim.snapshot();
            export_json(&snapshot, base.with_extension("json"), true)?;
            export_csv(&snapshot, base.with_extension("csv"))?;
        }
    }

    Ok(())
}

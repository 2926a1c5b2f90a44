//! Headless runs built from configuration files.

use ratesim::metrics::{export_csv, export_json};
use ratesim::prelude::*;
use std::time::Duration;

#[test]
fn test_config_file_to_exported_run() {
    let dir = std::env::temp_dir().join("ratesim_headless_test");
    std::fs::create_dir_all(&dir).unwrap();

    let config_path = dir.join("run.json");
    std::fs::write(
        &config_path,
        r#"{
            "seed": 5,
            "server": { "max_rpm": 80, "bad_response_percentage": 5 },
            "strategy": { "kind": "safe_bound", "params": { "probe_factor": 0.5 } }
        }"#,
    )
    .unwrap();

    let config = RunConfig::from_json_file(&config_path).unwrap();
    let mut sim = config.build().unwrap();
    Executor::timed(SimTime::from_secs(90)).execute(&mut sim);

    let snapshot = sim.snapshot();
    assert_eq!(snapshot.strategy, "SafeBound");
    assert!(snapshot.stats.total_requests > 0);

    export_json(&snapshot, dir.join("out.json"), false).unwrap();
    export_csv(&snapshot, dir.join("out.csv")).unwrap();
    assert!(dir.join("out.json").exists());
    assert!(dir.join("out_samples.csv").exists());
    assert!(dir.join("out_buckets.csv").exists());

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_same_config_same_outcomes() {
    let config = RunConfig {
        seed: 123,
        strategy: StrategySpec::new(StrategyKind::MultiplicativeAdjustment),
        ..RunConfig::default()
    };

    let outcomes = || {
        let mut sim = config.build().unwrap();
        Executor::timed(SimTime::from_secs(60)).execute(&mut sim);
        sim.snapshot().samples
    };
    assert_eq!(outcomes(), outcomes());
}

#[test]
fn test_live_reconfiguration_between_ticks() {
    let mut sim = RunConfig::default().build().unwrap();
    sim.advance(Duration::from_secs(10));

    sim.apply(SimulationCommand::SelectStrategy {
        controller: StrategyKind::ConstantAdjustment.build(),
        full_reset: false,
    })
    .unwrap();
    sim.apply(SimulationCommand::UpdateTimeConfig(TimeConfig::new(5.0, true, 30.0)))
        .unwrap();
    sim.advance(Duration::from_secs(2));

    assert_eq!(sim.time(), SimTime::from_secs(20));
    assert_eq!(sim.controller().name(), "Constant Adjustment");
    assert!(sim.stats().total_requests > 0);
}

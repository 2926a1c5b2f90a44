//! End-to-end checks of aggregation, summaries and metric capture on real runs.

use ratesim_components::{SlidingWindowServer, StrategyKind};
use ratesim_core::{Execute, Executor, ServerConfig, SimTime, Simulation, TimeConfig};
use ratesim_metrics::{
    with_captured_metrics, CapturedMetrics, RunSummary, TimeSeriesAggregator,
};
use std::sync::{Arc, Mutex};

fn run(kind: StrategyKind, secs: u64) -> Simulation {
    let mut sim = Simulation::new(
        kind.build(),
        Box::new(SlidingWindowServer::with_seed(ServerConfig::default(), 11)),
        TimeConfig::default(),
    );
    Executor::timed(SimTime::from_secs(secs)).execute(&mut sim);
    sim
}

#[test]
fn test_driver_emits_request_counters() {
    let captured = Arc::new(Mutex::new(CapturedMetrics::default()));

    let sim = with_captured_metrics(&captured, || run(StrategyKind::Aimd, 60));

    let captured = captured.lock().unwrap();
    let good = captured
        .counter("ratesim_requests_total", &[("outcome", "good")])
        .unwrap_or(0);
    let bad = captured
        .counter("ratesim_requests_total", &[("outcome", "bad")])
        .unwrap_or(0);
    assert_eq!(good + bad, sim.stats().total_requests);
    assert_eq!(good, sim.stats().good_requests);
    assert_eq!(
        captured.gauge("ratesim_target_rpm", &[]),
        Some(sim.controller().current_rate())
    );
}

#[test]
fn test_summary_matches_statistics() {
    let sim = run(StrategyKind::SafeBound, 120);
    let snapshot = sim.snapshot();
    let summary = RunSummary::from_snapshot(&snapshot).unwrap();

    println!("{summary:#?}");

    assert_eq!(summary.strategy, "SafeBound");
    assert_eq!(summary.total_requests, snapshot.stats.total_requests);
    assert_eq!(
        summary.good_requests + summary.bad_requests,
        summary.total_requests
    );
    assert_eq!(summary.target_rpm.count, snapshot.samples.len() as u64);
    assert!(summary.target_rpm.p50 <= summary.target_rpm.p95);
    assert!(summary.target_rpm.p95 <= summary.target_rpm.max);
    assert!(summary.target_rpm.max <= 300.0 + 0.5);
}

#[test]
fn test_aggregating_a_live_window_twice_is_identical() {
    let mut sim = run(StrategyKind::StatsLerp, 45);
    let aggregator = TimeSeriesAggregator::default();

    let first = aggregator.aggregate(&sim.snapshot().samples);
    let second = aggregator.aggregate(&sim.snapshot().samples);
    assert_eq!(first, second);
    assert!(first.coarse.len() <= 15);

    // Continuing the run changes the window, and the view follows.
    sim.advance(std::time::Duration::from_secs(5));
    let third = aggregator.aggregate(&sim.snapshot().samples);
    assert!(third.fine.last().is_some_and(|b| b.time_ago_secs == 0.0));
}

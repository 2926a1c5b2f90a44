//! Structured logging for rate-control simulations
//!
//! # Controlling output
//!
//! ```bash
//! # Default (info level)
//! cargo run --example headless_run
//!
//! # Every processed request
//! RUST_LOG=ratesim_core::simulation=trace cargo run --example headless_run
//!
//! # Multiple modules
//! RUST_LOG=ratesim_core=debug,ratesim_components=trace cargo run --example headless_run
//! ```
//!
//! # Levels
//! - **TRACE**: per-request processing, clock advances, random draws
//! - **DEBUG**: strategy parameter changes, window trimming
//! - **INFO**: run lifecycle, strategy switches, reconfiguration, resets
//! - **WARN**: inputs that had to be corrected

use crate::time::SimTime;
use tracing::{debug, info, trace, Span};
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging at `info`, honoring `RUST_LOG` when set.
pub fn init_simulation_logging() {
    init_simulation_logging_with_level("info")
}

/// Initialize logging with a default level for the ratesim crates.
///
/// Does nothing if a global subscriber is already installed.
///
/// # Example
/// ```rust
/// use ratesim_core::logging::init_simulation_logging_with_level;
///
/// init_simulation_logging_with_level("debug");
/// ```
pub fn init_simulation_logging_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("warn,ratesim={level},ratesim_core={level},ratesim_components={level},ratesim_metrics={level}")
            .into()
    });

    let installed = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .try_init()
        .is_ok();

    if installed {
        info!("Simulation logging initialized at level: {}", level);
    }
}

/// Trace-level, pretty-printed logging for stepping through a run.
pub fn init_detailed_simulation_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "info,ratesim_core=trace,ratesim_components=trace,ratesim_metrics=debug".into()
    });

    let installed = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_file(true)
                .with_line_number(true)
                .pretty(),
        )
        .with(filter)
        .try_init()
        .is_ok();

    if installed {
        info!("Detailed simulation logging initialized");
    }
}

/// Span covering a whole run.
pub fn simulation_span(name: &str) -> Span {
    tracing::info_span!("simulation", name = name)
}

/// Span covering one tick of the driver.
pub fn tick_span(now: SimTime) -> Span {
    tracing::trace_span!("tick", now = %now)
}

/// Named log points for driver lifecycle events.
pub mod events {
    use super::*;

    pub fn request_processed(
        at: SimTime,
        was_successful: bool,
        target_rpm: f64,
        actual_rpm: f64,
    ) {
        trace!(
            at = %at,
            was_successful,
            target_rpm,
            actual_rpm,
            "Request processed"
        );
    }

    pub fn strategy_switched(from: &str, to: &str, full_reset: bool) {
        info!(from, to, full_reset, "Rate-control strategy switched");
    }

    pub fn parameter_changed(strategy: &str, name: &str, value: f64) {
        debug!(strategy, name, value, "Strategy parameter changed");
    }

    pub fn server_reconfigured(max_rpm: f64, bad_response_percentage: f64, requests_to_track: usize) {
        info!(
            max_rpm,
            bad_response_percentage,
            requests_to_track,
            "Server reconfigured"
        );
    }

    pub fn simulation_reset(at: SimTime) {
        info!(at = %at, "Simulation reset to time zero");
    }

    pub fn run_completed(final_time: SimTime, requests: u64, success_rate_percent: f64) {
        info!(
            final_time = %final_time,
            requests,
            success_rate_percent,
            "Simulation run completed"
        );
    }
}

//! # ratesim - closed-loop request-rate control simulator
//!
//! A client-side rate strategy picks a target request rate, a simulated server
//! succeeds or fails requests depending on load, and the strategy adapts to the
//! feedback. Everything runs on a virtual clock, so experiments are fast and
//! reproducible for a fixed seed.
//!
//! ## Quick Start
//!
//! ```rust
//! use ratesim::prelude::*;
//!
//! let config = RunConfig {
//!     strategy: StrategySpec::new(StrategyKind::Aimd).param("add_increase", 2.0),
//!     ..RunConfig::default()
//! };
//! let mut sim = config.build().unwrap();
//! Executor::timed(SimTime::from_secs(60)).execute(&mut sim);
//!
//! let summary = RunSummary::from_snapshot(&sim.snapshot()).unwrap();
//! assert!(summary.total_requests > 0);
//! ```
//!
//! ## Crates
//!
//! - [`core`]: virtual clock, traits, driver and executor
//! - [`components`]: the six strategies and the sliding-window server
//! - [`metrics`]: aggregation, summaries, export
//!
//! ## Examples
//!
//! See `examples/headless_run.rs` for a configurable headless run.

pub use ratesim_components as components;
pub use ratesim_core as core;
pub use ratesim_metrics as metrics;

pub mod config;

pub use config::{ConfigError, RunConfig, StrategySpec};

// Convenience re-exports of commonly used items
pub mod prelude {
    //! Commonly used types and traits

    pub use ratesim_core::{
        Execute, Executor, RateController, ServerConfig, ServerModel, SimTime, Simulation,
        SimulationCommand, SimulationSnapshot, TimeConfig,
    };

    pub use ratesim_components::{SlidingWindowServer, StrategyKind};

    pub use ratesim_metrics::{RunSummary, TimeSeriesAggregator};

    pub use crate::config::{ConfigError, RunConfig, StrategySpec};
}

//! Core of the closed-loop request-rate simulator.
//!
//! A strategy picks a target request rate, a simulated server accepts or
//! rejects requests depending on load, and the strategy reacts to the
//! feedback. This crate holds everything that is independent of any concrete
//! strategy or server model:
//!
//! - [`SimTime`] and the [`VirtualClock`] mapping wall-clock ticks onto virtual
//!   time at a configurable multiplier.
//! - The [`RateController`] and [`ServerModel`] traits the driver talks to.
//! - [`Simulation`], the driver: advance virtual time, drain every request that
//!   became due, record samples and statistics.
//! - [`Executor`] for headless runs, plus logging, randomness and config types.
//!
//! # Time Model
//!
//! The driver advances virtual time by `real_elapsed * time_scale` on every
//! tick, then processes each request whose due instant has passed, in order,
//! at the tick's virtual instant. Several requests can become due in one tick;
//! none are skipped, and the next one is still scheduled from the exact due
//! instant of the previous.
//!
//! # Basic Usage
//!
//! ```rust,ignore
//! use ratesim_core::{Execute, Executor, SimTime, Simulation, TimeConfig};
//!
//! let mut sim = Simulation::new(controller, server, TimeConfig::default());
//! Executor::timed(SimTime::from_secs(60)).execute(&mut sim);
//! println!("{:?}", sim.snapshot().stats);
//! ```

pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod execute;
pub mod logging;
pub mod randomness;
pub mod sample;
pub mod server;
pub mod simulation;
pub mod time;
pub mod window;

pub use clock::VirtualClock;
pub use config::{ServerConfig, TimeConfig};
pub use controller::{ParameterDescriptor, RateBounds, RateController, RATE_CEILING, RATE_FLOOR};
pub use error::SimError;
pub use execute::{Execute, Executor, DEFAULT_FRAME};
pub use logging::{
    init_detailed_simulation_logging, init_simulation_logging, init_simulation_logging_with_level,
    simulation_span, tick_span,
};
pub use randomness::{DrawSite, RandomProvider, ScriptedRandom, SeededRandom};
pub use sample::{AccumulatedStats, SamplePoint};
pub use server::ServerModel;
pub use simulation::{request_interval, Simulation, SimulationCommand, SimulationSnapshot};
pub use time::SimTime;
pub use window::SlidingWindow;

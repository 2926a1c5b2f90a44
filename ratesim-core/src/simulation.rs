//! The closed-loop simulation driver
//!
//! Each tick advances the virtual clock and then drains every request that
//! became due: the server decides the outcome at the current virtual instant,
//! the strategy turns the outcome into a new target rate, a sample is recorded
//! and the next request is scheduled `60 / target` seconds after the previous
//! one was due. Requests that pile up within one tick all share the tick's
//! timestamp, which is what saturates the server at high time scales.

use crate::clock::VirtualClock;
use crate::config::{ServerConfig, TimeConfig};
use crate::controller::{ParameterDescriptor, RateController, RATE_CEILING, RATE_FLOOR};
use crate::error::SimError;
use crate::logging::{events, tick_span};
use crate::sample::{AccumulatedStats, SamplePoint};
use crate::server::ServerModel;
use crate::time::SimTime;
use crate::window::SlidingWindow;
use metrics::{counter, gauge};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Owned copy of the driver state for presentation layers.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationSnapshot {
    pub time: SimTime,
    pub strategy: &'static str,
    pub target_rpm: f64,
    pub current_rpm: f64,
    pub server_config: ServerConfig,
    pub time_config: TimeConfig,
    pub samples: Vec<SamplePoint>,
    pub stats: AccumulatedStats,
    pub parameters: Vec<ParameterDescriptor>,
}

/// Operator commands accepted between ticks.
#[derive(Debug)]
pub enum SimulationCommand {
    /// Replace the active strategy. Resets statistics, and everything else
    /// too when `full_reset` is set.
    SelectStrategy {
        controller: Box<dyn RateController>,
        full_reset: bool,
    },
    /// Change one strategy parameter. Resets statistics only.
    SetParameter { name: String, value: f64 },
    /// Resets the server window and statistics, keeps sample history.
    UpdateServerConfig(ServerConfig),
    /// Pacing and retention only, no state is reset.
    UpdateTimeConfig(TimeConfig),
    /// Back to time zero.
    Reset,
}

/// Single-threaded driver owning the clock, samples and statistics.
///
/// # Example
///
/// ```rust,ignore
/// use ratesim_components::{AimdController, SlidingWindowServer};
/// use ratesim_core::{ServerConfig, Simulation, TimeConfig};
/// use std::time::Duration;
///
/// let mut sim = Simulation::new(
///     Box::new(AimdController::default()),
///     Box::new(SlidingWindowServer::new(ServerConfig::default())),
///     TimeConfig::default(),
/// );
/// sim.advance(Duration::from_secs(10));
/// let snapshot = sim.snapshot();
/// ```
#[derive(Debug)]
pub struct Simulation {
    controller: Box<dyn RateController>,
    server: Box<dyn ServerModel>,
    clock: VirtualClock,
    samples: SlidingWindow<SamplePoint>,
    stats: AccumulatedStats,
    time_config: TimeConfig,
}

impl Simulation {
    pub fn new(
        controller: Box<dyn RateController>,
        server: Box<dyn ServerModel>,
        time_config: TimeConfig,
    ) -> Self {
        Self {
            controller,
            server,
            clock: VirtualClock::new(),
            samples: SlidingWindow::unbounded(),
            stats: AccumulatedStats::default(),
            time_config: time_config.normalized(),
        }
    }

    /// Tick against the real wall clock.
    pub fn tick(&mut self) -> usize {
        self.tick_at(Instant::now())
    }

    /// Tick against an injected wall-clock instant. Returns the number of
    /// requests processed.
    pub fn tick_at(&mut self, wall: Instant) -> usize {
        if !self.time_config.is_playing {
            self.clock.resync(wall);
            return 0;
        }
        self.clock.advance_to_wall(wall, self.time_config.time_scale);
        self.drain_due()
    }

    /// Advance by `real_elapsed` of real time, for callers without a wall clock.
    pub fn advance(&mut self, real_elapsed: Duration) -> usize {
        if !self.time_config.is_playing {
            return 0;
        }
        self.clock.advance_real(real_elapsed, self.time_config.time_scale);
        self.drain_due()
    }

    fn drain_due(&mut self) -> usize {
        let _span = tick_span(self.clock.now()).entered();
        let mut processed = 0;

        // Every request due in this tick hits the server at the tick's instant;
        // only the schedule keeps the exact due times.
        let now = self.clock.now();
        while let Some(due) = self.clock.pop_due() {
            let was_good = self.server.process_request(now);
            let target_rpm = self.controller.process_result(was_good);
            let actual_rpm = self.server.current_rpm();

            self.record(SamplePoint {
                relative_time_secs: now.as_secs_f64(),
                target_rpm,
                actual_rpm,
                was_good,
            });
            events::request_processed(now, was_good, target_rpm, actual_rpm);

            self.clock.schedule_at(due + request_interval(target_rpm));
            processed += 1;
        }

        if processed > 0 {
            self.evict_expired();
        }
        processed
    }

    fn record(&mut self, sample: SamplePoint) {
        self.stats.record(&sample);
        self.samples.push(sample);

        let outcome = if sample.was_good { "good" } else { "bad" };
        counter!("ratesim_requests_total", "outcome" => outcome).increment(1);
        gauge!("ratesim_target_rpm").set(sample.target_rpm);
        gauge!("ratesim_actual_rpm").set(sample.actual_rpm);
    }

    /// Drop samples older than the retention horizon, measured from the newest.
    fn evict_expired(&mut self) {
        let Some(latest) = self.samples.back().map(|s| s.relative_time_secs) else {
            return;
        };
        let horizon = self.time_config.time_window;
        let evicted = self
            .samples
            .evict_while(|s| latest - s.relative_time_secs > horizon);
        if evicted > 0 {
            debug!(evicted, retained = self.samples.len(), "Evicted expired samples");
        }
    }

    pub fn apply(&mut self, command: SimulationCommand) -> Result<(), SimError> {
        match command {
            SimulationCommand::SelectStrategy {
                controller,
                full_reset,
            } => {
                self.select_strategy(controller, full_reset);
                Ok(())
            }
            SimulationCommand::SetParameter { name, value } => self.set_parameter(&name, value),
            SimulationCommand::UpdateServerConfig(config) => {
                self.update_server_config(config);
                Ok(())
            }
            SimulationCommand::UpdateTimeConfig(config) => {
                self.update_time_config(config);
                Ok(())
            }
            SimulationCommand::Reset => {
                self.reset();
                Ok(())
            }
        }
    }

    pub fn select_strategy(&mut self, controller: Box<dyn RateController>, full_reset: bool) {
        events::strategy_switched(self.controller.name(), controller.name(), full_reset);
        self.controller = controller;
        self.stats.reset();
        if full_reset {
            self.reset();
        }
    }

    pub fn set_parameter(&mut self, name: &str, value: f64) -> Result<(), SimError> {
        self.controller.set_parameter(name, value)?;
        events::parameter_changed(self.controller.name(), name, value);
        self.stats.reset();
        Ok(())
    }

    pub fn update_server_config(&mut self, config: ServerConfig) {
        let normalized = config.normalized();
        if normalized != config {
            warn!(requested = ?config, applied = ?normalized, "Server configuration was clamped");
        }
        self.server.update_config(normalized);
        self.server.reset();
        self.stats.reset();
        events::server_reconfigured(
            normalized.max_rpm,
            normalized.bad_response_percentage,
            normalized.requests_to_track,
        );
    }

    pub fn update_time_config(&mut self, config: TimeConfig) {
        self.time_config = config.normalized();
        self.evict_expired();
    }

    pub fn set_playing(&mut self, is_playing: bool) {
        self.time_config.is_playing = is_playing;
    }

    /// Clear samples, statistics, strategy state, server window and clock.
    pub fn reset(&mut self) {
        events::simulation_reset(self.clock.now());
        self.samples.clear();
        self.stats.reset();
        self.controller.reset();
        self.server.reset();
        self.clock.reset();
    }

    #[must_use]
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            time: self.clock.now(),
            strategy: self.controller.name(),
            target_rpm: self.controller.current_rate(),
            current_rpm: self.server.current_rpm(),
            server_config: self.server.config(),
            time_config: self.time_config,
            samples: self.samples.to_vec(),
            stats: self.stats,
            parameters: self.controller.describe_parameters(),
        }
    }

    pub fn time(&self) -> SimTime {
        self.clock.now()
    }

    /// When the next request will be issued.
    pub fn next_request_at(&self) -> Option<SimTime> {
        self.clock.next_due()
    }

    pub fn controller(&self) -> &dyn RateController {
        self.controller.as_ref()
    }

    pub fn server(&self) -> &dyn ServerModel {
        self.server.as_ref()
    }

    pub fn samples(&self) -> &SlidingWindow<SamplePoint> {
        &self.samples
    }

    pub fn stats(&self) -> &AccumulatedStats {
        &self.stats
    }

    pub fn time_config(&self) -> &TimeConfig {
        &self.time_config
    }
}

/// Gap between consecutive requests at `rate_rpm`.
///
/// Rates outside `[RATE_FLOOR, RATE_CEILING]` are pulled in so the interval
/// is always positive and bounded.
pub fn request_interval(rate_rpm: f64) -> Duration {
    let rate = if rate_rpm.is_finite() {
        rate_rpm.clamp(RATE_FLOOR, RATE_CEILING)
    } else {
        RATE_FLOOR
    };
    Duration::from_secs_f64(60.0 / rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_interval() {
        assert_eq!(request_interval(60.0), Duration::from_secs(1));
        assert_eq!(request_interval(120.0), Duration::from_millis(500));
        assert_eq!(request_interval(0.0), Duration::from_secs(60));
        assert_eq!(request_interval(f64::NAN), Duration::from_secs(60));
        assert!((request_interval(1e9).as_secs_f64() - 0.06).abs() < 1e-9);
    }
}

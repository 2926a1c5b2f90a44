//! Sliding-window server model
//!
//! The server keeps the timestamps of its most recent requests, estimates its
//! own throughput from them, and rejects everything while that estimate is
//! above capacity. Below capacity a configurable share of requests still fails
//! at random.

use ratesim_core::{
    draw_site, RandomProvider, SeededRandom, ServerConfig, ServerModel, SimTime, SlidingWindow,
};
use tracing::{debug, trace, warn};

/// Throughput reported when every tracked request shares one instant.
///
/// Any burst with zero elapsed time counts as saturating load.
pub const SATURATED_RPM: f64 = 300.0;

/// Server whose load is the request rate over its last `requests_to_track`
/// requests.
///
/// Throughput is `(n - 1) / elapsed_minutes` between the oldest and newest
/// tracked request: 0 with fewer than two, [`SATURATED_RPM`] when they share
/// a timestamp. A request is rejected outright while throughput exceeds
/// `max_rpm`, and otherwise fails with probability
/// `bad_response_percentage / 100`.
#[derive(Debug)]
pub struct SlidingWindowServer {
    config: ServerConfig,
    /// Timestamps of the tracked requests, oldest first
    window: SlidingWindow<SimTime>,
    rng: Box<dyn RandomProvider>,
    /// Total requests seen
    pub requests_processed: u64,
    /// Requests rejected because throughput exceeded `max_rpm`
    pub requests_rejected_overload: u64,
    /// Admitted requests that failed the random draw
    pub requests_failed_random: u64,
}

impl SlidingWindowServer {
    /// Server drawing from a `StdRng` seeded with 0.
    pub fn new(config: ServerConfig) -> Self {
        Self::with_random(config, Box::new(SeededRandom::default()))
    }

    pub fn with_seed(config: ServerConfig, seed: u64) -> Self {
        Self::with_random(config, Box::new(SeededRandom::new(seed)))
    }

    /// Server drawing admission outcomes from `rng`.
    pub fn with_random(config: ServerConfig, rng: Box<dyn RandomProvider>) -> Self {
        let config = config.normalized();
        Self {
            window: SlidingWindow::bounded(config.requests_to_track),
            config,
            rng,
            requests_processed: 0,
            requests_rejected_overload: 0,
            requests_failed_random: 0,
        }
    }

    /// Number of tracked timestamps.
    pub fn tracked(&self) -> usize {
        self.window.len()
    }

    /// Whether the current throughput estimate is above capacity.
    pub fn is_overloaded(&self) -> bool {
        self.current_rpm() > self.config.max_rpm
    }
}

impl ServerModel for SlidingWindowServer {
    fn process_request(&mut self, timestamp: SimTime) -> bool {
        let timestamp = match self.window.back() {
            Some(&newest) if timestamp < newest => {
                warn!(
                    timestamp = %timestamp,
                    newest = %newest,
                    "Out-of-order request timestamp clamped to newest"
                );
                newest
            }
            _ => timestamp,
        };

        self.window.push(timestamp);
        self.requests_processed += 1;

        let rpm = self.current_rpm();
        if rpm > self.config.max_rpm {
            self.requests_rejected_overload += 1;
            trace!(rpm, max_rpm = self.config.max_rpm, "Request rejected, server overloaded");
            return false;
        }

        let draw = self.rng.sample_unit(draw_site!("admission"));
        let was_successful = draw >= self.config.bad_response_percentage / 100.0;
        if !was_successful {
            self.requests_failed_random += 1;
        }
        trace!(rpm, draw, was_successful, "Request admitted");
        was_successful
    }

    fn current_rpm(&self) -> f64 {
        let (Some(&oldest), Some(&newest)) = (self.window.front(), self.window.back()) else {
            return 0.0;
        };
        if self.window.len() < 2 {
            return 0.0;
        }

        let minutes = newest.minutes_since(oldest);
        if minutes <= 0.0 {
            return SATURATED_RPM;
        }
        (self.window.len() - 1) as f64 / minutes
    }

    fn config(&self) -> ServerConfig {
        self.config
    }

    fn update_config(&mut self, config: ServerConfig) {
        self.config = config.normalized();
        let trimmed = self
            .window
            .set_capacity(Some(self.config.requests_to_track));
        debug!(
            max_rpm = self.config.max_rpm,
            bad_response_percentage = self.config.bad_response_percentage,
            requests_to_track = self.config.requests_to_track,
            trimmed,
            "Server configuration updated"
        );
    }

    fn reset(&mut self) {
        self.window.clear();
        self.requests_processed = 0;
        self.requests_rejected_overload = 0;
        self.requests_failed_random = 0;
    }
}

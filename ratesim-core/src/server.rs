//! Server model contract

use crate::config::ServerConfig;
use crate::time::SimTime;
use std::fmt;

/// Simulated server answering admission decisions at virtual instants.
pub trait ServerModel: Send + fmt::Debug {
    /// Record a request at `timestamp` and decide whether it succeeds.
    fn process_request(&mut self, timestamp: SimTime) -> bool;

    /// Throughput measured over the tracked window, in requests per minute.
    fn current_rpm(&self) -> f64;

    fn config(&self) -> ServerConfig;

    /// Replace the configuration. Does not recompute throughput.
    fn update_config(&mut self, config: ServerConfig);

    /// Forget every tracked request.
    fn reset(&mut self);
}

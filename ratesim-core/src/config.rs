//! Server and time configuration
//!
//! Both structs are normalized on entry: out-of-range values are pulled to the
//! nearest valid bound instead of being rejected.

use serde::{Deserialize, Serialize};

/// Smallest accepted `max_rpm`.
pub const MIN_SERVER_RPM: f64 = 1.0;
/// Smallest window that still yields a throughput estimate.
pub const MIN_REQUESTS_TO_TRACK: usize = 2;
pub const MIN_TIME_SCALE: f64 = 0.01;
pub const MAX_TIME_SCALE: f64 = 1000.0;
/// Shortest retention horizon, in seconds.
pub const MIN_TIME_WINDOW_SECS: f64 = 1.0;

/// Configuration of the simulated server.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Throughput above which every request is rejected
    pub max_rpm: f64,
    /// Probability (in percent) that an admitted request still fails
    pub bad_response_percentage: f64,
    /// Number of recent requests used to estimate throughput
    pub requests_to_track: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_rpm: 100.0,
            bad_response_percentage: 10.0,
            requests_to_track: 10,
        }
    }
}

impl ServerConfig {
    pub fn new(max_rpm: f64, bad_response_percentage: f64, requests_to_track: usize) -> Self {
        Self {
            max_rpm,
            bad_response_percentage,
            requests_to_track,
        }
        .normalized()
    }

    /// Returns a copy with every field clamped into its valid range.
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        Self {
            max_rpm: finite_or(self.max_rpm, defaults.max_rpm).max(MIN_SERVER_RPM),
            bad_response_percentage: finite_or(
                self.bad_response_percentage,
                defaults.bad_response_percentage,
            )
            .clamp(0.0, 100.0),
            requests_to_track: self.requests_to_track.max(MIN_REQUESTS_TO_TRACK),
        }
    }
}

/// Pacing and retention configuration of the driver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    /// Virtual milliseconds per real millisecond
    pub time_scale: f64,
    pub is_playing: bool,
    /// Retention horizon for samples, in seconds
    pub time_window: f64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            is_playing: true,
            time_window: 30.0,
        }
    }
}

impl TimeConfig {
    pub fn new(time_scale: f64, is_playing: bool, time_window: f64) -> Self {
        Self {
            time_scale,
            is_playing,
            time_window,
        }
        .normalized()
    }

    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        Self {
            time_scale: finite_or(self.time_scale, defaults.time_scale)
                .clamp(MIN_TIME_SCALE, MAX_TIME_SCALE),
            is_playing: self.is_playing,
            time_window: finite_or(self.time_window, defaults.time_window)
                .max(MIN_TIME_WINDOW_SECS),
        }
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

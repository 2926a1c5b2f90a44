//! Virtual simulation time

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};
use std::time::Duration;

const NANOS_PER_SEC: f64 = 1_000_000_000.0;
const NANOS_PER_MINUTE: f64 = 60.0 * NANOS_PER_SEC;

/// A point in virtual time, stored as nanoseconds since the start of the run.
///
/// Virtual time only moves when the driver advances its clock, so it is
/// unaffected by how long the host actually took to compute a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimTime(u64);

impl SimTime {
    pub const fn zero() -> Self {
        SimTime(0)
    }

    pub const fn from_nanos(nanos: u64) -> Self {
        SimTime(nanos)
    }

    pub const fn from_millis(millis: u64) -> Self {
        SimTime(millis * 1_000_000)
    }

    pub const fn from_secs(secs: u64) -> Self {
        SimTime(secs * 1_000_000_000)
    }

    pub fn from_duration(duration: Duration) -> Self {
        SimTime(duration.as_nanos().min(u64::MAX as u128) as u64)
    }

    /// Converts fractional seconds, saturating negative and NaN inputs to zero.
    pub fn from_secs_f64(secs: f64) -> Self {
        if secs.is_nan() || secs <= 0.0 {
            return SimTime::zero();
        }
        SimTime((secs * NANOS_PER_SEC).min(u64::MAX as f64) as u64)
    }

    pub const fn as_nanos(&self) -> u64 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_nanos(self.0)
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / NANOS_PER_SEC
    }

    pub fn as_millis_f64(&self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    /// Minutes elapsed since `earlier`, zero if `earlier` is later than `self`.
    pub fn minutes_since(&self, earlier: SimTime) -> f64 {
        self.0.saturating_sub(earlier.0) as f64 / NANOS_PER_MINUTE
    }

    pub fn duration_since(&self, earlier: SimTime) -> Duration {
        Duration::from_nanos(self.0.saturating_sub(earlier.0))
    }

    pub fn add_nanos(&self, nanos: u64) -> Self {
        SimTime(self.0.saturating_add(nanos))
    }
}

impl Add<Duration> for SimTime {
    type Output = SimTime;

    fn add(self, rhs: Duration) -> Self::Output {
        self.add_nanos(rhs.as_nanos().min(u64::MAX as u128) as u64)
    }
}

impl AddAssign<Duration> for SimTime {
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs;
    }
}

impl Sub<SimTime> for SimTime {
    type Output = Duration;

    fn sub(self, rhs: SimTime) -> Self::Output {
        self.duration_since(rhs)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let duration = self.as_duration();
        let secs = duration.as_secs();
        let millis = duration.subsec_millis();

        if secs > 0 {
            write!(f, "{secs}.{millis:03}s")
        } else {
            let micros = duration.subsec_micros() % 1000;
            write!(f, "{millis}.{micros:03}ms")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simtime_units() {
        assert_eq!(SimTime::from_millis(1).as_nanos(), 1_000_000);
        assert_eq!(SimTime::from_secs(2).as_millis_f64(), 2000.0);
        assert_eq!(SimTime::from_secs_f64(1.5).as_nanos(), 1_500_000_000);
    }

    #[test]
    fn test_from_secs_f64_saturates_bad_input() {
        assert_eq!(SimTime::from_secs_f64(-3.0), SimTime::zero());
        assert_eq!(SimTime::from_secs_f64(f64::NAN), SimTime::zero());
    }

    #[test]
    fn test_minutes_since() {
        let t0 = SimTime::zero();
        let t1 = SimTime::from_secs(30);
        assert!((t1.minutes_since(t0) - 0.5).abs() < 1e-12);
        assert_eq!(t0.minutes_since(t1), 0.0);
    }

    #[test]
    fn test_arithmetic_and_display() {
        let t = SimTime::from_millis(100) + Duration::from_millis(25);
        assert_eq!(t, SimTime::from_millis(125));
        assert_eq!(t - SimTime::from_millis(25), Duration::from_millis(100));
        assert_eq!(SimTime::from_millis(1500).to_string(), "1.500s");
        assert_eq!(SimTime::from_millis(12).to_string(), "12.000ms");
    }
}

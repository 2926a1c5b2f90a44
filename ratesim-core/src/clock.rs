//! Virtual clock and due-event bookkeeping
//!
//! The clock maps wall-clock ticks onto virtual time: each tick's real elapsed
//! time is scaled by the configured multiplier and added to the virtual
//! instant. Sub-nanosecond leftovers are carried into the next tick so that
//! jittery frame lengths still add up to the right virtual duration.
//!
//! The clock also owns the single pending "next request" instant. The driver
//! drains it with [`VirtualClock::pop_due`] and re-arms it with
//! [`VirtualClock::schedule_at`], which is the whole discrete-event loop.

use crate::time::SimTime;
use std::time::{Duration, Instant};
use tracing::trace;

#[derive(Debug, Clone)]
pub struct VirtualClock {
    now: SimTime,
    next_due: Option<SimTime>,
    /// Fractional nanoseconds not yet applied to `now`
    remainder_nanos: f64,
    /// Wall-clock reference of the previous tick
    last_wall: Option<Instant>,
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualClock {
    /// A clock at time zero with the first event due immediately.
    pub fn new() -> Self {
        Self {
            now: SimTime::zero(),
            next_due: Some(SimTime::zero()),
            remainder_nanos: 0.0,
            last_wall: None,
        }
    }

    #[must_use]
    pub fn now(&self) -> SimTime {
        self.now
    }

    #[must_use]
    pub fn next_due(&self) -> Option<SimTime> {
        self.next_due
    }

    pub fn remainder_nanos(&self) -> f64 {
        self.remainder_nanos
    }

    /// Move the wall-clock reference to `wall` without advancing virtual time.
    pub fn resync(&mut self, wall: Instant) {
        self.last_wall = Some(wall);
    }

    /// Advance by the real time elapsed since the previous wall reference.
    ///
    /// The first call only establishes the reference.
    pub fn advance_to_wall(&mut self, wall: Instant, time_scale: f64) -> SimTime {
        let elapsed = match self.last_wall {
            Some(last) => wall.saturating_duration_since(last),
            None => Duration::ZERO,
        };
        self.last_wall = Some(wall);
        self.advance_real(elapsed, time_scale)
    }

    /// Advance by `real_elapsed` scaled by `time_scale`, carrying the fraction.
    pub fn advance_real(&mut self, real_elapsed: Duration, time_scale: f64) -> SimTime {
        let scaled = real_elapsed.as_nanos() as f64 * time_scale.max(0.0) + self.remainder_nanos;
        let whole = scaled.floor();
        self.remainder_nanos = scaled - whole;
        self.now = self.now.add_nanos(whole as u64);
        trace!(
            real_elapsed = ?real_elapsed,
            time_scale,
            now = %self.now,
            "Virtual clock advanced"
        );
        self.now
    }

    /// Take the pending instant if it is due at or before `now`.
    pub fn pop_due(&mut self) -> Option<SimTime> {
        match self.next_due {
            Some(due) if due <= self.now => self.next_due.take(),
            _ => None,
        }
    }

    pub fn schedule_at(&mut self, due: SimTime) {
        self.next_due = Some(due);
    }

    /// Back to time zero with the first event due immediately.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_advance() {
        let mut clock = VirtualClock::new();
        clock.advance_real(Duration::from_millis(10), 3.0);
        assert_eq!(clock.now(), SimTime::from_millis(30));
    }

    #[test]
    fn test_fraction_is_carried() {
        let mut clock = VirtualClock::new();
        // 1ns * 0.4 three times: 0.4, 0.8, 1.2 -> one whole nanosecond
        for _ in 0..3 {
            clock.advance_real(Duration::from_nanos(1), 0.4);
        }
        assert_eq!(clock.now().as_nanos(), 1);
        assert!((clock.remainder_nanos() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_first_wall_tick_only_sets_reference() {
        let start = Instant::now();
        let mut clock = VirtualClock::new();
        clock.advance_to_wall(start, 1.0);
        assert_eq!(clock.now(), SimTime::zero());

        clock.advance_to_wall(start + Duration::from_millis(16), 2.0);
        assert_eq!(clock.now(), SimTime::from_millis(32));
    }

    #[test]
    fn test_resync_skips_paused_interval() {
        let start = Instant::now();
        let mut clock = VirtualClock::new();
        clock.advance_to_wall(start, 1.0);
        clock.resync(start + Duration::from_secs(60));
        clock.advance_to_wall(start + Duration::from_secs(60) + Duration::from_millis(5), 1.0);
        assert_eq!(clock.now(), SimTime::from_millis(5));
    }

    #[test]
    fn test_pop_due_drains_once() {
        let mut clock = VirtualClock::new();
        assert_eq!(clock.pop_due(), Some(SimTime::zero()));
        assert_eq!(clock.pop_due(), None);

        clock.schedule_at(SimTime::from_millis(100));
        clock.advance_real(Duration::from_millis(99), 1.0);
        assert_eq!(clock.pop_due(), None);
        clock.advance_real(Duration::from_millis(1), 1.0);
        assert_eq!(clock.pop_due(), Some(SimTime::from_millis(100)));
    }
}

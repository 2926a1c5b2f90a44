use super::{TargetRate, Tunable, DEFAULT_RATE};
use ratesim_core::{ParameterDescriptor, RateController, SlidingWindow, RATE_FLOOR};
use serde::Serialize;

pub(crate) const NAME: &str = "Stats Lerp";

/// Applied to both averages when they coincide, so the interpolation has
/// somewhere to go.
pub const AVERAGE_SEPARATION: f64 = 5.0;

/// Added on success and subtracted on failure after interpolating.
const OUTCOME_BIAS: f64 = 1.0;

const HISTORY_LENGTH: Tunable = Tunable::new("history_length", 0.0, 50.0, 1.0);
const LERP_FACTOR: Tunable = Tunable::new("lerp_factor", 0.0, 2.0, 0.1);

/// One remembered outcome and the rate it was observed at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub was_successful: bool,
    pub rate: f64,
}

/// Interpolates between the average rate that succeeded and the average rate
/// that failed over the last `history_length` outcomes.
///
/// A success moves from the good average toward the bad one, a failure from
/// the bad average toward the good one, each by `lerp_factor`. The outcome is
/// recorded with the pre-update rate before the averages are taken.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsLerpController {
    rate: TargetRate,
    history: SlidingWindow<HistoryEntry>,
    history_length: usize,
    lerp_factor: f64,
}

impl StatsLerpController {
    pub fn new(initial_rate: f64, min_rate: f64, max_rate: f64) -> Self {
        let history_length = 10;
        Self {
            rate: TargetRate::new(initial_rate, min_rate, max_rate),
            history: SlidingWindow::bounded(history_length),
            history_length,
            lerp_factor: 1.0,
        }
    }

    #[must_use]
    pub fn with_history_length(mut self, length: f64) -> Self {
        self.set_history_length(length);
        self
    }

    #[must_use]
    pub fn with_lerp_factor(mut self, factor: f64) -> Self {
        self.set_lerp_factor(factor);
        self
    }

    pub fn history_length(&self) -> usize {
        self.history_length
    }

    pub fn lerp_factor(&self) -> f64 {
        self.lerp_factor
    }

    pub fn history(&self) -> &SlidingWindow<HistoryEntry> {
        &self.history
    }

    /// Rounded and clamped to `0..=50`. Shrinking drops the oldest entries.
    pub fn set_history_length(&mut self, length: f64) {
        self.history_length = HISTORY_LENGTH.clamp(length.round()) as usize;
        self.history.set_capacity(Some(self.history_length));
    }

    pub fn set_lerp_factor(&mut self, factor: f64) {
        self.lerp_factor = LERP_FACTOR.clamp(factor);
    }

    pub fn set_current_rate(&mut self, rate: f64) {
        self.rate.set(rate);
    }

    pub fn set_min_rate(&mut self, min_rate: f64) {
        self.rate.set_min(min_rate);
    }

    pub fn set_max_rate(&mut self, max_rate: f64) {
        self.rate.set_max(max_rate);
    }

    /// Mean rate of the successful and of the failed entries. Either side
    /// falls back to the current rate when it has no entries.
    pub fn rate_averages(&self) -> (f64, f64) {
        let mut good = (0.0, 0usize);
        let mut bad = (0.0, 0usize);
        for entry in &self.history {
            let side = if entry.was_successful { &mut good } else { &mut bad };
            side.0 += entry.rate;
            side.1 += 1;
        }

        let current = self.rate.get();
        let mean = |(sum, count): (f64, usize)| {
            if count == 0 {
                current
            } else {
                sum / count as f64
            }
        };
        (mean(good), mean(bad))
    }
}

impl Default for StatsLerpController {
    fn default() -> Self {
        Self::new(DEFAULT_RATE, RATE_FLOOR, 300.0)
    }
}

impl RateController for StatsLerpController {
    fn name(&self) -> &'static str {
        NAME
    }

    fn current_rate(&self) -> f64 {
        self.rate.get()
    }

    fn process_result(&mut self, was_successful: bool) -> f64 {
        if self.history_length > 0 {
            self.history.push(HistoryEntry {
                was_successful,
                rate: self.rate.get(),
            });
        }

        let (mut good_avg, mut bad_avg) = self.rate_averages();
        if good_avg == bad_avg {
            good_avg += AVERAGE_SEPARATION;
            bad_avg -= AVERAGE_SEPARATION;
        }

        let next = if was_successful {
            good_avg + self.lerp_factor * (bad_avg - good_avg) + OUTCOME_BIAS
        } else {
            bad_avg + self.lerp_factor * (good_avg - bad_avg) - OUTCOME_BIAS
        };
        self.rate.set(next)
    }

    fn reset(&mut self) {
        self.history.clear();
        self.rate.reset();
    }

    fn describe_parameters(&self) -> Vec<ParameterDescriptor> {
        let [min, max] = self.rate.bound_descriptors();
        vec![
            self.rate.current_descriptor(),
            HISTORY_LENGTH.describe(self.history_length as f64),
            LERP_FACTOR.describe(self.lerp_factor),
            min,
            max,
        ]
    }

    fn apply_parameter(&mut self, name: &str, value: f64) {
        if self.rate.apply(name, value) {
            return;
        }
        match name {
            "history_length" => self.set_history_length(value),
            "lerp_factor" => self.set_lerp_factor(value),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_success_uses_separated_averages() {
        let mut controller = StatsLerpController::default();
        // good 60 -> 65, bad falls back to 60 -> 55; 65 + (55 - 65) + 1
        assert_eq!(controller.process_result(true), 56.0);
        assert_eq!(controller.history().len(), 1);
    }

    #[test]
    fn test_failure_lerps_from_bad_average() {
        let mut controller = StatsLerpController::default().with_lerp_factor(0.5);
        controller.process_result(true);
        let rate_at_failure = controller.current_rate();
        let (good, _) = controller.rate_averages();
        let next = controller.process_result(false);
        let expected = rate_at_failure + 0.5 * (good - rate_at_failure) - 1.0;
        assert!((next - expected).abs() < 1e-9);
    }

    #[test]
    fn test_zero_history_records_nothing() {
        let mut controller = StatsLerpController::default().with_history_length(0.0);
        controller.process_result(true);
        controller.process_result(false);
        assert!(controller.history().is_empty());
        // With no history both averages are the current rate.
        let rate = controller.current_rate();
        assert_eq!(controller.rate_averages(), (rate, rate));
    }

    #[test]
    fn test_history_is_bounded_and_trims_oldest() {
        let mut controller = StatsLerpController::default().with_history_length(4.4);
        assert_eq!(controller.history_length(), 4);
        for _ in 0..10 {
            controller.process_result(true);
        }
        assert_eq!(controller.history().len(), 4);

        let newest = *controller.history().back().unwrap();
        controller.set_history_length(1.0);
        assert_eq!(controller.history().to_vec(), vec![newest]);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut controller = StatsLerpController::default();
        controller.process_result(false);
        controller.reset();
        assert!(controller.history().is_empty());
        assert_eq!(controller.current_rate(), 60.0);
    }
}

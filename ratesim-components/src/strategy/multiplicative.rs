use super::{TargetRate, Tunable, DEFAULT_RATE};
use ratesim_core::{ParameterDescriptor, RateController, RATE_CEILING, RATE_FLOOR};

pub(crate) const NAME: &str = "Multiplicative Adjustment";

const FACTOR: Tunable = Tunable::new("factor", 1.01, 1.5, 0.01);

/// Multiplies the rate by `factor` after a success and divides by it after a failure.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiplicativeAdjustmentController {
    rate: TargetRate,
    /// Always greater than one.
    factor: f64,
}

impl MultiplicativeAdjustmentController {
    pub fn new(initial_rate: f64, factor: f64, min_rate: f64, max_rate: f64) -> Self {
        Self {
            rate: TargetRate::new(initial_rate, min_rate, max_rate),
            factor: FACTOR.clamp(factor),
        }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn set_factor(&mut self, factor: f64) {
        self.factor = FACTOR.clamp(factor);
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
}

impl Default for MultiplicativeAdjustmentController {
    fn default() -> Self {
        Self::new(DEFAULT_RATE, 1.05, RATE_FLOOR, RATE_CEILING)
    }
}

impl RateController for MultiplicativeAdjustmentController {
    fn name(&self) -> &'static str {
        NAME
    }

    fn current_rate(&self) -> f64 {
        self.rate.get()
    }

    fn process_result(&mut self, was_successful: bool) -> f64 {
        let current = self.rate.get();
        let next = if was_successful {
            current * self.factor
        } else {
            current / self.factor
        };
        self.rate.set(next)
    }

    fn reset(&mut self) {
        self.rate.reset();
    }

    fn describe_parameters(&self) -> Vec<ParameterDescriptor> {
        let [min, max] = self.rate.bound_descriptors();
        vec![self.rate.current_descriptor(), FACTOR.describe(self.factor), min, max]
    }

    fn apply_parameter(&mut self, name: &str, value: f64) {
        if !self.rate.apply(name, value) && name == "factor" {
            self.set_factor(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_then_failure_returns_to_start() {
        let mut controller = MultiplicativeAdjustmentController::new(100.0, 1.25, 1.0, 1000.0);
        assert_eq!(controller.process_result(true), 125.0);
        assert_eq!(controller.process_result(false), 100.0);
    }

    #[test]
    fn test_factor_stays_above_one() {
        let mut controller = MultiplicativeAdjustmentController::default();
        controller.set_parameter("factor", 0.5).unwrap();
        assert_eq!(controller.factor(), 1.01);
        controller.set_factor(9.0);
        assert_eq!(controller.factor(), 1.5);
    }

    #[test]
    fn test_clamps_to_max() {
        let mut controller = MultiplicativeAdjustmentController::new(95.0, 1.5, 1.0, 100.0);
        assert_eq!(controller.process_result(true), 100.0);
    }
}

use super::{TargetRate, Tunable, DEFAULT_RATE};
use ratesim_core::{ParameterDescriptor, RateController, RATE_CEILING, RATE_FLOOR};

pub(crate) const NAME: &str = "Constant Adjustment";

const DELTA: Tunable = Tunable::new("delta", 0.1, 10.0, 0.1);

/// Steps the rate up by `delta` after a success and down by `delta` after a failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantAdjustmentController {
    rate: TargetRate,
    delta: f64,
}

impl ConstantAdjustmentController {
    pub fn new(initial_rate: f64, delta: f64, min_rate: f64, max_rate: f64) -> Self {
        Self {
            rate: TargetRate::new(initial_rate, min_rate, max_rate),
            delta: DELTA.clamp(delta),
        }
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn set_delta(&mut self, delta: f64) {
        self.delta = DELTA.clamp(delta);
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

impl Default for ConstantAdjustmentController {
    fn default() -> Self {
        Self::new(DEFAULT_RATE, 5.0, RATE_FLOOR, RATE_CEILING)
    }
}

impl RateController for ConstantAdjustmentController {
    fn name(&self) -> &'static str {
        NAME
    }

    fn current_rate(&self) -> f64 {
        self.rate.get()
    }

    fn process_result(&mut self, was_successful: bool) -> f64 {
        let step = if was_successful { self.delta } else { -self.delta };
        self.rate.set(self.rate.get() + step)
    }

    fn reset(&mut self) {
        self.rate.reset();
    }

    fn describe_parameters(&self) -> Vec<ParameterDescriptor> {
        let [min, max] = self.rate.bound_descriptors();
        vec![self.rate.current_descriptor(), DELTA.describe(self.delta), min, max]
    }

    fn apply_parameter(&mut self, name: &str, value: f64) {
        if !self.rate.apply(name, value) && name == "delta" {
            self.set_delta(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_by_delta() {
        let mut controller = ConstantAdjustmentController::default();
        assert_eq!(controller.process_result(true), 65.0);
        assert_eq!(controller.process_result(false), 60.0);
    }

    #[test]
    fn test_clamps_at_bounds() {
        let mut controller = ConstantAdjustmentController::new(3.0, 5.0, 1.0, 10.0);
        assert_eq!(controller.process_result(false), 1.0);
        assert_eq!(controller.process_result(true), 6.0);
        assert_eq!(controller.process_result(true), 10.0);
    }

    #[test]
    fn test_parameter_order() {
        let names: Vec<_> = ConstantAdjustmentController::default()
            .describe_parameters()
            .iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, ["current_rate", "delta", "min_rate", "max_rate"]);
    }

    #[test]
    fn test_min_above_max_drags_max() {
        let mut controller = ConstantAdjustmentController::new(60.0, 5.0, 1.0, 100.0);
        controller.set_min_rate(150.0);
        assert_eq!(controller.current_rate(), 150.0);
        let params = controller.describe_parameters();
        assert_eq!(params[3].value, 150.0);
    }
}

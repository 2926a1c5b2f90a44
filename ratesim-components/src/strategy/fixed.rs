use super::{Tunable, DEFAULT_RATE};
use ratesim_core::{ParameterDescriptor, RateController};

pub(crate) const NAME: &str = "Fixed Rate";

const RATE: Tunable = Tunable::new("rate", 1.0, 300.0, 1.0);

/// Ignores feedback and always targets the same rate.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedRateController {
    initial_rate: f64,
    rate: f64,
}

impl FixedRateController {
    pub fn new(rate: f64) -> Self {
        let rate = RATE.clamp(rate);
        Self {
            initial_rate: rate,
            rate,
        }
    }

    pub fn set_rate(&mut self, rate: f64) {
        self.rate = RATE.clamp(rate);
    }
}

impl Default for FixedRateController {
    fn default() -> Self {
        Self::new(DEFAULT_RATE)
    }
}

impl RateController for FixedRateController {
    fn name(&self) -> &'static str {
        NAME
    }

    fn current_rate(&self) -> f64 {
        self.rate
    }

    fn process_result(&mut self, _was_successful: bool) -> f64 {
        self.rate
    }

    fn reset(&mut self) {
        self.rate = self.initial_rate;
    }

    fn describe_parameters(&self) -> Vec<ParameterDescriptor> {
        vec![RATE.describe(self.rate)]
    }

    fn apply_parameter(&mut self, name: &str, value: f64) {
        if name == "rate" {
            self.set_rate(value);
        }
    }
}

use super::{TargetRate, Tunable, DEFAULT_RATE};
use ratesim_core::{ParameterDescriptor, RateController, RATE_FLOOR};

pub(crate) const NAME: &str = "AIMD";

const ADD_INCREASE: Tunable = Tunable::new("add_increase", 0.1, 100.0, 0.1);
const MULTI_DECREASE_FACTOR: Tunable = Tunable::new("multi_decrease_factor", 0.1, 0.9, 0.05);

/// Additive increase, multiplicative decrease.
///
/// Grows the rate linearly while requests succeed and cuts it by a constant
/// fraction on every failure, the way TCP congestion control backs off.
#[derive(Debug, Clone, PartialEq)]
pub struct AimdController {
    rate: TargetRate,
    /// Added after each success.
    add_increase: f64,
    /// Multiplied in after each failure, strictly between 0 and 1.
    multi_decrease_factor: f64,
}

impl AimdController {
    pub fn new(initial_rate: f64, min_rate: f64, max_rate: f64) -> Self {
        Self {
            rate: TargetRate::new(initial_rate, min_rate, max_rate),
            add_increase: 5.0,
            multi_decrease_factor: 0.5,
        }
    }

    #[must_use]
    pub fn with_add_increase(mut self, add_increase: f64) -> Self {
        self.set_add_increase(add_increase);
        self
    }

    #[must_use]
    pub fn with_multi_decrease_factor(mut self, factor: f64) -> Self {
        self.set_multi_decrease_factor(factor);
        self
    }

    pub fn add_increase(&self) -> f64 {
        self.add_increase
    }

    pub fn multi_decrease_factor(&self) -> f64 {
        self.multi_decrease_factor
    }

    pub fn set_add_increase(&mut self, add_increase: f64) {
        self.add_increase = ADD_INCREASE.clamp(add_increase);
    }

    pub fn set_multi_decrease_factor(&mut self, factor: f64) {
        self.multi_decrease_factor = MULTI_DECREASE_FACTOR.clamp(factor);
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

impl Default for AimdController {
    fn default() -> Self {
        Self::new(DEFAULT_RATE, RATE_FLOOR, 300.0)
    }
}

impl RateController for AimdController {
    fn name(&self) -> &'static str {
        NAME
    }

    fn current_rate(&self) -> f64 {
        self.rate.get()
    }

    fn process_result(&mut self, was_successful: bool) -> f64 {
        let current = self.rate.get();
        let next = if was_successful {
            current + self.add_increase
        } else {
            current * self.multi_decrease_factor
        };
        self.rate.set(next)
    }

    fn reset(&mut self) {
        self.rate.reset();
    }

    fn describe_parameters(&self) -> Vec<ParameterDescriptor> {
        let [min, max] = self.rate.bound_descriptors();
        vec![
            self.rate.current_descriptor(),
            ADD_INCREASE.describe(self.add_increase),
            MULTI_DECREASE_FACTOR.describe(self.multi_decrease_factor),
            min,
            max,
        ]
    }

    fn apply_parameter(&mut self, name: &str, value: f64) {
        if self.rate.apply(name, value) {
            return;
        }
        match name {
            "add_increase" => self.set_add_increase(value),
            "multi_decrease_factor" => self.set_multi_decrease_factor(value),
            _ => {}
        }
    }
}

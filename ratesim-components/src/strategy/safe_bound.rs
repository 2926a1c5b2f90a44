use super::{TargetRate, Tunable, DEFAULT_RATE};
use ratesim_core::{ParameterDescriptor, RateController, RATE_FLOOR};
use tracing::debug;

pub(crate) const NAME: &str = "SafeBound";

/// Consecutive failures after which the rate is cut multiplicatively instead
/// of being pulled back toward the safe rate.
pub const ESCAPE_FAILURE_THRESHOLD: u32 = 3;

const PROBE_FACTOR: Tunable = Tunable::new("probe_factor", 0.0, 1.0, 0.1);
const REDUCTION_FACTOR: Tunable = Tunable::new("reduction_factor", 0.0, 1.0, 0.1);
const FORGET_FACTOR: Tunable = Tunable::new("forget_factor", 0.0, 1.0, 0.01);

/// Learns a rate known to be safe and a ceiling known to fail, and probes
/// between them.
///
/// On success the safe rate rises to the current rate and the next rate is
/// `safe + probe_factor * (upper - safe)`. On failure the ceiling drops to the
/// current rate and the next rate is pulled back toward the safe rate; after
/// [`ESCAPE_FAILURE_THRESHOLD`] failures in a row the rate is instead cut to
/// `current * reduction_factor`. Both learned values then decay toward the
/// current rate by `forget_factor`, so stale knowledge fades.
#[derive(Debug, Clone, PartialEq)]
pub struct SafeBoundController {
    rate: TargetRate,
    safe_rate: f64,
    upper_bound: f64,
    probe_factor: f64,
    reduction_factor: f64,
    forget_factor: f64,
    consecutive_failures: u32,
}

impl SafeBoundController {
    pub fn new(initial_rate: f64, min_rate: f64, max_rate: f64) -> Self {
        let rate = TargetRate::new(initial_rate, min_rate, max_rate);
        Self {
            safe_rate: rate.get(),
            upper_bound: rate.bounds().max(),
            rate,
            probe_factor: 0.9,
            reduction_factor: 0.5,
            forget_factor: 0.05,
            consecutive_failures: 0,
        }
    }

    #[must_use]
    pub fn with_probe_factor(mut self, factor: f64) -> Self {
        self.set_probe_factor(factor);
        self
    }

    #[must_use]
    pub fn with_reduction_factor(mut self, factor: f64) -> Self {
        self.set_reduction_factor(factor);
        self
    }

    #[must_use]
    pub fn with_forget_factor(mut self, factor: f64) -> Self {
        self.set_forget_factor(factor);
        self
    }

    pub fn safe_rate(&self) -> f64 {
        self.safe_rate
    }

    pub fn upper_bound(&self) -> f64 {
        self.upper_bound
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn set_current_rate(&mut self, rate: f64) {
        self.rate.set(rate);
    }

    pub fn set_safe_rate(&mut self, rate: f64) {
        self.safe_rate = self.rate.bounds().clamp(rate);
    }

    /// Clamped into `[safe_rate, max_rate]`.
    pub fn set_upper_bound(&mut self, bound: f64) {
        let max = self.rate.bounds().max();
        self.upper_bound = if bound.is_nan() {
            max
        } else {
            bound.max(self.safe_rate).min(max)
        };
    }

    pub fn set_probe_factor(&mut self, factor: f64) {
        self.probe_factor = PROBE_FACTOR.clamp(factor);
    }

    pub fn set_reduction_factor(&mut self, factor: f64) {
        self.reduction_factor = REDUCTION_FACTOR.clamp(factor);
    }

    pub fn set_forget_factor(&mut self, factor: f64) {
        self.forget_factor = FORGET_FACTOR.clamp(factor);
    }

    pub fn set_min_rate(&mut self, min_rate: f64) {
        self.rate.set_min(min_rate);
        let bounds = self.rate.bounds();
        self.safe_rate = bounds.clamp(self.safe_rate);
        self.upper_bound = bounds.clamp(self.upper_bound);
    }

    /// Raising the ceiling re-opens upward probing from the current rate.
    /// Lowering it caps the current rate and the learned ceiling.
    pub fn set_max_rate(&mut self, max_rate: f64) {
        let previous = self.rate.bounds().max();
        self.rate.set_max(max_rate);
        let bounds = self.rate.bounds();

        if bounds.max() > previous {
            self.upper_bound = bounds.max();
            self.safe_rate = self.rate.get();
            self.consecutive_failures = 0;
            debug!(max_rate = bounds.max(), "Ceiling raised, probing re-opened");
        } else {
            self.upper_bound = self.upper_bound.min(bounds.max());
            self.safe_rate = bounds.clamp(self.safe_rate);
        }
    }

    fn forget(&mut self) {
        let current = self.rate.get();
        let keep = 1.0 - self.forget_factor;
        self.safe_rate = keep * self.safe_rate + self.forget_factor * current;
        self.upper_bound = keep * self.upper_bound + self.forget_factor * current;
    }
}

impl Default for SafeBoundController {
    fn default() -> Self {
        Self::new(DEFAULT_RATE, RATE_FLOOR, 300.0)
    }
}

impl RateController for SafeBoundController {
    fn name(&self) -> &'static str {
        NAME
    }

    fn current_rate(&self) -> f64 {
        self.rate.get()
    }

    fn process_result(&mut self, was_successful: bool) -> f64 {
        let current = self.rate.get();

        if was_successful {
            self.consecutive_failures = 0;
            self.safe_rate = self.safe_rate.max(current);
            self.rate
                .set(self.safe_rate + self.probe_factor * (self.upper_bound - self.safe_rate));
        } else {
            self.consecutive_failures += 1;
            if self.consecutive_failures >= ESCAPE_FAILURE_THRESHOLD {
                self.rate.set(current * self.reduction_factor);
                self.consecutive_failures = 0;
            } else {
                self.upper_bound = self.upper_bound.min(current);
                self.rate
                    .set(self.safe_rate + self.reduction_factor * (current - self.safe_rate));
            }
        }

        self.forget();
        self.rate.get()
    }

    fn reset(&mut self) {
        self.rate.reset();
        self.safe_rate = self.rate.get();
        self.upper_bound = self.rate.bounds().max();
        self.consecutive_failures = 0;
    }

    fn describe_parameters(&self) -> Vec<ParameterDescriptor> {
        let bounds = self.rate.bounds();
        let [min, max] = self.rate.bound_descriptors();
        vec![
            self.rate.current_descriptor(),
            bounds.rate_descriptor("safe_rate", self.safe_rate),
            ParameterDescriptor::new("upper_bound", self.upper_bound, self.safe_rate, bounds.max(), 1.0),
            PROBE_FACTOR.describe(self.probe_factor),
            REDUCTION_FACTOR.describe(self.reduction_factor),
            FORGET_FACTOR.describe(self.forget_factor),
            min,
            max,
        ]
    }

    fn apply_parameter(&mut self, name: &str, value: f64) {
        match name {
            "current_rate" => self.set_current_rate(value),
            "safe_rate" => self.set_safe_rate(value),
            "upper_bound" => self.set_upper_bound(value),
            "probe_factor" => self.set_probe_factor(value),
            "reduction_factor" => self.set_reduction_factor(value),
            "forget_factor" => self.set_forget_factor(value),
            "min_rate" => self.set_min_rate(value),
            "max_rate" => self.set_max_rate(value),
            _ => {}
        }
    }
}

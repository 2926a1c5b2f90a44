//! Rate-control strategy contract
//!
//! A [`RateController`] is a pure update rule: it sees one success/failure
//! outcome at a time and answers with a new target rate in requests per
//! minute. It knows nothing about time or about the server.

use crate::error::SimError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Lowest rate bound any strategy accepts. Keeps the scheduling interval finite.
pub const RATE_FLOOR: f64 = 1.0;
/// Highest rate bound any strategy accepts.
pub const RATE_CEILING: f64 = 1000.0;

/// Description of one tunable, used to bind strategy parameters to controls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterDescriptor {
    pub name: &'static str,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ParameterDescriptor {
    pub const fn new(name: &'static str, value: f64, min: f64, max: f64, step: f64) -> Self {
        Self {
            name,
            value,
            min,
            max,
            step,
        }
    }

    /// Clamps `value` into `[min, max]`.
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }
}

/// Update rule turning request outcomes into a target rate.
pub trait RateController: Send + fmt::Debug {
    /// Human readable strategy name.
    fn name(&self) -> &'static str;

    /// The rate the strategy currently targets.
    fn current_rate(&self) -> f64;

    /// Feed one outcome and return the new target rate.
    fn process_result(&mut self, was_successful: bool) -> f64;

    /// Restore the construction-time rate and clear any learned state.
    fn reset(&mut self);

    /// Ordered parameter descriptors reflecting current values.
    fn describe_parameters(&self) -> Vec<ParameterDescriptor>;

    /// Apply an already-clamped value to the named parameter.
    ///
    /// Called by [`RateController::set_parameter`] after lookup and clamping;
    /// `name` is always one of the described parameters.
    fn apply_parameter(&mut self, name: &str, value: f64);

    /// Set a parameter by name, clamping the value to the descriptor bounds.
    fn set_parameter(&mut self, name: &str, value: f64) -> Result<(), SimError> {
        let descriptor = find_descriptor(&self.describe_parameters(), self.name(), name)?;
        if !value.is_finite() {
            return Err(SimError::NonFiniteParameter {
                name: name.to_string(),
                value,
            });
        }
        self.apply_parameter(descriptor.name, descriptor.clamp(value));
        Ok(())
    }

    /// Apply a batch of parameter overrides in key order.
    fn configure(&mut self, params: &BTreeMap<String, f64>) -> Result<(), SimError> {
        for (name, value) in params {
            self.set_parameter(name, *value)?;
        }
        Ok(())
    }
}

fn find_descriptor(
    descriptors: &[ParameterDescriptor],
    strategy: &str,
    name: &str,
) -> Result<ParameterDescriptor, SimError> {
    descriptors
        .iter()
        .find(|d| d.name == name)
        .copied()
        .ok_or_else(|| SimError::UnknownParameter {
            strategy: strategy.to_string(),
            name: name.to_string(),
        })
}

/// Rate bounds shared by the strategies that clamp their output.
///
/// Moving one bound past the other drags the other along, so `min <= max`
/// holds after every setter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateBounds {
    min: f64,
    max: f64,
}

impl RateBounds {
    pub fn new(min: f64, max: f64) -> Self {
        let mut bounds = Self {
            min: RATE_FLOOR,
            max: RATE_CEILING,
        };
        bounds.set_max(max);
        bounds.set_min(min);
        bounds
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn clamp(&self, rate: f64) -> f64 {
        if rate.is_nan() {
            return self.min;
        }
        rate.max(self.min).min(self.max)
    }

    pub fn set_min(&mut self, min: f64) {
        self.min = min.clamp(RATE_FLOOR, RATE_CEILING);
        if self.max < self.min {
            self.max = self.min;
        }
    }

    pub fn set_max(&mut self, max: f64) {
        self.max = max.clamp(RATE_FLOOR, RATE_CEILING);
        if self.min > self.max {
            self.min = self.max;
        }
    }

    /// Descriptors for the two bounds. Both span `[RATE_FLOOR, RATE_CEILING]`
    /// so a bound set past the other drags it instead of being stopped.
    pub fn descriptors(&self) -> [ParameterDescriptor; 2] {
        [
            ParameterDescriptor::new("min_rate", self.min, RATE_FLOOR, RATE_CEILING, 1.0),
            ParameterDescriptor::new("max_rate", self.max, RATE_FLOOR, RATE_CEILING, 1.0),
        ]
    }

    /// Descriptor for a current-rate parameter living inside these bounds.
    pub fn rate_descriptor(&self, name: &'static str, value: f64) -> ParameterDescriptor {
        ParameterDescriptor::new(name, value, self.min, self.max, 1.0)
    }
}

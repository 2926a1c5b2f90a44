//! Rate-control strategies
//!
//! Six update rules implementing [`RateController`]:
//!
//! ### Feedback-free
//! - [`FixedRateController`]: a constant rate, for baselines.
//!
//! ### Additive / multiplicative
//! - [`ConstantAdjustmentController`]: `+delta` on success, `-delta` on failure.
//! - [`MultiplicativeAdjustmentController`]: `*factor` on success, `/factor` on failure.
//! - [`AimdController`]: additive increase, multiplicative decrease.
//!
//! ### Learning
//! - [`SafeBoundController`]: tracks a known-safe rate and a ceiling and probes
//!   between them.
//! - [`StatsLerpController`]: averages the rates that succeeded and failed in a
//!   bounded history and interpolates between them.
//!
//! Every strategy except the fixed one clamps its output into
//! `[min_rate, max_rate]`, and every `reset` goes back to the rate the
//! strategy was built with.
//!
//! ## Usage
//!
//! ```rust
//! use ratesim_components::strategy::{AimdController, StrategyKind};
//! use ratesim_core::RateController;
//!
//! let mut aimd = AimdController::default();
//! assert_eq!(aimd.process_result(true), 65.0);
//! assert_eq!(aimd.process_result(false), 32.5);
//!
//! let mut boxed = "safe_bound".parse::<StrategyKind>().unwrap().build();
//! boxed.set_parameter("probe_factor", 0.5).unwrap();
//! ```

pub mod aimd;
pub mod constant;
pub mod fixed;
pub mod multiplicative;
pub mod safe_bound;
pub mod stats_lerp;

pub use aimd::AimdController;
pub use constant::ConstantAdjustmentController;
pub use fixed::FixedRateController;
pub use multiplicative::MultiplicativeAdjustmentController;
pub use safe_bound::SafeBoundController;
pub use stats_lerp::StatsLerpController;

use ratesim_core::{ParameterDescriptor, RateBounds, RateController, SimError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rate every strategy starts from unless told otherwise.
pub const DEFAULT_RATE: f64 = 60.0;

/// A non-rate tunable with a fixed range.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Tunable {
    name: &'static str,
    min: f64,
    max: f64,
    step: f64,
}

impl Tunable {
    pub(crate) const fn new(name: &'static str, min: f64, max: f64, step: f64) -> Self {
        Self {
            name,
            min,
            max,
            step,
        }
    }

    pub(crate) fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }

    pub(crate) fn describe(&self, value: f64) -> ParameterDescriptor {
        ParameterDescriptor::new(self.name, value, self.min, self.max, self.step)
    }
}

/// Current rate, the rate to reset to, and the bounds both live in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TargetRate {
    initial: f64,
    current: f64,
    bounds: RateBounds,
}

impl TargetRate {
    pub(crate) fn new(initial: f64, min: f64, max: f64) -> Self {
        let bounds = RateBounds::new(min, max);
        let initial = bounds.clamp(initial);
        Self {
            initial,
            current: initial,
            bounds,
        }
    }

    pub(crate) fn get(&self) -> f64 {
        self.current
    }

    pub(crate) fn bounds(&self) -> RateBounds {
        self.bounds
    }

    /// Store `rate` clamped into the bounds and return the stored value.
    pub(crate) fn set(&mut self, rate: f64) -> f64 {
        self.current = self.bounds.clamp(rate);
        self.current
    }

    pub(crate) fn set_min(&mut self, min: f64) {
        self.bounds.set_min(min);
        self.current = self.bounds.clamp(self.current);
    }

    pub(crate) fn set_max(&mut self, max: f64) {
        self.bounds.set_max(max);
        self.current = self.bounds.clamp(self.current);
    }

    pub(crate) fn reset(&mut self) {
        self.current = self.bounds.clamp(self.initial);
    }

    pub(crate) fn current_descriptor(&self) -> ParameterDescriptor {
        self.bounds.rate_descriptor("current_rate", self.current)
    }

    pub(crate) fn bound_descriptors(&self) -> [ParameterDescriptor; 2] {
        self.bounds.descriptors()
    }

    /// Handle `current_rate`, `min_rate` and `max_rate`. Returns `false` for
    /// any other name.
    pub(crate) fn apply(&mut self, name: &str, value: f64) -> bool {
        match name {
            "current_rate" => {
                self.set(value);
            }
            "min_rate" => self.set_min(value),
            "max_rate" => self.set_max(value),
            _ => return false,
        }
        true
    }
}

/// The six built-in strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    FixedRate,
    ConstantAdjustment,
    MultiplicativeAdjustment,
    Aimd,
    SafeBound,
    StatsLerp,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 6] = [
        StrategyKind::FixedRate,
        StrategyKind::ConstantAdjustment,
        StrategyKind::MultiplicativeAdjustment,
        StrategyKind::Aimd,
        StrategyKind::SafeBound,
        StrategyKind::StatsLerp,
    ];

    /// Stable snake_case key used in configuration files.
    pub fn key(&self) -> &'static str {
        match self {
            StrategyKind::FixedRate => "fixed_rate",
            StrategyKind::ConstantAdjustment => "constant_adjustment",
            StrategyKind::MultiplicativeAdjustment => "multiplicative_adjustment",
            StrategyKind::Aimd => "aimd",
            StrategyKind::SafeBound => "safe_bound",
            StrategyKind::StatsLerp => "stats_lerp",
        }
    }

    /// Name shown to operators; matches [`RateController::name`] of the built strategy.
    pub fn display_name(&self) -> &'static str {
        match self {
            StrategyKind::FixedRate => fixed::NAME,
            StrategyKind::ConstantAdjustment => constant::NAME,
            StrategyKind::MultiplicativeAdjustment => multiplicative::NAME,
            StrategyKind::Aimd => aimd::NAME,
            StrategyKind::SafeBound => safe_bound::NAME,
            StrategyKind::StatsLerp => stats_lerp::NAME,
        }
    }

    /// A fresh strategy with default parameters.
    pub fn build(&self) -> Box<dyn RateController> {
        match self {
            StrategyKind::FixedRate => Box::new(FixedRateController::default()),
            StrategyKind::ConstantAdjustment => Box::new(ConstantAdjustmentController::default()),
            StrategyKind::MultiplicativeAdjustment => {
                Box::new(MultiplicativeAdjustmentController::default())
            }
            StrategyKind::Aimd => Box::new(AimdController::default()),
            StrategyKind::SafeBound => Box::new(SafeBoundController::default()),
            StrategyKind::StatsLerp => Box::new(StatsLerpController::default()),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for StrategyKind {
    type Err = SimError;

    /// Accepts the key or the display name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        StrategyKind::ALL
            .into_iter()
            .find(|kind| {
                kind.key().eq_ignore_ascii_case(wanted)
                    || kind.display_name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| SimError::UnknownStrategy(s.to_string()))
    }
}

//! Error types for the simulation core
//!
//! Numeric inputs are clamped rather than rejected, so the only failures left
//! are the string-keyed lookups used by configuration front ends.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("Strategy '{strategy}' has no parameter named '{name}'")]
    UnknownParameter { strategy: String, name: String },

    #[error("Parameter '{name}' must be finite, got {value}")]
    NonFiniteParameter { name: String, value: f64 },

    #[error("Unknown rate-control strategy: {0}")]
    UnknownStrategy(String),
}

//! Rate-control strategies and server models for ratesim
//!
//! This crate provides the pluggable halves of the closed loop driven by
//! [`ratesim_core::Simulation`]: six [`RateController`](ratesim_core::RateController)
//! strategies and the [`SlidingWindowServer`] model they are tested against.

pub mod server;
pub mod strategy;

pub use server::{SlidingWindowServer, SATURATED_RPM};
pub use strategy::{
    AimdController, ConstantAdjustmentController, FixedRateController,
    MultiplicativeAdjustmentController, SafeBoundController, StatsLerpController, StrategyKind,
    DEFAULT_RATE,
};

//! Run configuration files
//!
//! A run is described by one JSON document; every field is optional:
//!
//! ```json
//! {
//!   "seed": 7,
//!   "server": { "max_rpm": 100, "bad_response_percentage": 10, "requests_to_track": 10 },
//!   "time": { "time_scale": 1.0, "is_playing": true, "time_window": 30 },
//!   "strategy": { "kind": "aimd", "params": { "add_increase": 2.5 } }
//! }
//! ```

use ratesim_components::{SlidingWindowServer, StrategyKind};
use ratesim_core::{RateController, ServerConfig, SimError, Simulation, TimeConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed reading config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed decoding json config: {0}")]
    JsonDecode(#[from] serde_json::Error),

    #[error("invalid strategy configuration: {0}")]
    Strategy(#[from] SimError),
}

/// Which strategy to run and the parameters to override on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategySpec {
    pub kind: StrategyKind,
    /// Parameter name to value, applied in key order
    pub params: BTreeMap<String, f64>,
}

impl StrategySpec {
    pub fn new(kind: StrategyKind) -> Self {
        Self {
            kind,
            params: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: f64) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    /// Build the strategy and apply the overrides.
    pub fn build(&self) -> Result<Box<dyn RateController>, SimError> {
        let mut controller = self.kind.build();
        controller.configure(&self.params)?;
        Ok(controller)
    }
}

/// Everything needed to build a [`Simulation`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Seed of the server's admission draws
    pub seed: u64,
    pub server: ServerConfig,
    pub time: TimeConfig,
    pub strategy: StrategySpec,
}

impl RunConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build a ready-to-run simulation. Server and time settings are
    /// normalized; unknown strategy parameters are an error.
    pub fn build(&self) -> Result<Simulation, ConfigError> {
        let controller = self.strategy.build()?;
        let server = SlidingWindowServer::with_seed(self.server, self.seed);

        info!(
            strategy = controller.name(),
            seed = self.seed,
            overrides = self.strategy.params.len(),
            "Building simulation from run configuration"
        );

        Ok(Simulation::new(controller, Box::new(server), self.time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = RunConfig::from_json_str("{}").unwrap();
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.seed, 0);
        assert_eq!(config.server, ServerConfig::new(100.0, 10.0, 10));
        assert_eq!(config.time, TimeConfig::new(1.0, true, 30.0));
        assert_eq!(config.strategy.kind, StrategyKind::FixedRate);
        assert!(config.strategy.params.is_empty());
    }

    #[test]
    fn test_partial_document() {
        let config = RunConfig::from_json_str(
            r#"{
                "seed": 3,
                "server": { "max_rpm": 250 },
                "strategy": { "kind": "aimd", "params": { "add_increase": 2.5 } }
            }"#,
        )
        .unwrap();

        assert_eq!(config.server.max_rpm, 250.0);
        assert_eq!(config.server.requests_to_track, 10);

        let sim = config.build().unwrap();
        assert_eq!(sim.controller().name(), "AIMD");
        let add = sim
            .controller()
            .describe_parameters()
            .into_iter()
            .find(|d| d.name == "add_increase")
            .unwrap();
        assert_eq!(add.value, 2.5);
    }

    #[test]
    fn test_unknown_parameter_is_rejected() {
        let config = RunConfig {
            strategy: StrategySpec::new(StrategyKind::FixedRate).param("delta", 1.0),
            ..RunConfig::default()
        };
        assert!(matches!(
            config.build(),
            Err(ConfigError::Strategy(SimError::UnknownParameter { .. }))
        ));
    }

    #[test]
    fn test_unknown_strategy_kind_fails_to_decode() {
        let result = RunConfig::from_json_str(r#"{ "strategy": { "kind": "pid" } }"#);
        assert!(matches!(result, Err(ConfigError::JsonDecode(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = RunConfig::from_json_file("/nonexistent/ratesim/run.json");
        assert!(matches!(result, Err(ConfigError::Read(_))));
    }

    #[test]
    fn test_round_trips_through_file() {
        let config = RunConfig {
            seed: 9,
            strategy: StrategySpec::new(StrategyKind::StatsLerp).param("lerp_factor", 0.4),
            ..RunConfig::default()
        };
        let path = std::env::temp_dir().join("ratesim_test_run_config.json");
        std::fs::write(&path, serde_json::to_vec_pretty(&config).unwrap()).unwrap();

        assert_eq!(RunConfig::from_json_file(&path).unwrap(), config);
        std::fs::remove_file(path).ok();
    }
}

//! Engine configuration
//!
//! Level 4 - Utilities and configuration

use std::path::Path;

use anyhow::Context;
use powerduel_evolve::{ConfigError, EvolutionConfig};
use powerduel_fitness::EvalConfig;
use serde::{Deserialize, Serialize};

/// Everything one move decision needs to know
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Population and variation settings
    pub evolution: EvolutionConfig,
    /// Scoring settings
    pub eval: EvalConfig,
    /// Generations bred after the initial population is scored
    pub generations: usize,
    /// Optional time limit in milliseconds (only cuts extra generations short)
    pub time_limit_ms: Option<u64>,
    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            evolution: EvolutionConfig::default(),
            eval: EvalConfig::default(),
            generations: 2,
            time_limit_ms: None,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Score the initial population only
    pub fn single_pass() -> Self {
        Self {
            generations: 0,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    pub fn with_evolution(mut self, evolution: EvolutionConfig) -> Self {
        self.evolution = evolution;
        self
    }

    pub fn with_eval(mut self, eval: EvalConfig) -> Self {
        self.eval = eval;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.evolution.validate()
    }

    /// Read a JSON config; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.generations, 2);
        assert_eq!(config.evolution.population_size, 100);
        assert!(config.eval.parallel);
        assert_eq!(config.seed, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_nested_partial_json() {
        let config: EngineConfig = serde_json::from_str(
            r#"{"seed": 9, "evolution": {"population_size": 12}, "eval": {"worker_threads": 4}}"#,
        )
        .unwrap();
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.evolution.population_size, 12);
        assert_eq!(config.evolution.mutation_rate, 0.9);
        assert_eq!(config.eval.worker_threads, 4);
        assert_eq!(config.generations, 2);
    }

    #[test]
    fn test_load_reports_invalid_config() {
        let path = std::env::temp_dir().join(format!(
            "powerduel-config-test-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{"evolution": {"elitism_rate": 2.0}}"#).unwrap();

        let err = EngineConfig::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("elitism_rate"));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_missing_file() {
        let err = EngineConfig::load("/nonexistent/powerduel.json").unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }
}

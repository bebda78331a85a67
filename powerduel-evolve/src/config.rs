//! Tuning parameters for the genetic search

use serde::{Deserialize, Serialize};

/// Problems found in a configuration before a search starts
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be within 0.0..=1.0, got {value}")]
    RateOutOfRange { name: &'static str, value: f32 },

    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },

    #[error("crossover needs at least 2 parents, got {0}")]
    TooFewParents(usize),
}

/// Evolution configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Upper bound on the population; smaller plan spaces shrink it
    pub population_size: usize,
    /// Chance that a child is mutated
    pub mutation_rate: f32,
    /// Chance that a parent group is recombined instead of copied
    pub crossover_rate: f32,
    /// Fraction of the best chromosomes carried over unchanged
    pub elitism_rate: f32,
    /// Chromosomes compared per tournament
    pub tournament_size: usize,
    /// Parents drawn per crossover
    pub crossover_parents: usize,
    /// Longest run of genes copied by crossover
    pub max_crossover_length: usize,
    /// Upper bound on genes touched by one swap mutation
    pub max_mutated_genes: usize,
    /// 0.0 = always swap, 1.0 = always displacement
    pub mutation_type_preference: f32,
    /// Consecutive draws without a novel child before a generation gives up
    pub max_stalled_draws: usize,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            mutation_rate: 0.9,
            crossover_rate: 0.9,
            elitism_rate: 0.2,
            tournament_size: 3,
            crossover_parents: 2,
            max_crossover_length: 3,
            max_mutated_genes: 3,
            mutation_type_preference: 0.5,
            max_stalled_draws: 1000,
        }
    }
}

impl EvolutionConfig {
    /// Config with the given population cap
    pub fn new(population_size: usize) -> Self {
        Self {
            population_size,
            ..Default::default()
        }
    }

    /// Disable mutation and crossover (selection only)
    pub fn selection_only(mut self) -> Self {
        self.mutation_rate = 0.0;
        self.crossover_rate = 0.0;
        self
    }

    pub fn with_mutation_rate(mut self, rate: f32) -> Self {
        self.mutation_rate = rate;
        self
    }

    pub fn with_crossover_rate(mut self, rate: f32) -> Self {
        self.crossover_rate = rate;
        self
    }

    pub fn with_elitism_rate(mut self, rate: f32) -> Self {
        self.elitism_rate = rate;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_rate("mutation_rate", self.mutation_rate)?;
        check_rate("crossover_rate", self.crossover_rate)?;
        check_rate("elitism_rate", self.elitism_rate)?;
        check_rate("mutation_type_preference", self.mutation_type_preference)?;

        check_positive("population_size", self.population_size)?;
        check_positive("tournament_size", self.tournament_size)?;
        check_positive("max_crossover_length", self.max_crossover_length)?;
        check_positive("max_mutated_genes", self.max_mutated_genes)?;
        check_positive("max_stalled_draws", self.max_stalled_draws)?;

        if self.crossover_parents < 2 {
            return Err(ConfigError::TooFewParents(self.crossover_parents));
        }

        Ok(())
    }
}

fn check_rate(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::RateOutOfRange { name, value })
    }
}

fn check_positive(name: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        Err(ConfigError::Zero { name })
    } else {
        Ok(())
    }
}

//! Powerduel Evolution - Genetic search over move plans
//!
//! This crate provides the evolutionary side of the move engine:
//! - Chromosomes (plans) and deduplicated populations
//! - Random initial populations sized to the plan space
//! - Selection (tournament, elitism)
//! - Mutation operators (displacement, swap)
//! - Crossover operators (OX1 with power repair)
//! - Generational replacement

pub mod chromosome;
pub mod config;
pub mod crossover;
pub mod mutation;
pub mod population;
pub mod selection;

use std::ops::ControlFlow;

use powerduel_core::Hand;
use rand::Rng;

pub use chromosome::{genes_hash, Chromosome, Gene, PlanError};
pub use config::{ConfigError, EvolutionConfig};
pub use crossover::{crossover, order_crossover, repair_power};
pub use mutation::{displacement_mutation, mutate, swap_mutation, MutationKind};
pub use population::{
    generate_population, plan_space_size, random_chromosome, reachable_plan_count, target_size,
    Population,
};
pub use selection::{select_elite, tournament_select, tournament_select_many};

/// Outcome of a multi-generation run
#[derive(Clone, Debug)]
pub struct EvolutionResult {
    /// Final population, scored and sorted best first
    pub population: Population,
    /// Generations actually run (a callback may stop early)
    pub generations_run: usize,
    /// Best fitness after each generation
    pub best_fitness_history: Vec<f32>,
}

/// Breed the next generation from a scored population.
///
/// The best `elitism_rate` share is copied unchanged. The rest is filled by
/// drawing parent groups with tournament selection, recombining them,
/// mutating the children and keeping only children whose plan is new. If
/// `max_stalled_draws` draws in a row produce nothing new the generation is
/// returned short.
///
/// Children are unscored; elites keep their previous score.
pub fn next_generation<R: Rng>(
    population: &Population,
    hand: &Hand,
    config: &EvolutionConfig,
    rng: &mut R,
) -> Population {
    let size = population.len();
    let mut next = Population::with_capacity(size);

    let elite_count = ((config.elitism_rate * size as f32) as usize).min(size);
    let chromosomes = population.chromosomes();
    for i in select_elite(&population.fitness_values(), elite_count) {
        next.insert(chromosomes[i].clone());
    }

    let parent_count = config.crossover_parents.min(size);
    if parent_count == 0 {
        return next;
    }

    let mut stalled = 0usize;
    while next.len() < size {
        let parents =
            tournament_select_many(chromosomes, parent_count, config.tournament_size, rng);

        let mut added = false;
        for mut child in crossover(&parents, config, hand.power, rng) {
            mutate(&mut child, config, rng);
            assert!(child.validate(hand).is_ok(), "illegal child {:?}", child);
            added |= next.insert(child);
        }

        if added {
            stalled = 0;
        } else {
            stalled += 1;
            if stalled >= config.max_stalled_draws {
                tracing::warn!(
                    filled = next.len(),
                    size,
                    "no novel children after {} draws, ending generation early",
                    stalled
                );
                break;
            }
        }
    }

    next.truncate(size);
    next
}

/// Run `generations` rounds of replacement, scoring and sorting.
///
/// `population` must already be scored and sorted. `score` assigns fitness
/// to every chromosome of a freshly bred population.
pub fn evolve<S, R>(
    population: Population,
    hand: &Hand,
    config: &EvolutionConfig,
    generations: usize,
    score: S,
    rng: &mut R,
) -> EvolutionResult
where
    S: FnMut(&mut Population),
    R: Rng,
{
    evolve_with_callback(
        population,
        hand,
        config,
        generations,
        score,
        |_, _| ControlFlow::Continue(()),
        rng,
    )
}

/// Same as `evolve`, calling `callback(generation, population)` after each
/// generation is scored. Returning `ControlFlow::Break` stops the run.
pub fn evolve_with_callback<S, C, R>(
    mut population: Population,
    hand: &Hand,
    config: &EvolutionConfig,
    generations: usize,
    mut score: S,
    mut callback: C,
    rng: &mut R,
) -> EvolutionResult
where
    S: FnMut(&mut Population),
    C: FnMut(usize, &Population) -> ControlFlow<()>,
    R: Rng,
{
    let mut history = Vec::with_capacity(generations);
    let mut generations_run = 0;

    for generation in 0..generations {
        let mut next = next_generation(&population, hand, config, rng);
        score(&mut next);
        next.sort_by_fitness();
        population = next;
        generations_run += 1;

        let best = population.best().map_or(0.0, |c| c.fitness);
        history.push(best);
        tracing::debug!(generation, best, size = population.len(), "generation scored");

        if callback(generation, &population).is_break() {
            break;
        }
    }

    EvolutionResult {
        population,
        generations_run,
        best_fitness_history: history,
    }
}

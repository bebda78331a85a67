//! Exhaustive fitness evaluation
//!
//! Level 2 - Phase-level implementation
//!
//! A chromosome is scored by playing its plan against every legal plan of
//! the opposing hand: each ordering of the opponent's playable cards paired
//! with each way of spending its whole remaining power. Fitness is the share
//! of those duels the acting side wins, i.e. the win rate against an opponent
//! choosing uniformly at random.

use std::sync::Arc;

use powerduel_core::{
    all_compositions, all_permutations, composition_count, permutation_count, simulate_duel,
    Hand, Play,
};
use powerduel_evolve::{Chromosome, Population};
use rayon::prelude::*;
use rayon::ThreadPool;

use crate::config::EvalConfig;

/// Wins tallied for one chromosome
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FitnessResult {
    /// Duels the acting plan won
    pub wins: u64,
    /// Duels simulated
    pub trials: u64,
}

impl FitnessResult {
    pub fn losses(&self) -> u64 {
        self.trials - self.wins
    }

    /// Win rate (wins / trials), 0.0 when nothing was played
    pub fn win_rate(&self) -> f32 {
        if self.trials == 0 {
            0.0
        } else {
            (self.wins as f64 / self.trials as f64) as f32
        }
    }
}

/// The opposing hand has more plans than the evaluator is allowed to enumerate
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("opposing hand has {plans} plans, more than the limit of {limit}")]
pub struct TooManyPlans {
    pub plans: u64,
    pub limit: u64,
}

/// Worker pool shared by every evaluator of one engine
pub type SharedPool = Arc<ThreadPool>;

// ============================================================================
// Opponent plans
// ============================================================================

/// Every plan the opposing hand can still play, materialized once.
#[derive(Clone, Debug)]
pub struct OpponentPlans {
    plans: Vec<Vec<Play>>,
    health: i32,
}

impl OpponentPlans {
    /// Enumerate the opposing hand's plans.
    ///
    /// A card already selected this turn leads every plan at its selected
    /// power. A hand with no playable cards has a single plan made of that
    /// selection alone (or nothing).
    pub fn new(opposing: &Hand) -> Self {
        let committed: Option<Play> = opposing
            .selection
            .map(|s| Play::new(&opposing.cards[s.card], s.power));

        let indices = opposing.playable_indices();
        let mut plans = Vec::new();

        if indices.is_empty() {
            plans.push(committed.into_iter().collect());
        } else {
            let splits = all_compositions(indices.len(), opposing.power);
            for order in all_permutations(&indices) {
                for split in &splits {
                    let mut plan = Vec::with_capacity(order.len() + 1);
                    plan.extend(committed);
                    plan.extend(
                        order
                            .iter()
                            .zip(split)
                            .map(|(&card, &power)| Play::new(&opposing.cards[card], power)),
                    );
                    plans.push(plan);
                }
            }
        }

        tracing::trace!(plans = plans.len(), "enumerated opponent plans");

        Self {
            plans,
            health: opposing.health,
        }
    }

    /// Enumerate the plans only if there are at most `limit` of them
    pub fn bounded(opposing: &Hand, limit: u64) -> Result<Self, TooManyPlans> {
        let plans = Self::count(opposing);
        if plans > limit {
            return Err(TooManyPlans { plans, limit });
        }
        Ok(Self::new(opposing))
    }

    /// Number of plans `new` would produce, saturating at `u64::MAX`
    pub fn count(opposing: &Hand) -> u64 {
        let cards = opposing.playable_count();
        if cards == 0 {
            return 1;
        }
        permutation_count(cards).saturating_mul(composition_count(cards, opposing.power))
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    pub fn plans(&self) -> &[Vec<Play>] {
        &self.plans
    }

    /// Opposing health at the start of every simulated duel
    pub fn health(&self) -> i32 {
        self.health
    }
}

/// Play one chromosome against every opposing plan
pub fn evaluate_chromosome(
    chromosome: &Chromosome,
    acting: &Hand,
    opponents: &OpponentPlans,
) -> FitnessResult {
    let plan = chromosome.plays(acting);

    let wins = opponents
        .plans()
        .iter()
        .filter(|theirs| {
            simulate_duel(&plan, theirs, acting.health, opponents.health()).acting_wins()
        })
        .count() as u64;

    FitnessResult {
        wins,
        trials: opponents.len() as u64,
    }
}

// ============================================================================
// Evaluator
// ============================================================================

/// Scores chromosomes of one acting hand against one opposing hand.
///
/// Built once per decision; the opposing plans are reused for every
/// generation. Fails when the opposing hand has more than
/// `config.max_opponent_plans` plans.
pub struct FitnessEvaluator {
    acting: Hand,
    opponents: OpponentPlans,
    config: EvalConfig,
    pool: Option<SharedPool>,
}

impl FitnessEvaluator {
    /// Evaluator with a pool of its own
    pub fn new(acting: &Hand, opposing: &Hand, config: &EvalConfig) -> Result<Self, TooManyPlans> {
        Self::with_pool(acting, opposing, config, build_pool(config))
    }

    /// Evaluator running on `pool`, or on the global pool when None
    pub fn with_pool(
        acting: &Hand,
        opposing: &Hand,
        config: &EvalConfig,
        pool: Option<SharedPool>,
    ) -> Result<Self, TooManyPlans> {
        Ok(Self {
            acting: acting.clone(),
            opponents: OpponentPlans::bounded(opposing, config.max_opponent_plans)?,
            config: config.clone(),
            pool,
        })
    }

    pub fn pool(&self) -> Option<&SharedPool> {
        self.pool.as_ref()
    }

    pub fn opponents(&self) -> &OpponentPlans {
        &self.opponents
    }

    pub fn evaluate(&self, chromosome: &Chromosome) -> FitnessResult {
        evaluate_chromosome(chromosome, &self.acting, &self.opponents)
    }

    /// Assign a fitness to every chromosome in the population
    pub fn evaluate_population(&self, population: &mut Population) {
        let scores = if self.config.parallel {
            match &self.pool {
                Some(pool) => pool.install(|| self.score_parallel(population.chromosomes())),
                None => self.score_parallel(population.chromosomes()),
            }
        } else {
            population
                .iter()
                .map(|c| self.evaluate(c).win_rate())
                .collect()
        };

        population.assign_fitness(&scores);
    }

    fn score_parallel(&self, chromosomes: &[Chromosome]) -> Vec<f32> {
        chromosomes
            .par_iter()
            .map(|c| self.evaluate(c).win_rate())
            .collect()
    }
}

/// Dedicated pool sized by `config`, or None to run on the global pool
pub fn build_pool(config: &EvalConfig) -> Option<SharedPool> {
    let threads = config.pool_size()?;
    match rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("powerduel-eval-{}", i))
        .build()
    {
        Ok(pool) => Some(Arc::new(pool)),
        Err(err) => {
            tracing::warn!(threads, error = %err, "could not build worker pool, using the global pool");
            None
        }
    }
}

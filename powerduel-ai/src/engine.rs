//! Move selection
//!
//! Level 1 - Orchestration

use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use powerduel_core::{Hand, HandError};
use powerduel_evolve::{
    evolve_with_callback, generate_population, reachable_plan_count, ConfigError,
};
use powerduel_fitness::{build_pool, FitnessEvaluator, SharedPool, TooManyPlans};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;

/// The card to play this turn and the power to put behind it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    /// Absolute index into the acting hand's cards
    pub card: usize,
    pub power: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum MoveError {
    #[error("no legal move: the acting hand has no playable cards")]
    NoLegalMove,

    #[error("invalid {side} hand: {source}")]
    InvalidHand {
        side: &'static str,
        #[source]
        source: HandError,
    },

    #[error("invalid engine config: {0}")]
    Config(#[from] ConfigError),

    #[error("search too large: {0}")]
    SearchTooLarge(#[from] TooManyPlans),
}

/// Choose a move for `acting` against `opposing`.
///
/// One playable card is a forced move with all remaining power. Otherwise a
/// population of plans is generated, scored against every opposing plan and
/// optionally evolved; the first gene of the best plan is the move.
///
/// Scoring runs on a pool built for this call; `MoveEngine` keeps one pool
/// for all of its decisions.
pub fn choose_move<R: Rng>(
    acting: &Hand,
    opposing: &Hand,
    config: &EngineConfig,
    rng: &mut R,
) -> Result<Move, MoveError> {
    if let Some(forced) = forced_move(acting, opposing, config)? {
        return Ok(forced);
    }
    search(acting, opposing, config, build_pool(&config.eval), rng)
}

/// Check the inputs; Some when only one move is legal
fn forced_move(
    acting: &Hand,
    opposing: &Hand,
    config: &EngineConfig,
) -> Result<Option<Move>, MoveError> {
    config.validate()?;
    acting
        .validate()
        .map_err(|source| MoveError::InvalidHand { side: "acting", source })?;
    opposing
        .validate()
        .map_err(|source| MoveError::InvalidHand { side: "opposing", source })?;

    match acting.playable_indices().as_slice() {
        [] => Err(MoveError::NoLegalMove),
        &[card] => {
            tracing::debug!(card, power = acting.power, "forced move");
            Ok(Some(Move {
                card,
                power: acting.power,
            }))
        }
        _ => Ok(None),
    }
}

/// Level 2: generate, score and evolve plans for a hand with a real choice
fn search<R: Rng>(
    acting: &Hand,
    opposing: &Hand,
    config: &EngineConfig,
    pool: Option<SharedPool>,
    rng: &mut R,
) -> Result<Move, MoveError> {
    let started = Instant::now();
    let deadline = config
        .time_limit_ms
        .map(|ms| started + Duration::from_millis(ms));

    // Level 2: initial population
    let evaluator = FitnessEvaluator::with_pool(acting, opposing, &config.eval, pool)?;
    let mut population = generate_population(acting, &config.evolution, rng);
    evaluator.evaluate_population(&mut population);
    population.sort_by_fitness();

    tracing::debug!(
        population = population.len(),
        opponent_plans = evaluator.opponents().len(),
        best = population.best().map_or(0.0, |c| c.fitness),
        "scored initial population"
    );

    // Level 2: optional generations
    let covered = population.len() as u64 >= reachable_plan_count(acting);
    if config.generations > 0 && !covered {
        let result = evolve_with_callback(
            population,
            acting,
            &config.evolution,
            config.generations,
            |p| evaluator.evaluate_population(p),
            |generation, _| match deadline {
                Some(deadline) if Instant::now() >= deadline => {
                    tracing::debug!(generation, "time limit reached");
                    ControlFlow::Break(())
                }
                _ => ControlFlow::Continue(()),
            },
            rng,
        );
        population = result.population;
    }

    let best = population
        .chromosomes()
        .first()
        .ok_or(MoveError::NoLegalMove)?;
    let gene = best.first_gene().ok_or(MoveError::NoLegalMove)?;

    tracing::debug!(
        card = gene.order,
        power = gene.power,
        fitness = best.fitness,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "chose move"
    );

    Ok(Move {
        card: gene.order,
        power: gene.power,
    })
}

/// Move chooser with its own seeded random source.
///
/// Two engines built from the same seeded config make the same decisions.
pub struct MoveEngine {
    config: EngineConfig,
    rng: ChaCha8Rng,
    pool: Option<SharedPool>,
}

impl MoveEngine {
    pub fn new(config: EngineConfig) -> Result<Self, MoveError> {
        config.validate()?;
        let rng = match config.seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };
        let pool = build_pool(&config.eval);
        Ok(Self { config, rng, pool })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn choose_move(&mut self, acting: &Hand, opposing: &Hand) -> Result<Move, MoveError> {
        if let Some(forced) = forced_move(acting, opposing, &self.config)? {
            return Ok(forced);
        }
        search(acting, opposing, &self.config, self.pool.clone(), &mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use powerduel_core::{Card, Selection};
    use powerduel_evolve::EvolutionConfig;
    use powerduel_fitness::EvalConfig;

    fn four_cards() -> Hand {
        Hand::new(
            12,
            12,
            vec![Card::new(3, 2), Card::new(5, 3), Card::new(7, 6), Card::new(9, 8)],
        )
    }

    fn small_config() -> EngineConfig {
        EngineConfig::default()
            .with_seed(42)
            .with_evolution(EvolutionConfig::new(30))
    }

    #[test]
    fn test_forced_move_uses_all_power() {
        let mut acting = Hand::new(
            6,
            3,
            vec![Card::new(2, 1), Card::new(5, 4), Card::new(7, 2)],
        );
        acting.cards[0].playable = false;
        acting.cards[2].playable = false;

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let chosen = choose_move(&acting, &four_cards(), &EngineConfig::default(), &mut rng).unwrap();
        assert_eq!(chosen, Move { card: 1, power: 3 });
    }

    #[test]
    fn test_no_playable_cards_is_an_error() {
        let mut acting = Hand::new(6, 3, vec![Card::new(2, 1)]);
        acting.cards[0].playable = false;

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let err = choose_move(&acting, &four_cards(), &EngineConfig::default(), &mut rng);
        assert!(matches!(err, Err(MoveError::NoLegalMove)));
    }

    #[test]
    fn test_invalid_hand_is_reported() {
        let mut opposing = four_cards();
        opposing.selection = Some(Selection { card: 7, power: 1 });

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let err = choose_move(&four_cards(), &opposing, &EngineConfig::default(), &mut rng);
        assert!(matches!(
            err,
            Err(MoveError::InvalidHand { side: "opposing", .. })
        ));
    }

    #[test]
    fn test_engine_rejects_bad_config() {
        let config = EngineConfig::default()
            .with_evolution(EvolutionConfig::default().with_crossover_rate(-0.5));
        assert!(matches!(MoveEngine::new(config), Err(MoveError::Config(_))));
    }

    #[test]
    fn test_chosen_move_is_legal() {
        let acting = four_cards();
        let mut opposing = four_cards();
        opposing.commit(2, 5);

        let mut engine = MoveEngine::new(small_config()).unwrap();
        for _ in 0..3 {
            let chosen = engine.choose_move(&acting, &opposing).unwrap();
            assert!(acting.cards[chosen.card].playable);
            assert!(chosen.power <= acting.power);
        }
    }

    #[test]
    fn test_same_seed_same_move() {
        let acting = four_cards();
        let opposing = Hand::new(
            10,
            9,
            vec![Card::new(4, 2), Card::new(6, 5), Card::new(8, 7)],
        );

        let mut a = MoveEngine::new(small_config()).unwrap();
        let mut b = MoveEngine::new(small_config()).unwrap();
        for _ in 0..3 {
            assert_eq!(
                a.choose_move(&acting, &opposing).unwrap(),
                b.choose_move(&acting, &opposing).unwrap()
            );
        }
    }

    #[test]
    fn test_dominant_card_is_chosen() {
        // Leading with the strong card at power >= 1 knocks the opponent out
        // in the first round; every other plan loses.
        let acting = Hand::new(3, 12, vec![Card::new(1, 1), Card::new(10, 8)]);
        let opposing = Hand::new(8, 2, vec![Card::new(4, 5)]);

        for seed in 0..10 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let chosen = choose_move(&acting, &opposing, &EngineConfig::default(), &mut rng).unwrap();
            assert_eq!(chosen.card, 1, "seed {}", seed);
            assert!(chosen.power >= 1, "seed {}", seed);
        }
    }

    #[test]
    fn test_covered_plan_space_skips_evolution() {
        // Two cards and no power: both plans fit in the initial population
        let acting = Hand::new(5, 0, vec![Card::new(2, 1), Card::new(6, 1)]);
        let opposing = Hand::new(5, 0, vec![Card::new(3, 1), Card::new(4, 1)]);

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let config = EngineConfig::default().with_generations(50);
        let chosen = choose_move(&acting, &opposing, &config, &mut rng).unwrap();
        assert!(chosen.card < 2);
        assert_eq!(chosen.power, 0);
    }

    #[test]
    fn test_zero_time_limit_still_answers() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let config = small_config().with_generations(20).with_time_limit_ms(0);
        let chosen = choose_move(&four_cards(), &four_cards(), &config, &mut rng).unwrap();
        assert!(chosen.card < 4);
    }

    #[test]
    fn test_oversized_opponent_is_an_error() {
        let acting = Hand::new(12, 12, vec![Card::new(3, 2), Card::new(5, 3)]);
        let opposing = Hand::new(12, 12, vec![Card::new(2, 1); 13]);

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let err = choose_move(&acting, &opposing, &EngineConfig::default(), &mut rng);
        assert!(matches!(
            err,
            Err(MoveError::SearchTooLarge(TooManyPlans { limit: 1_000_000, .. }))
        ));

        // The limit comes from the config
        let tight = EngineConfig::default()
            .with_eval(EvalConfig::sequential().with_max_opponent_plans(10));
        let err = choose_move(&acting, &four_cards(), &tight, &mut rng);
        assert!(matches!(err, Err(MoveError::SearchTooLarge(_))));
    }

    #[test]
    fn test_engine_reuses_its_pool() {
        let config = small_config().with_eval(EvalConfig::default().with_worker_threads(2));
        let mut engine = MoveEngine::new(config).unwrap();
        let pool = engine.pool.clone().unwrap();

        for _ in 0..3 {
            engine.choose_move(&four_cards(), &four_cards()).unwrap();
        }

        assert!(engine.pool.as_ref().is_some_and(|p| Arc::ptr_eq(p, &pool)));
        // Only the engine and this test hold it; no evaluator kept a copy
        assert_eq!(Arc::strong_count(&pool), 2);
    }
}

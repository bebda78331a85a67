//! Deduplicated populations and the random initial generator

use powerduel_core::{composition_count, permutation_count, Hand};
use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHashMap;

use crate::chromosome::{genes_hash, Chromosome, Gene};
use crate::config::EvolutionConfig;

/// Chromosomes in insertion order, indexed by gene hash.
///
/// Every key in the index maps to the position of a chromosome whose gene
/// hash equals that key, and no two chromosomes share a hash. Two different
/// plans that collide on the hash are treated as duplicates.
#[derive(Clone, Debug, Default)]
pub struct Population {
    chromosomes: Vec<Chromosome>,
    index: FxHashMap<u64, usize>,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            chromosomes: Vec::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Add a chromosome unless an identical plan is already present.
    ///
    /// Returns true if it was added.
    pub fn insert(&mut self, chromosome: Chromosome) -> bool {
        let hash = chromosome.genes_hash();
        if self.index.contains_key(&hash) {
            return false;
        }
        self.index.insert(hash, self.chromosomes.len());
        self.chromosomes.push(chromosome);
        true
    }

    pub fn contains(&self, genes: &[Gene]) -> bool {
        self.index.contains_key(&genes_hash(genes))
    }

    pub fn len(&self) -> usize {
        self.chromosomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chromosomes.is_empty()
    }

    pub fn chromosomes(&self) -> &[Chromosome] {
        &self.chromosomes
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chromosome> {
        self.chromosomes.iter()
    }

    pub fn fitness_values(&self) -> Vec<f32> {
        self.chromosomes.iter().map(|c| c.fitness).collect()
    }

    /// Store scores computed elsewhere, position by position.
    ///
    /// # Panics
    /// Panics if the number of scores differs from the population size.
    pub fn assign_fitness(&mut self, scores: &[f32]) {
        assert_eq!(
            scores.len(),
            self.chromosomes.len(),
            "one score per chromosome"
        );
        for (chromosome, &score) in self.chromosomes.iter_mut().zip(scores) {
            chromosome.fitness = score;
        }
    }

    /// Sort by fitness, best (highest) first. Ties keep insertion order.
    pub fn sort_by_fitness(&mut self) {
        self.chromosomes
            .sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
        self.rebuild_index();
    }

    pub fn truncate(&mut self, len: usize) {
        if len < self.chromosomes.len() {
            self.chromosomes.truncate(len);
            self.rebuild_index();
        }
    }

    /// Highest-fitness chromosome
    pub fn best(&self) -> Option<&Chromosome> {
        self.chromosomes
            .iter()
            .reduce(|best, c| if c.fitness > best.fitness { c } else { best })
    }

    pub fn into_chromosomes(self) -> Vec<Chromosome> {
        self.chromosomes
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (i, chromosome) in self.chromosomes.iter().enumerate() {
            self.index.insert(chromosome.genes_hash(), i);
        }
    }
}

// ============================================================================
// Generation
// ============================================================================

/// Number of distinct plans worth targeting for `hand`, given the cap.
///
/// Orderings alone are counted first; power splits are only multiplied in
/// when the orderings cannot fill the cap on their own.
pub fn plan_space_size(hand: &Hand, cap: usize) -> u64 {
    let cards = hand.playable_count();
    let orderings = permutation_count(cards);
    if orderings < cap as u64 {
        orderings.saturating_mul(composition_count(cards, hand.power))
    } else {
        orderings
    }
}

/// Number of legal plans for `hand`, counting splits that leave power unspent.
///
/// Every split of at most `power` over n cards is a split of exactly `power`
/// over n + 1 slots, the extra slot holding the unspent remainder.
pub fn reachable_plan_count(hand: &Hand) -> u64 {
    let cards = hand.playable_count();
    permutation_count(cards).saturating_mul(composition_count(cards + 1, hand.power))
}

/// Population size that will actually be generated for `hand`
pub fn target_size(hand: &Hand, config: &EvolutionConfig) -> usize {
    let space = plan_space_size(hand, config.population_size);
    usize::try_from(space)
        .unwrap_or(usize::MAX)
        .min(config.population_size)
}

/// Draw one random plan: a shuffled card order, and a power split drawn
/// slot by slot from whatever budget is left.
pub fn random_chromosome<R: Rng>(hand: &Hand, rng: &mut R) -> Chromosome {
    let mut order = hand.playable_indices();
    order.shuffle(rng);

    let mut remaining = hand.power;
    let genes = order
        .into_iter()
        .map(|card| {
            let power = rng.gen_range(0..=remaining);
            remaining -= power;
            Gene::new(card, power)
        })
        .collect();

    Chromosome::from_genes(genes)
}

/// Fill a population with distinct random plans.
///
/// # Panics
/// Panics if the hand has no playable cards.
pub fn generate_population<R: Rng>(
    hand: &Hand,
    config: &EvolutionConfig,
    rng: &mut R,
) -> Population {
    assert!(hand.playable_count() > 0, "hand has no playable cards");

    let target = target_size(hand, config);
    let mut population = Population::with_capacity(target);
    let mut rejected = 0usize;

    while population.len() < target {
        if !population.insert(random_chromosome(hand, rng)) {
            rejected += 1;
        }
    }

    tracing::trace!(size = target, rejected, "generated initial population");

    population
}

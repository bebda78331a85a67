//! Selection operators for genetic algorithms
//!
//! Implements tournament selection where chromosomes compete in small
//! tournaments, with the winner being selected for breeding.
//!
//! Higher fitness always wins, matching the descending order used to rank
//! the final population and to pick elites.

use rand::seq::{index, SliceRandom};
use rand::Rng;

use crate::chromosome::Chromosome;

/// Tournament selection: select a chromosome by running a tournament.
///
/// Samples `tournament_size` distinct chromosomes and returns the one with
/// the highest fitness. Ties go to the first one sampled.
///
/// # Panics
/// Panics if the population is empty or tournament_size is 0
pub fn tournament_select<'a, R: Rng>(
    population: &'a [Chromosome],
    tournament_size: usize,
    rng: &mut R,
) -> &'a Chromosome {
    assert!(!population.is_empty(), "Population cannot be empty");
    assert!(tournament_size > 0, "Tournament size must be > 0");

    let tournament_size = tournament_size.min(population.len());
    let entrants = index::sample(rng, population.len(), tournament_size);

    let winner = best_of(population, entrants.iter());
    &population[winner]
}

/// Select `count` distinct parents.
///
/// Each tournament is drawn from the chromosomes not yet selected. The
/// winner leaves the pool and the pool is reshuffled before the next draw.
///
/// # Panics
/// Panics if `count` exceeds the population size or tournament_size is 0
pub fn tournament_select_many<'a, R: Rng>(
    population: &'a [Chromosome],
    count: usize,
    tournament_size: usize,
    rng: &mut R,
) -> Vec<&'a Chromosome> {
    assert!(
        count <= population.len(),
        "Cannot select {} distinct parents from {}",
        count,
        population.len()
    );
    assert!(tournament_size > 0, "Tournament size must be > 0");

    let mut pool: Vec<usize> = (0..population.len()).collect();
    pool.shuffle(rng);

    let mut selected = Vec::with_capacity(count);
    for _ in 0..count {
        let size = tournament_size.min(pool.len());
        let winner = best_of(population, pool[..size].iter().copied());
        let slot = pool[..size]
            .iter()
            .position(|&i| i == winner)
            .unwrap_or(0);

        selected.push(&population[winner]);
        pool.swap_remove(slot);
        pool.shuffle(rng);
    }

    selected
}

/// Select the top N chromosomes by fitness (elitism).
///
/// Returns indices of the best chromosomes, sorted by fitness (descending).
pub fn select_elite(fitness: &[f32], n: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..fitness.len()).collect();
    indices.sort_by(|&a, &b| fitness[b].total_cmp(&fitness[a]));
    indices.truncate(n);
    indices
}

fn best_of(population: &[Chromosome], mut entrants: impl Iterator<Item = usize>) -> usize {
    let first = entrants.next().unwrap_or(0);
    entrants.fold(first, |best, i| {
        if population[i].fitness > population[best].fitness {
            i
        } else {
            best
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chromosome::Gene;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn make_population(fitness: &[f32]) -> Vec<Chromosome> {
        fitness
            .iter()
            .enumerate()
            .map(|(i, &f)| {
                let mut c = Chromosome::from_genes(vec![Gene::new(i, 0)]);
                c.fitness = f;
                c
            })
            .collect()
    }

    #[test]
    fn test_tournament_select_returns_higher_fitness() {
        let fitness: Vec<f32> = (0..10).map(|i| i as f32 / 10.0).collect();
        let population = make_population(&fitness);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        // Run many selections, track how often we get high-fitness chromosomes
        let mut high_count = 0;
        for _ in 0..100 {
            let selected = tournament_select(&population, 3, &mut rng);
            if selected.genes[0].order >= 7 {
                high_count += 1;
            }
        }

        // With tournament size 3, we should heavily favor high-fitness chromosomes
        assert!(
            high_count > 50,
            "Tournament selection should favor high fitness, got {}",
            high_count
        );
    }

    #[test]
    fn test_full_tournament_picks_the_best() {
        let population = make_population(&[0.3, 0.8, 0.1, 0.5]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        for _ in 0..20 {
            let selected = tournament_select(&population, 4, &mut rng);
            assert_eq!(selected.fitness, 0.8);
        }
    }

    #[test]
    fn test_select_many_returns_distinct_parents() {
        let population = make_population(&[0.1, 0.2, 0.3, 0.4, 0.5]);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        for _ in 0..50 {
            let selected = tournament_select_many(&population, 3, 2, &mut rng);
            assert_eq!(selected.len(), 3);
            let orders: HashSet<usize> = selected.iter().map(|c| c.genes[0].order).collect();
            assert_eq!(orders.len(), 3);
        }
    }

    #[test]
    fn test_select_many_whole_population_ranks_by_fitness() {
        // A tournament as large as the pool always takes the pool's best
        let population = make_population(&[0.4, 0.9, 0.2]);
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let selected = tournament_select_many(&population, 3, 3, &mut rng);
        let fitness: Vec<f32> = selected.iter().map(|c| c.fitness).collect();
        assert_eq!(fitness, vec![0.9, 0.4, 0.2]);
    }

    #[test]
    #[should_panic(expected = "distinct parents")]
    fn test_select_many_too_many() {
        let population = make_population(&[0.1, 0.2]);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        tournament_select_many(&population, 3, 2, &mut rng);
    }

    #[test]
    fn test_select_elite() {
        let fitness = vec![0.5, 0.9, 0.3, 0.7, 0.1];
        let elite = select_elite(&fitness, 3);

        assert_eq!(elite.len(), 3);
        assert_eq!(elite[0], 1); // 0.9
        assert_eq!(elite[1], 3); // 0.7
        assert_eq!(elite[2], 0); // 0.5
    }

    #[test]
    fn test_select_elite_handles_small_pop() {
        let fitness = vec![0.5, 0.9];
        let elite = select_elite(&fitness, 5);

        assert_eq!(elite.len(), 2); // Can't select more than population
    }
}

//! Mutation operators for plan evolution
//!
//! Both operators only rearrange what a chromosome already holds, so a
//! legal plan stays legal: the same cards appear exactly once and the power
//! total is unchanged.
//! - Displacement: move one gene to another position
//! - Swap: exchange the cards of two positions, leaving powers in place

use rand::seq::SliceRandom;
use rand::Rng;

use crate::chromosome::Chromosome;
use crate::config::EvolutionConfig;

/// Which operator `mutate` applied
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationKind {
    Displacement,
    Swap,
}

/// Apply a mutation with the configured probability.
///
/// Returns the operator used, or None if the chromosome was left alone.
pub fn mutate<R: Rng>(
    chromosome: &mut Chromosome,
    config: &EvolutionConfig,
    rng: &mut R,
) -> Option<MutationKind> {
    if chromosome.genes.len() < 2 || rng.gen::<f32>() >= config.mutation_rate {
        return None;
    }

    if rng.gen::<f32>() < config.mutation_type_preference {
        displacement_mutation(chromosome, rng);
        Some(MutationKind::Displacement)
    } else {
        swap_mutation(chromosome, config.max_mutated_genes, rng);
        Some(MutationKind::Swap)
    }
}

/// Remove one gene and reinsert it at a different position, shifting the
/// genes in between by one.
pub fn displacement_mutation<R: Rng>(chromosome: &mut Chromosome, rng: &mut R) {
    let len = chromosome.genes.len();
    if len < 2 {
        return;
    }

    let from = rng.gen_range(0..len);
    let mut to = rng.gen_range(0..len - 1);
    if to >= from {
        to += 1;
    }

    let gene = chromosome.genes.remove(from);
    chromosome.genes.insert(to, gene);
}

/// Exchange the card order of disjoint position pairs.
///
/// Swaps between 1 and `max_mutated_genes - 1` pairs, never more pairs than
/// the chromosome can hold.
pub fn swap_mutation<R: Rng>(chromosome: &mut Chromosome, max_mutated_genes: usize, rng: &mut R) {
    let len = chromosome.genes.len();
    if len < 2 {
        return;
    }

    let max_pairs = max_mutated_genes.saturating_sub(1).clamp(1, len / 2);
    let pairs = rng.gen_range(1..=max_pairs);

    let mut positions: Vec<usize> = (0..len).collect();
    positions.shuffle(rng);

    for pair in positions.chunks_exact(2).take(pairs) {
        let (a, b) = (pair[0], pair[1]);
        let order = chromosome.genes[a].order;
        chromosome.genes[a].order = chromosome.genes[b].order;
        chromosome.genes[b].order = order;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chromosome::Gene;
    use crate::population::random_chromosome;
    use powerduel_core::{Card, Hand};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn hand() -> Hand {
        Hand::new(
            12,
            12,
            vec![Card::new(3, 2), Card::new(5, 3), Card::new(7, 6), Card::new(9, 8)],
        )
    }

    fn sorted_orders(c: &Chromosome) -> Vec<usize> {
        let mut orders: Vec<usize> = c.genes.iter().map(|g| g.order).collect();
        orders.sort_unstable();
        orders
    }

    #[test]
    fn test_displacement_moves_exactly_one_gene() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let original = Chromosome::from_genes(vec![
            Gene::new(0, 1),
            Gene::new(1, 2),
            Gene::new(2, 3),
            Gene::new(3, 4),
        ]);

        for _ in 0..50 {
            let mut c = original.clone();
            displacement_mutation(&mut c, &mut rng);
            assert_ne!(c.genes, original.genes);

            // Each gene is kept whole, only its position changes
            let mut genes = c.genes.clone();
            genes.sort_by_key(|g| g.order);
            assert_eq!(genes, original.genes);
        }
    }

    #[test]
    fn test_swap_moves_cards_but_not_powers() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let original = Chromosome::from_genes(vec![
            Gene::new(0, 1),
            Gene::new(1, 2),
            Gene::new(2, 3),
            Gene::new(3, 4),
        ]);

        for _ in 0..50 {
            let mut c = original.clone();
            swap_mutation(&mut c, 3, &mut rng);

            let powers: Vec<u32> = c.genes.iter().map(|g| g.power).collect();
            assert_eq!(powers, vec![1, 2, 3, 4]);
            assert_eq!(sorted_orders(&c), vec![0, 1, 2, 3]);
            assert_ne!(c.genes, original.genes);
        }
    }

    #[test]
    fn test_single_gene_is_untouched() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut c = Chromosome::from_genes(vec![Gene::new(2, 5)]);
        let config = EvolutionConfig::default().with_mutation_rate(1.0);

        assert_eq!(mutate(&mut c, &config, &mut rng), None);
        assert_eq!(c.genes, vec![Gene::new(2, 5)]);
    }

    #[test]
    fn test_mutation_rate_zero_never_mutates() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let config = EvolutionConfig::default().with_mutation_rate(0.0);
        let h = hand();

        for _ in 0..50 {
            let mut c = random_chromosome(&h, &mut rng);
            let before = c.clone();
            assert_eq!(mutate(&mut c, &config, &mut rng), None);
            assert_eq!(c, before);
        }
    }

    #[test]
    fn test_mutated_plans_stay_legal() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let config = EvolutionConfig::default().with_mutation_rate(1.0);
        let h = hand();
        let mut seen_displacement = false;
        let mut seen_swap = false;

        for _ in 0..200 {
            let mut c = random_chromosome(&h, &mut rng);
            match mutate(&mut c, &config, &mut rng) {
                Some(MutationKind::Displacement) => seen_displacement = true,
                Some(MutationKind::Swap) => seen_swap = true,
                None => panic!("rate 1.0 should always mutate"),
            }
            assert!(c.validate(&h).is_ok(), "{:?}", c);
        }

        assert!(seen_displacement);
        assert!(seen_swap);
    }
}

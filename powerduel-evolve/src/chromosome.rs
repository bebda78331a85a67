//! Genes and chromosomes
//!
//! A chromosome is a full plan for the acting hand: every playable card in
//! the order it would be played, each with the power committed to it. Only
//! the first gene is ever played; the rest describe how the remaining cards
//! would follow.

use std::hash::{Hash, Hasher};

use powerduel_core::{Hand, Play};
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

/// One planned play: an absolute card index and its power
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gene {
    pub order: usize,
    pub power: u32,
}

impl Gene {
    pub fn new(order: usize, power: u32) -> Self {
        Self { order, power }
    }
}

/// Ways a plan can break the rules of the hand it was built for
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("plan has {found} genes but the hand has {expected} playable cards")]
    GeneCount { expected: usize, found: usize },

    #[error("plan commits {committed} power but only {budget} remains")]
    PowerOvercommit { committed: u64, budget: u32 },

    #[error("card {index} is not in the hand")]
    CardOutOfRange { index: usize },

    #[error("card {index} is not playable")]
    UnplayableCard { index: usize },

    #[error("card {index} appears more than once")]
    DuplicateCard { index: usize },
}

/// A candidate plan and its estimated win rate
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chromosome {
    pub genes: Vec<Gene>,
    /// Estimated win probability (0.0 to 1.0); 0.0 until scored
    pub fitness: f32,
}

impl Chromosome {
    /// Build a chromosome for `hand`.
    ///
    /// # Panics
    /// Panics if the genes are not a legal plan for the hand.
    pub fn new(genes: Vec<Gene>, hand: &Hand) -> Self {
        let chromosome = Self::from_genes(genes);
        if let Err(err) = chromosome.validate(hand) {
            panic!("invalid chromosome: {}", err);
        }
        chromosome
    }

    /// Unscored chromosome, without checking it against a hand
    pub fn from_genes(genes: Vec<Gene>) -> Self {
        Self {
            genes,
            fitness: 0.0,
        }
    }

    /// Check the plan against the hand's playable cards and power budget
    pub fn validate(&self, hand: &Hand) -> Result<(), PlanError> {
        let expected = hand.playable_count();
        if self.genes.len() != expected {
            return Err(PlanError::GeneCount {
                expected,
                found: self.genes.len(),
            });
        }

        let mut seen = vec![false; hand.cards.len()];
        for gene in &self.genes {
            let card = hand
                .cards
                .get(gene.order)
                .ok_or(PlanError::CardOutOfRange { index: gene.order })?;
            if !card.playable {
                return Err(PlanError::UnplayableCard { index: gene.order });
            }
            if std::mem::replace(&mut seen[gene.order], true) {
                return Err(PlanError::DuplicateCard { index: gene.order });
            }
        }

        let committed = self.total_power();
        if committed > u64::from(hand.power) {
            return Err(PlanError::PowerOvercommit {
                committed,
                budget: hand.power,
            });
        }

        Ok(())
    }

    pub fn total_power(&self) -> u64 {
        self.genes.iter().map(|g| u64::from(g.power)).sum()
    }

    /// The move this plan actually makes
    pub fn first_gene(&self) -> Option<Gene> {
        self.genes.first().copied()
    }

    /// Structural hash of the gene sequence
    pub fn genes_hash(&self) -> u64 {
        genes_hash(&self.genes)
    }

    /// Resolve genes into plays against the hand's cards
    pub fn plays(&self, hand: &Hand) -> Vec<Play> {
        self.genes
            .iter()
            .map(|gene| Play::new(&hand.cards[gene.order], gene.power))
            .collect()
    }
}

/// 64-bit hash over each gene's (order, power), allocation free
pub fn genes_hash(genes: &[Gene]) -> u64 {
    let mut hasher = FxHasher::default();
    genes.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use powerduel_core::Card;

    fn hand() -> Hand {
        let mut hand = Hand::new(
            12,
            6,
            vec![Card::new(3, 2), Card::new(5, 3), Card::new(7, 6), Card::new(4, 2)],
        );
        hand.cards[1].playable = false;
        hand
    }

    fn genes(pairs: &[(usize, u32)]) -> Vec<Gene> {
        pairs.iter().map(|&(o, p)| Gene::new(o, p)).collect()
    }

    #[test]
    fn test_valid_plan() {
        let c = Chromosome::new(genes(&[(2, 3), (0, 0), (3, 3)]), &hand());
        assert_eq!(c.total_power(), 6);
        assert_eq!(c.first_gene(), Some(Gene::new(2, 3)));
        assert_eq!(c.fitness, 0.0);

        let plays = c.plays(&hand());
        assert_eq!(plays[0], Play { value: 7, damage: 6, power: 3 });
    }

    #[test]
    fn test_validate_reports_violations() {
        let h = hand();

        let c = Chromosome::from_genes(genes(&[(2, 0), (0, 0)]));
        assert_eq!(c.validate(&h), Err(PlanError::GeneCount { expected: 3, found: 2 }));

        let c = Chromosome::from_genes(genes(&[(2, 4), (0, 2), (3, 1)]));
        assert_eq!(
            c.validate(&h),
            Err(PlanError::PowerOvercommit { committed: 7, budget: 6 })
        );

        let c = Chromosome::from_genes(genes(&[(2, 0), (1, 0), (3, 0)]));
        assert_eq!(c.validate(&h), Err(PlanError::UnplayableCard { index: 1 }));

        let c = Chromosome::from_genes(genes(&[(2, 0), (2, 0), (3, 0)]));
        assert_eq!(c.validate(&h), Err(PlanError::DuplicateCard { index: 2 }));

        let c = Chromosome::from_genes(genes(&[(2, 0), (9, 0), (3, 0)]));
        assert_eq!(c.validate(&h), Err(PlanError::CardOutOfRange { index: 9 }));
    }

    #[test]
    #[should_panic(expected = "invalid chromosome")]
    fn test_new_fails_fast() {
        Chromosome::new(genes(&[(0, 7), (2, 0), (3, 0)]), &hand());
    }

    #[test]
    fn test_hash_is_structural() {
        let a = genes(&[(0, 1), (2, 3)]);
        let b = genes(&[(0, 1), (2, 3)]);
        let swapped = genes(&[(2, 3), (0, 1)]);
        let shifted = genes(&[(0, 2), (2, 2)]);

        assert_eq!(genes_hash(&a), genes_hash(&b));
        assert_ne!(genes_hash(&a), genes_hash(&swapped));
        assert_ne!(genes_hash(&a), genes_hash(&shifted));
        assert_eq!(Chromosome::from_genes(a.clone()).genes_hash(), genes_hash(&a));
    }
}

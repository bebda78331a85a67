//! Crossover operators for plan evolution
//!
//! Plans are permutations of the hand's cards, so children are built with
//! order crossover (OX1): a run of genes is copied from one parent and the
//! remaining cards are filled in the order they appear in the other parent.
//! Genes travel with their power, so the child's total can exceed the
//! budget; `repair_power` trims it back.

use rand::Rng;

use crate::chromosome::{Chromosome, Gene};
use crate::config::EvolutionConfig;

/// Recombine a parent group.
///
/// Parents are paired in a ring (each with the next, the last with the
/// first) and every pair yields one child, so two parents give two children.
/// With probability `1 - crossover_rate` the group is copied instead.
/// Children are unscored.
pub fn crossover<R: Rng>(
    parents: &[&Chromosome],
    config: &EvolutionConfig,
    power_budget: u32,
    rng: &mut R,
) -> Vec<Chromosome> {
    if parents.len() < 2 || rng.gen::<f32>() >= config.crossover_rate {
        return parents
            .iter()
            .map(|p| Chromosome::from_genes(p.genes.clone()))
            .collect();
    }

    let len = parents[0].genes.len();
    let run = pick_run(len, config.max_crossover_length, rng);

    (0..parents.len())
        .map(|i| {
            let donor = parents[i];
            let filler = parents[(i + 1) % parents.len()];
            let mut child = order_crossover(donor, filler, run);
            repair_power(&mut child.genes, power_budget);
            child
        })
        .collect()
}

/// Build one OX1 child.
///
/// Positions `start..start + len` come from `donor`; the other positions are
/// filled, starting right after the run and wrapping around, with the
/// `filler` genes whose cards are not already in the run.
///
/// # Panics
/// Panics if the parents differ in length or the run does not fit.
pub fn order_crossover(
    donor: &Chromosome,
    filler: &Chromosome,
    (start, len): (usize, usize),
) -> Chromosome {
    let n = donor.genes.len();
    assert_eq!(n, filler.genes.len(), "Parents must have the same length");
    assert!(start + len <= n, "Crossover run out of bounds");

    let end = start + len;
    let run = &donor.genes[start..end];
    let mut genes: Vec<Option<Gene>> = vec![None; n];
    for (slot, &gene) in genes[start..end].iter_mut().zip(run) {
        *slot = Some(gene);
    }

    let fill = (0..n)
        .map(|k| filler.genes[(end + k) % n])
        .filter(|gene| !run.iter().any(|g| g.order == gene.order));
    let open = (0..n)
        .map(|k| (end + k) % n)
        .filter(|&pos| !(start..end).contains(&pos));

    for (pos, gene) in open.zip(fill) {
        genes[pos] = Some(gene);
    }

    Chromosome::from_genes(genes.into_iter().flatten().collect())
}

/// Trim powers from the last gene backward until the total fits the budget
pub fn repair_power(genes: &mut [Gene], budget: u32) {
    let total: u64 = genes.iter().map(|g| u64::from(g.power)).sum();
    let mut excess = total.saturating_sub(u64::from(budget));

    for gene in genes.iter_mut().rev() {
        if excess == 0 {
            break;
        }
        let cut = u64::from(gene.power).min(excess);
        gene.power -= cut as u32;
        excess -= cut;
    }
}

/// Random run (start, length) with 1 <= length <= min(max_len, n)
fn pick_run<R: Rng>(n: usize, max_len: usize, rng: &mut R) -> (usize, usize) {
    if n == 0 {
        return (0, 0);
    }
    let len = rng.gen_range(1..=max_len.clamp(1, n));
    let start = rng.gen_range(0..=n - len);
    (start, len)
}

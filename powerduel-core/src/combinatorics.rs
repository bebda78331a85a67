//! Plan enumeration helpers
//!
//! Both enumerations grow combinatorially: n! orderings and
//! C(total + k - 1, k - 1) power splits. Callers keep hands to a few cards
//! and the power budget in single or low double digits.

/// Every ordering of `items`.
///
/// Orderings are produced from a factorial-base counter: slot `i` of the
/// counter ranges over `0..n - i`, and each counter value decodes into one
/// permutation through the transpositions `swap(i, i + counter[i])`.
/// Distinct inputs give `n!` distinct outputs; an empty input gives one
/// empty ordering.
pub fn all_permutations<T: Copy>(items: &[T]) -> Vec<Vec<T>> {
    let n = items.len();
    if n == 0 {
        return vec![Vec::new()];
    }

    let capacity = usize::try_from(permutation_count(n)).unwrap_or(usize::MAX);
    let mut permutations = Vec::with_capacity(capacity);
    let mut counter = vec![0usize; n];

    loop {
        permutations.push(decode_permutation(items, &counter));
        if !advance_counter(&mut counter) {
            break;
        }
    }

    permutations
}

/// Every sequence of `k` non-negative integers summing to exactly `total`.
///
/// Results come out in lexicographic order and never alias each other.
/// The first `k - 1` slots are walked like an odometer kept on an explicit
/// stack, and the last slot takes whatever remains. With `k == 0` the only
/// composition is the empty one, and only when `total == 0`.
pub fn all_compositions(k: usize, total: u32) -> Vec<Vec<u32>> {
    if k == 0 {
        return if total == 0 { vec![Vec::new()] } else { Vec::new() };
    }

    let capacity = usize::try_from(composition_count(k, total)).unwrap_or(usize::MAX);
    let mut compositions = Vec::with_capacity(capacity);
    let mut prefix = vec![0u32; k - 1];
    let mut prefix_sum = 0u32;

    loop {
        let mut composition = Vec::with_capacity(k);
        composition.extend_from_slice(&prefix);
        composition.push(total - prefix_sum);
        compositions.push(composition);

        // Find the rightmost slot that can still grow; everything after it resets.
        let mut advanced = false;
        for slot in (0..prefix.len()).rev() {
            let tail: u32 = prefix[slot + 1..].iter().sum();
            let head = prefix_sum - tail;
            if head < total {
                prefix[slot] += 1;
                prefix[slot + 1..].fill(0);
                prefix_sum = head + 1;
                advanced = true;
                break;
            }
        }

        if !advanced {
            break;
        }
    }

    compositions
}

/// `n!`, saturating at `u64::MAX`
pub fn permutation_count(n: usize) -> u64 {
    (2..=n as u64).try_fold(1u64, |acc, i| acc.checked_mul(i))
        .unwrap_or(u64::MAX)
}

/// `C(total + k - 1, k - 1)`, saturating at `u64::MAX`
pub fn composition_count(k: usize, total: u32) -> u64 {
    if k == 0 {
        return u64::from(total == 0);
    }

    let n = u128::from(total) + k as u128 - 1;
    let r = (k as u128 - 1).min(u128::from(total));
    let mut count: u128 = 1;
    for i in 1..=r {
        // Exact at every step: count is C(n - r + i, i) after the division.
        count = count * (n - r + i) / i;
        if count > u128::from(u64::MAX) {
            return u64::MAX;
        }
    }
    count as u64
}

// ============================================================================
// Helpers
// ============================================================================

fn decode_permutation<T: Copy>(items: &[T], counter: &[usize]) -> Vec<T> {
    let mut permutation = items.to_vec();
    for (i, &offset) in counter.iter().enumerate() {
        permutation.swap(i, i + offset);
    }
    permutation
}

/// Increment the factorial-base counter; false once it wraps around
fn advance_counter(counter: &mut [usize]) -> bool {
    let n = counter.len();
    for i in (0..n).rev() {
        if counter[i] < n - i - 1 {
            counter[i] += 1;
            return true;
        }
        counter[i] = 0;
    }
    false
}

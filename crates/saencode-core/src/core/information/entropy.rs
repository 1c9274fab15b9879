use super::distribution::Distribution;
use std::hash::Hash;

/// Shannon entropy of a distribution, in bits.
pub fn entropy<K: Eq + Hash>(distribution: &Distribution<K>) -> f64 {
    shannon_entropy(distribution.probabilities())
}

/// Shannon entropy `-Σ p log2 p` of a set of probabilities, in bits.
///
/// Zero-probability terms contribute exactly zero. A distribution with a single
/// non-zero outcome has entropy exactly `0.0`, independent of rounding in `p`.
pub fn shannon_entropy(probabilities: impl IntoIterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut outcomes = 0usize;
    for p in probabilities {
        if p > 0.0 {
            sum -= p * p.log2();
            outcomes += 1;
        }
    }
    if outcomes <= 1 { 0.0 } else { sum }
}

/// Entropy of an empirical distribution given as raw counts over `total` samples.
#[inline]
pub(crate) fn entropy_from_counts(counts: &[u32], total: usize) -> f64 {
    let n = total as f64;
    shannon_entropy(counts.iter().map(|&c| f64::from(c) / n))
}

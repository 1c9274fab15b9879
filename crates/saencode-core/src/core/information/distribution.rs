use std::collections::HashMap;
use std::hash::Hash;

/// An empirical probability distribution over observed outcomes.
///
/// Built from observed-frequency counts: every outcome seen at least once gets
/// probability `count / total`, so probabilities are positive and sum to one
/// (up to rounding). Outcomes that were never observed are simply absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution<K: Eq + Hash> {
    probabilities: HashMap<K, f64>,
}

impl<K: Eq + Hash> Distribution<K> {
    /// Counts the samples and normalises the counts into probabilities.
    pub fn from_samples(samples: impl IntoIterator<Item = K>) -> Self {
        let mut counts: HashMap<K, usize> = HashMap::new();
        let mut total = 0usize;
        for sample in samples {
            *counts.entry(sample).or_default() += 1;
            total += 1;
        }
        Self::from_counts(counts, total)
    }

    fn from_counts(counts: HashMap<K, usize>, total: usize) -> Self {
        let probabilities = counts
            .into_iter()
            .map(|(k, c)| (k, c as f64 / total as f64))
            .collect();
        Self { probabilities }
    }

    /// Probability of `outcome`, zero if it was never observed.
    pub fn probability(&self, outcome: &K) -> f64 {
        self.probabilities.get(outcome).copied().unwrap_or(0.0)
    }

    /// Number of distinct observed outcomes.
    #[inline]
    pub fn support_size(&self) -> usize {
        self.probabilities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    pub fn probabilities(&self) -> impl Iterator<Item = f64> + '_ {
        self.probabilities.values().copied()
    }
}

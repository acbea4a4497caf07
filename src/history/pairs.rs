//! Symmetric pair counters

use crate::types::UnitName;
use crate::utils::{mean, pair_key, round_half_even};
use std::collections::BTreeMap;

/// Count per unordered pair of units
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairCounts {
    counts: BTreeMap<(UnitName, UnitName), u32>,
}

impl PairCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one to the pair; a unit paired with itself is ignored
    pub fn record(&mut self, first: &str, second: &str) {
        if first == second {
            return;
        }
        *self.counts.entry(pair_key(first, second)).or_insert(0) += 1;
    }

    /// Count for the pair in either order, 0 if never seen
    pub fn count(&self, first: &str, second: &str) -> u32 {
        self.counts
            .get(&pair_key(first, second))
            .copied()
            .unwrap_or(0)
    }

    /// Pairs with a non-zero count, in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, u32)> {
        self.counts
            .iter()
            .map(|((first, second), count)| (first.as_str(), second.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Everyone paired with `unit`, most frequent first
    pub fn partners(&self, unit: &str) -> Vec<(&str, u32)> {
        let mut partners: Vec<(&str, u32)> = self
            .iter()
            .filter_map(|(first, second, count)| {
                if first == unit {
                    Some((second, count))
                } else if second == unit {
                    Some((first, count))
                } else {
                    None
                }
            })
            .collect();
        partners.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        partners
    }

    /// Mean count over recorded pairs, 0 when empty
    pub fn mean_count(&self) -> f64 {
        let counts: Vec<f64> = self.counts.values().map(|c| *c as f64).collect();
        mean(&counts)
    }

    /// Mean count rounded half-to-even; counts above it are over-teamed
    pub fn over_teaming_threshold(&self) -> u32 {
        round_half_even(self.mean_count()) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_is_symmetric() {
        let mut pairs = PairCounts::new();
        pairs.record("a", "b");
        pairs.record("b", "a");
        pairs.record("a", "a");

        assert_eq!(pairs.count("a", "b"), 2);
        assert_eq!(pairs.count("b", "a"), 2);
        assert_eq!(pairs.count("a", "a"), 0);
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn test_threshold_rounds_half_to_even() {
        let mut pairs = PairCounts::new();
        assert_eq!(pairs.mean_count(), 0.0);
        assert_eq!(pairs.over_teaming_threshold(), 0);

        // counts 1 and 4: mean 2.5 rounds down to 2
        pairs.record("a", "b");
        for _ in 0..4 {
            pairs.record("c", "d");
        }
        assert_eq!(pairs.mean_count(), 2.5);
        assert_eq!(pairs.over_teaming_threshold(), 2);

        // counts 1, 4, 2: mean 2.33
        pairs.record("a", "c");
        pairs.record("a", "c");
        assert_eq!(pairs.over_teaming_threshold(), 2);
    }

    #[test]
    fn test_partners_sorted_by_count() {
        let mut pairs = PairCounts::new();
        pairs.record("a", "b");
        pairs.record("a", "c");
        pairs.record("c", "a");
        pairs.record("b", "d");

        assert_eq!(pairs.partners("a"), vec![("c", 2), ("b", 1)]);
        assert!(pairs.partners("z").is_empty());
    }
}

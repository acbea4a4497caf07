//! Rating state value objects
//!
//! Ratings and rounds-played counters are plain owned maps with explicit
//! defaults for units that have not been seen yet.

use crate::types::UnitName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ratings keyed by unit, defaulting to the initial rating for unseen units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingState {
    initial_rating: f64,
    ratings: BTreeMap<UnitName, f64>,
}

impl RatingState {
    /// Create an empty state where every unit starts at `initial_rating`
    pub fn new(initial_rating: f64) -> Self {
        Self {
            initial_rating,
            ratings: BTreeMap::new(),
        }
    }

    pub fn initial_rating(&self) -> f64 {
        self.initial_rating
    }

    /// Current rating of a unit, or the initial rating if it was never seen
    pub fn rating(&self, unit: &str) -> f64 {
        self.ratings
            .get(unit)
            .copied()
            .unwrap_or(self.initial_rating)
    }

    /// Make the unit explicit in the state without changing its rating
    pub fn ensure(&mut self, unit: &str) {
        if !self.ratings.contains_key(unit) {
            self.ratings.insert(unit.to_string(), self.initial_rating);
        }
    }

    pub fn set(&mut self, unit: &str, rating: f64) {
        self.ratings.insert(unit.to_string(), rating);
    }

    /// Add `delta` to the unit's rating
    pub fn adjust(&mut self, unit: &str, delta: f64) {
        let rating = self.rating(unit) + delta;
        self.ratings.insert(unit.to_string(), rating);
    }

    pub fn contains(&self, unit: &str) -> bool {
        self.ratings.contains_key(unit)
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    /// Explicitly tracked units in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.ratings.iter().map(|(unit, rating)| (unit.as_str(), *rating))
    }

    /// Mean rating across tracked units, None when empty
    pub fn mean_rating(&self) -> Option<f64> {
        if self.ratings.is_empty() {
            return None;
        }
        Some(self.ratings.values().sum::<f64>() / self.ratings.len() as f64)
    }

    /// Units ordered by rating, highest first; ties keep name order
    pub fn ranked(&self) -> Vec<(UnitName, f64)> {
        let mut ranked: Vec<(UnitName, f64)> = self
            .ratings
            .iter()
            .map(|(unit, rating)| (unit.clone(), *rating))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    pub fn into_map(self) -> BTreeMap<UnitName, f64> {
        self.ratings
    }
}

/// Number of counted rounds per unit, defaulting to zero
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundsPlayed {
    counts: BTreeMap<UnitName, u32>,
}

impl RoundsPlayed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, unit: &str) -> u32 {
        self.counts.get(unit).copied().unwrap_or(0)
    }

    pub fn increment(&mut self, unit: &str) {
        *self.counts.entry(unit.to_string()).or_insert(0) += 1;
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(unit, count)| (unit.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unseen_unit_gets_initial_rating() {
        let state = RatingState::new(1500.0);
        assert_eq!(state.rating("nobody"), 1500.0);
        assert!(!state.contains("nobody"));
        assert!(state.is_empty());
    }

    #[test]
    fn test_adjust_starts_from_initial() {
        let mut state = RatingState::new(1500.0);
        state.adjust("1st Minnesota", 12.5);
        state.adjust("1st Minnesota", -2.5);
        assert_eq!(state.rating("1st Minnesota"), 1510.0);
    }

    #[test]
    fn test_ensure_does_not_overwrite() {
        let mut state = RatingState::new(1500.0);
        state.set("a", 1600.0);
        state.ensure("a");
        state.ensure("b");
        assert_eq!(state.rating("a"), 1600.0);
        assert_eq!(state.rating("b"), 1500.0);
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn test_ranked_and_mean() {
        let mut state = RatingState::new(1500.0);
        state.set("low", 1400.0);
        state.set("high", 1650.0);
        state.set("mid", 1500.0);

        let ranked: Vec<String> = state.ranked().into_iter().map(|(u, _)| u).collect();
        assert_eq!(ranked, vec!["high", "mid", "low"]);
        assert!((state.mean_rating().unwrap() - 4550.0 / 3.0).abs() < 1e-9);
        assert_eq!(RatingState::new(1500.0).mean_rating(), None);
    }

    #[test]
    fn test_rounds_played_defaults_to_zero() {
        let mut rounds = RoundsPlayed::new();
        assert_eq!(rounds.get("a"), 0);
        rounds.increment("a");
        rounds.increment("a");
        assert_eq!(rounds.get("a"), 2);
        assert_eq!(rounds.len(), 1);
    }
}

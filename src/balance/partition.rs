//! Candidate partitions and their balance metrics

use crate::history::TeammateHistory;
use crate::types::{PlayerRange, UnitName};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// A two-way split of units with its size and variety metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub team_a: BTreeSet<UnitName>,
    pub team_b: BTreeSet<UnitName>,
    pub min_a: u64,
    pub max_a: u64,
    pub min_b: u64,
    pub max_b: u64,
    /// 0 when the two [min, max] intervals overlap
    pub range_gap: u64,
    /// |min_a - min_b|
    pub min_diff: u64,
    /// Same-side co-rostering counts plus the over-teaming penalty
    pub teammate_score: u64,
    /// Difference of the range midpoints
    pub avg_diff: f64,
}

/// Ranking key; lower is better, compared field by field
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct PartitionScore {
    pub range_gap: u64,
    pub min_diff: u64,
    pub teammate_score: u64,
    pub avg_diff: f64,
}

impl Partition {
    pub fn score(&self) -> PartitionScore {
        PartitionScore {
            range_gap: self.range_gap,
            min_diff: self.min_diff,
            teammate_score: self.teammate_score,
            avg_diff: self.avg_diff,
        }
    }

    /// Whether the partition keeps both size bounds within `max_player_diff`
    pub fn within(&self, max_player_diff: u32) -> bool {
        let limit = u64::from(max_player_diff);
        self.range_gap <= limit && self.min_diff <= limit
    }
}

/// Penalty rule for repeated pairings
#[derive(Debug, Clone, Copy)]
pub struct TeammatePenalty {
    pub threshold: u32,
    pub multiplier: u64,
    /// No penalty at all while the history has no pairs
    pub active: bool,
}

impl TeammatePenalty {
    pub fn from_history(history: &TeammateHistory, multiplier: u64) -> Self {
        Self {
            threshold: history.over_teaming_threshold(),
            multiplier,
            active: history.mean_count() > 0.0,
        }
    }

    /// Heat of one side: every pair's count, plus the penalty on the excess
    pub fn side_score(&self, side: &[&str], history: &TeammateHistory) -> u64 {
        let mut score = 0u64;
        for (i, first) in side.iter().enumerate() {
            for second in &side[i + 1..] {
                let count = history.count(first, second);
                score = score.saturating_add(u64::from(count));
                if self.active && count > self.threshold {
                    let excess = u64::from(count - self.threshold).saturating_mul(self.multiplier);
                    score = score.saturating_add(excess);
                }
            }
        }
        score
    }
}

/// Build a partition and compute its metrics
pub fn evaluate(
    team_a: &[&str],
    team_b: &[&str],
    ranges: &HashMap<UnitName, PlayerRange>,
    history: &TeammateHistory,
    penalty: &TeammatePenalty,
) -> Partition {
    let (min_a, max_a) = side_totals(team_a, ranges);
    let (min_b, max_b) = side_totals(team_b, ranges);

    let range_gap = if max_a < min_b {
        min_b - max_a
    } else if max_b < min_a {
        min_a - max_b
    } else {
        0
    };

    let avg_a = (min_a + max_a) as f64 / 2.0;
    let avg_b = (min_b + max_b) as f64 / 2.0;

    Partition {
        team_a: team_a.iter().map(|u| u.to_string()).collect(),
        team_b: team_b.iter().map(|u| u.to_string()).collect(),
        min_a,
        max_a,
        min_b,
        max_b,
        range_gap,
        min_diff: min_a.abs_diff(min_b),
        teammate_score: penalty
            .side_score(team_a, history)
            .saturating_add(penalty.side_score(team_b, history)),
        avg_diff: (avg_a - avg_b).abs(),
    }
}

fn side_totals(side: &[&str], ranges: &HashMap<UnitName, PlayerRange>) -> (u64, u64) {
    side.iter()
        .filter_map(|unit| ranges.get(*unit))
        .fold((0, 0), |(min, max), range| {
            (min + u64::from(range.min), max + u64::from(range.max))
        })
}

/// k-element index combinations of `0..n` in lexicographic order
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    indices: Vec<usize>,
    started: bool,
    done: bool,
}

impl Combinations {
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            indices: (0..k).collect(),
            started: false,
            done: k > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.indices.clone());
        }

        let k = self.indices.len();
        let mut i = k;
        while i > 0 {
            i -= 1;
            if self.indices[i] != i + self.n - k {
                self.indices[i] += 1;
                for j in i + 1..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                return Some(self.indices.clone());
            }
        }

        self.done = true;
        None
    }
}

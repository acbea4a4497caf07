//! Pair-count builders over a season
//!
//! Both builders count a pair once per week, whether or not any round of
//! that week was played.

use crate::history::pairs::PairCounts;
use crate::types::WeeklyMatch;
use crate::utils::weeks_through;
use std::collections::BTreeSet;
use tracing::debug;

/// How often each pair of units shared a roster
pub type TeammateHistory = PairCounts;

/// How often each pair of units faced each other
pub type OpponentHistory = PairCounts;

/// Count same-roster pairs over the weeks up to and including `cutoff`
pub fn build_teammate_counts(matches: &[WeeklyMatch], cutoff: Option<usize>) -> TeammateHistory {
    let weeks = weeks_through(matches, cutoff);
    let mut history = PairCounts::new();

    for week in weeks {
        record_roster(&mut history, &week.team_a);
        record_roster(&mut history, &week.team_b);
    }

    debug!(
        "Teammate history over {} weeks: {} pairs, mean {:.2}",
        weeks.len(),
        history.len(),
        history.mean_count()
    );
    history
}

/// Count cross-roster pairs over the weeks up to and including `cutoff`
pub fn build_opponent_counts(matches: &[WeeklyMatch], cutoff: Option<usize>) -> OpponentHistory {
    let mut history = PairCounts::new();

    for week in weeks_through(matches, cutoff) {
        for first in &week.team_a {
            for second in &week.team_b {
                history.record(first, second);
            }
        }
    }

    history
}

fn record_roster(history: &mut PairCounts, roster: &BTreeSet<String>) {
    let units: Vec<&String> = roster.iter().collect();
    for (i, first) in units.iter().enumerate() {
        for second in &units[i + 1..] {
            history.record(first, second);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RoundResult, Side};

    fn season() -> Vec<WeeklyMatch> {
        let mut first = WeeklyMatch::new(["a", "b", "c"], ["d"]);
        first.rounds = [RoundResult::won_by(Side::A), RoundResult::won_by(Side::B)];

        // roster-only week still counts
        let second = WeeklyMatch::new(["a", "b"], ["c", "d"]);

        vec![first, second]
    }

    #[test]
    fn test_teammates_counted_once_per_week() {
        let history = build_teammate_counts(&season(), None);

        assert_eq!(history.count("a", "b"), 2);
        assert_eq!(history.count("a", "c"), 1);
        assert_eq!(history.count("b", "c"), 1);
        assert_eq!(history.count("c", "d"), 1);
        assert_eq!(history.count("a", "d"), 0);
    }

    #[test]
    fn test_teammate_cutoff() {
        let history = build_teammate_counts(&season(), Some(0));
        assert_eq!(history.count("a", "b"), 1);
        assert_eq!(history.count("c", "d"), 0);

        let past_end = build_teammate_counts(&season(), Some(40));
        assert_eq!(past_end, build_teammate_counts(&season(), None));
    }

    #[test]
    fn test_opponents_are_cross_roster() {
        let history = build_opponent_counts(&season(), None);

        assert_eq!(history.count("a", "d"), 2);
        assert_eq!(history.count("c", "d"), 1);
        assert_eq!(history.count("a", "c"), 1);
        assert_eq!(history.count("a", "b"), 0);
    }
}

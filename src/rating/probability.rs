//! Expected-outcome helpers built on the logistic Elo curve

use crate::rating::headcount::HeadcountLookup;
use crate::rating::state::RatingState;
use crate::types::{UnitName, WeeklyMatch};
use serde::{Deserialize, Serialize};
use skillratings::elo::EloRating;
use std::collections::BTreeSet;

/// Probability that a side rated `rating_a` beats a side rated `rating_b`
pub fn expected_score(rating_a: f64, rating_b: f64) -> f64 {
    let (expected_a, _) = skillratings::elo::expected_score(
        &EloRating { rating: rating_a },
        &EloRating { rating: rating_b },
    );
    expected_a
}

/// Headcount-weighted average rating of a roster.
///
/// Returns None for an empty roster or one whose total headcount is zero.
pub fn roster_strength(
    roster: &BTreeSet<UnitName>,
    ratings: &RatingState,
    headcount: &dyn HeadcountLookup,
    week_index: usize,
) -> Option<f64> {
    let mut total_players = 0.0;
    let mut weighted = 0.0;
    for unit in roster {
        let players = headcount.headcount(unit, week_index);
        total_players += players;
        weighted += ratings.rating(unit) * players;
    }

    if roster.is_empty() || total_players <= 0.0 {
        return None;
    }
    Some(weighted / total_players)
}

/// Pre-match strength and win chance for both rosters of a week
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WinChance {
    pub strength_a: Option<f64>,
    pub strength_b: Option<f64>,
    pub chance_a: Option<f64>,
    pub chance_b: Option<f64>,
}

/// Win chance for the rosters of `week`, rated with `ratings`.
///
/// A side with no usable roster concedes: the other side gets 100%.
/// With neither side usable both chances are None.
pub fn win_chance(
    week: &WeeklyMatch,
    ratings: &RatingState,
    headcount: &dyn HeadcountLookup,
    week_index: usize,
) -> WinChance {
    let strength_a = roster_strength(&week.team_a, ratings, headcount, week_index);
    let strength_b = roster_strength(&week.team_b, ratings, headcount, week_index);

    let (chance_a, chance_b) = match (strength_a, strength_b) {
        (Some(a), Some(b)) => {
            let expected_a = expected_score(a, b);
            (Some(expected_a), Some(1.0 - expected_a))
        }
        (Some(_), None) => (Some(1.0), Some(0.0)),
        (None, Some(_)) => (Some(0.0), Some(1.0)),
        (None, None) => (None, None),
    };

    WinChance {
        strength_a,
        strength_b,
        chance_a,
        chance_b,
    }
}

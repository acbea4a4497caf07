//! Elo engine for roster-based team matches
//!
//! Ratings are rebuilt from scratch by replaying the season in order. Each
//! counted round compares the headcount-weighted average ratings of the two
//! rosters, adjusts the expectation for map bias, and spreads the resulting
//! change over each roster by log-headcount, lead status and distance from
//! the team's mean rating.

use crate::config::EloSettings;
use crate::error::Result;
use crate::rating::headcount::HeadcountLookup;
use crate::rating::map_bias::{MapBiasProvider, StaticMapBias};
use crate::rating::probability::expected_score;
use crate::rating::state::{RatingState, RoundsPlayed};
use crate::types::{RoundResult, Side, UnitName, WeeklyMatch};
use crate::utils::{clamp, weeks_through};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, info};

/// Bounds on the relative-factor dampening
const RELATIVE_FACTOR_MIN: f64 = 0.8;
const RELATIVE_FACTOR_MAX: f64 = 1.2;

/// Expected vs actual outcome of one counted round, from side A's view
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundPrediction {
    pub week: usize,
    pub round: usize,
    pub expected_a: f64,
    pub actual_a: f64,
}

/// One row of a weekly standings table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub unit: UnitName,
    pub rating: f64,
    /// 1 = highest rating that week
    pub rank: usize,
    /// Change against the previous snapshot
    pub change: f64,
}

/// Everything produced by a replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonReplay {
    pub ratings: RatingState,
    pub rounds_played: RoundsPlayed,
    /// Snapshot before the first week, then one after every processed week
    pub weekly: Vec<RatingState>,
    pub predictions: Vec<RoundPrediction>,
}

impl SeasonReplay {
    /// Rating change of every unit over the last processed week
    pub fn last_week_changes(&self) -> BTreeMap<UnitName, f64> {
        let previous = match self.weekly.len() {
            0 | 1 => None,
            n => Some(&self.weekly[n - 2]),
        };

        self.ratings
            .iter()
            .map(|(unit, rating)| {
                let before = previous
                    .map(|state| state.rating(unit))
                    .unwrap_or_else(|| self.ratings.initial_rating());
                (unit.to_string(), rating - before)
            })
            .collect()
    }

    /// Ranked standings after week `week_index`, None past the replayed range
    pub fn standings(&self, week_index: usize) -> Option<Vec<Standing>> {
        let after = self.weekly.get(week_index + 1)?;
        let before = &self.weekly[week_index];

        Some(
            after
                .ranked()
                .into_iter()
                .enumerate()
                .map(|(i, (unit, rating))| {
                    let change = rating - before.rating(&unit);
                    Standing {
                        unit,
                        rating,
                        rank: i + 1,
                        change,
                    }
                })
                .collect(),
        )
    }
}

/// Damping applied to a unit's share: units above their team's mean move
/// less, units below move more
pub fn relative_factor(team_average: f64, rating: f64) -> f64 {
    if rating <= 0.0 {
        return 1.0;
    }
    clamp(
        (team_average / rating).sqrt(),
        RELATIVE_FACTOR_MIN,
        RELATIVE_FACTOR_MAX,
    )
}

/// Elo rating engine
pub struct RatingEngine {
    settings: EloSettings,
    map_bias: Arc<dyn MapBiasProvider>,
}

impl std::fmt::Debug for RatingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RatingEngine")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl RatingEngine {
    /// Create a new engine; fails if the settings are invalid
    pub fn new(settings: EloSettings, map_bias: Arc<dyn MapBiasProvider>) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings, map_bias })
    }

    /// Engine with no map bias table and the default attacker maps
    pub fn with_settings(settings: EloSettings) -> Result<Self> {
        Self::new(settings, Arc::new(StaticMapBias::default()))
    }

    pub fn settings(&self) -> &EloSettings {
        &self.settings
    }

    /// Final ratings and rounds played after replaying `matches` up to and
    /// including week `cutoff` (the whole season when None)
    pub fn compute_ratings(
        &self,
        matches: &[WeeklyMatch],
        cutoff: Option<usize>,
        headcount: &dyn HeadcountLookup,
    ) -> Result<(RatingState, RoundsPlayed)> {
        let replay = self.replay(matches, cutoff, headcount)?;
        Ok((replay.ratings, replay.rounds_played))
    }

    /// Replay the season, keeping weekly snapshots and per-round predictions
    pub fn replay(
        &self,
        matches: &[WeeklyMatch],
        cutoff: Option<usize>,
        headcount: &dyn HeadcountLookup,
    ) -> Result<SeasonReplay> {
        let weeks = weeks_through(matches, cutoff);
        for (week_index, week) in weeks.iter().enumerate() {
            week.validate(week_index)?;
        }

        let mut current = RatingState::new(self.settings.initial_rating);
        for week in weeks {
            for unit in week.team_a.iter().chain(&week.team_b) {
                current.ensure(unit);
            }
        }

        let mut weekly = Vec::with_capacity(weeks.len() + 1);
        weekly.push(current.clone());
        let mut rounds_played = RoundsPlayed::new();
        let mut predictions = Vec::new();

        for (week_index, week) in weeks.iter().enumerate() {
            if week.team_a.is_empty() || week.team_b.is_empty() {
                debug!("Week {}: a roster is empty, no rounds counted", week_index);
                weekly.push(current.clone());
                continue;
            }

            let sweep = week.sweep_winner();
            for round_index in 0..week.rounds.len() {
                if let Some(prediction) = self.apply_round(
                    &mut current,
                    &mut rounds_played,
                    week,
                    week_index,
                    round_index,
                    sweep,
                    headcount,
                ) {
                    predictions.push(prediction);
                }
            }

            weekly.push(current.clone());
        }

        info!(
            "Replayed {} weeks, {} rounds counted, {} units rated",
            weeks.len(),
            predictions.len(),
            current.len()
        );

        Ok(SeasonReplay {
            ratings: current,
            rounds_played,
            weekly,
            predictions,
        })
    }

    /// Side A's expected score for a round, after map bias and clamping.
    /// Rounds without a map use the plain logistic value.
    pub fn expected_score_for_round(&self, rating_a: f64, rating_b: f64, round: &RoundResult) -> f64 {
        let expected_a = expected_score(rating_a, rating_b);

        let Some(map) = round.map.as_deref().filter(|m| !m.trim().is_empty()) else {
            return expected_a;
        };

        let level = self.map_bias.bias_level(map);
        let multiplier = self.settings.map_bias.multiplier(level);
        let adjusted = match self.map_bias.attacker_side(map, round.flipped) {
            Side::A => expected_a * multiplier,
            Side::B => expected_a / multiplier,
        };

        clamp(
            adjusted,
            self.settings.expected_score_floor,
            self.settings.expected_score_ceiling,
        )
    }

    /// Unnormalised share of a unit within its side
    fn unit_weight(&self, players: f64, is_lead: bool) -> f64 {
        if players <= 0.0 {
            return 0.0;
        }
        let lead = if is_lead {
            self.settings.lead_multiplier
        } else {
            1.0
        };
        (1.0 + players).ln().powf(self.settings.size_influence_exponent) * lead
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_round(
        &self,
        state: &mut RatingState,
        rounds_played: &mut RoundsPlayed,
        week: &WeeklyMatch,
        week_index: usize,
        round_index: usize,
        sweep: Option<Side>,
        headcount: &dyn HeadcountLookup,
    ) -> Option<RoundPrediction> {
        let round = &week.rounds[round_index];
        let winner = round.winner?;

        let side_a = side_headcounts(&week.team_a, headcount, week_index);
        let side_b = side_headcounts(&week.team_b, headcount, week_index);
        let total_a: f64 = side_a.iter().map(|(_, players)| players).sum();
        let total_b: f64 = side_b.iter().map(|(_, players)| players).sum();

        if total_a <= 0.0 || total_b <= 0.0 {
            debug!(
                "Week {} round {}: zero headcount on a side, skipped",
                week_index,
                round_index + 1
            );
            return None;
        }

        let average_a = weighted_rating(state, &side_a, total_a);
        let average_b = weighted_rating(state, &side_b, total_b);
        let expected_a = self.expected_score_for_round(average_a, average_b, round);
        let actual_a = if winner == Side::A { 1.0 } else { 0.0 };
        let base_change = actual_a - expected_a;

        let round_multiplier = if week.playoffs {
            self.settings.playoff_multiplier
        } else {
            1.0
        };
        let (lead_a, lead_b) = week.leads_for(round_index);

        for (side, units, lead) in [(Side::A, &side_a, lead_a), (Side::B, &side_b, lead_b)] {
            let sweep_bonus = if sweep == Some(side) {
                self.settings.sweep_bonus_multiplier
            } else {
                1.0
            };
            let scaled_change = base_change * side.sign() * round_multiplier * sweep_bonus;
            self.distribute(state, rounds_played, units, lead, scaled_change);
        }

        for unit in week.team_a.iter().chain(&week.team_b) {
            rounds_played.increment(unit);
        }

        debug!(
            "Week {} round {}: expected A {:.3}, winner {}, base change {:+.3}",
            week_index,
            round_index + 1,
            expected_a,
            winner,
            base_change
        );

        Some(RoundPrediction {
            week: week_index,
            round: round_index,
            expected_a,
            actual_a,
        })
    }

    /// Spread a side's change over its units
    fn distribute(
        &self,
        state: &mut RatingState,
        rounds_played: &RoundsPlayed,
        units: &[(&str, f64)],
        lead: Option<&str>,
        scaled_change: f64,
    ) {
        let weights: Vec<f64> = units
            .iter()
            .map(|(unit, players)| self.unit_weight(*players, lead == Some(*unit)))
            .collect();
        let total_weight: f64 = weights.iter().sum();
        if total_weight <= 0.0 || units.is_empty() {
            return;
        }

        let team_average =
            units.iter().map(|(unit, _)| state.rating(unit)).sum::<f64>() / units.len() as f64;

        for ((unit, _), weight) in units.iter().zip(&weights) {
            if *weight <= 0.0 {
                continue;
            }
            let rating = state.rating(unit);
            let k = self.settings.k_factor_for(rounds_played.get(unit));
            let delta =
                k * scaled_change * (weight / total_weight) * relative_factor(team_average, rating);
            state.adjust(unit, delta);
        }
    }
}

fn side_headcounts<'a>(
    roster: &'a BTreeSet<UnitName>,
    headcount: &dyn HeadcountLookup,
    week_index: usize,
) -> Vec<(&'a str, f64)> {
    roster
        .iter()
        .map(|unit| (unit.as_str(), headcount.headcount(unit, week_index).max(0.0)))
        .collect()
}

fn weighted_rating(state: &RatingState, units: &[(&str, f64)], total_players: f64) -> f64 {
    units
        .iter()
        .map(|(unit, players)| state.rating(unit) * players)
        .sum::<f64>()
        / total_players
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::map_bias::MockMapBiasProvider;
    use crate::types::BiasLevel;

    fn ten(_: &str, _: usize) -> f64 {
        10.0
    }

    fn engine() -> RatingEngine {
        RatingEngine::with_settings(EloSettings::default()).unwrap()
    }

    fn one_round(a: &[&str], b: &[&str], winner: Option<Side>) -> WeeklyMatch {
        let mut week = WeeklyMatch::new(a.iter().copied(), b.iter().copied());
        week.rounds[0].winner = winner;
        week
    }

    fn bias_engine(level: BiasLevel, attacker: Side) -> RatingEngine {
        let mut provider = MockMapBiasProvider::new();
        provider.expect_bias_level().returning(move |_| level);
        provider.expect_attacker_side().returning(move |_, _| attacker);
        RatingEngine::new(EloSettings::default(), Arc::new(provider)).unwrap()
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = EloSettings {
            k_factor_standard: -5.0,
            ..EloSettings::default()
        };
        assert!(RatingEngine::with_settings(settings).is_err());
    }

    #[test]
    fn test_single_round_one_on_one() {
        let week = one_round(&["a"], &["b"], Some(Side::A));
        let (ratings, rounds) = engine().compute_ratings(&[week], None, &ten).unwrap();

        // even teams: expected 0.5, provisional K 128
        assert!((ratings.rating("a") - 1564.0).abs() < 1e-9);
        assert!((ratings.rating("b") - 1436.0).abs() < 1e-9);
        assert_eq!(rounds.get("a"), 1);
        assert_eq!(rounds.get("b"), 1);
    }

    #[test]
    fn test_unplayed_round_changes_nothing() {
        let week = one_round(&["a", "c"], &["b"], None);
        let (ratings, rounds) = engine().compute_ratings(&[week], None, &ten).unwrap();

        for unit in ["a", "b", "c"] {
            assert_eq!(ratings.rating(unit), 1500.0);
            assert_eq!(rounds.get(unit), 0);
        }
    }

    #[test]
    fn test_zero_headcount_side_skips_round() {
        let week = one_round(&["a"], &["ghost"], Some(Side::A));
        let lookup = |unit: &str, _: usize| if unit == "ghost" { 0.0 } else { 10.0 };
        let (ratings, rounds) = engine().compute_ratings(&[week], None, &lookup).unwrap();

        assert_eq!(ratings.rating("a"), 1500.0);
        assert_eq!(rounds.get("a"), 0);
        assert_eq!(rounds.get("ghost"), 0);
    }

    #[test]
    fn test_zero_headcount_unit_gets_no_delta() {
        let week = one_round(&["a", "absent"], &["b"], Some(Side::A));
        let lookup = |unit: &str, _: usize| if unit == "absent" { 0.0 } else { 10.0 };
        let (ratings, rounds) = engine().compute_ratings(&[week], None, &lookup).unwrap();

        assert_eq!(ratings.rating("absent"), 1500.0);
        assert!(ratings.rating("a") > 1500.0);
        assert_eq!(rounds.get("absent"), 1);
    }

    #[test]
    fn test_lead_takes_larger_share() {
        let mut week = one_round(&["lead", "other"], &["b"], Some(Side::A));
        week.lead_a = Some("lead".to_string());
        let (ratings, _) = engine().compute_ratings(&[week], None, &ten).unwrap();

        let lead_gain = ratings.rating("lead") - 1500.0;
        let other_gain = ratings.rating("other") - 1500.0;
        assert!((lead_gain - 2.0 * other_gain).abs() < 1e-9);
        assert!((lead_gain + other_gain - 64.0).abs() < 1e-9);
    }

    #[test]
    fn test_sweep_bonus_only_for_sweeping_side() {
        let mut week = WeeklyMatch::new(["a"], ["b"]);
        week.rounds = [RoundResult::won_by(Side::A), RoundResult::won_by(Side::A)];
        let replay = engine().replay(&[week], None, &ten).unwrap();

        // first round: A gains 64 * 1.25, B loses the unboosted 64
        let first = &replay.predictions[0];
        assert_eq!(first.expected_a, 0.5);
        assert_eq!(replay.rounds_played.get("a"), 2);

        let mut single = WeeklyMatch::new(["a"], ["b"]);
        single.rounds = [RoundResult::won_by(Side::A), RoundResult::default()];
        let (after_one, _) = engine().compute_ratings(&[single], None, &ten).unwrap();
        assert!((after_one.rating("a") - 1564.0).abs() < 1e-9);

        let a_total = replay.ratings.rating("a") - 1500.0;
        let b_total = 1500.0 - replay.ratings.rating("b");
        assert!(a_total > b_total);
    }

    #[test]
    fn test_playoffs_use_round_leads_and_multiplier() {
        let mut week = one_round(&["x", "y"], &["b"], Some(Side::A));
        week.playoffs = true;
        week.lead_a = Some("y".to_string());
        week.rounds[0].lead_a = Some("x".to_string());
        let (ratings, _) = engine().compute_ratings(&[week], None, &ten).unwrap();

        let x_gain = ratings.rating("x") - 1500.0;
        let y_gain = ratings.rating("y") - 1500.0;
        assert!(x_gain > y_gain);
        assert!((x_gain + y_gain - 64.0 * 1.25).abs() < 1e-9);
        assert!((1500.0 - ratings.rating("b") - 64.0 * 1.25).abs() < 1e-9);
    }

    #[test]
    fn test_provisional_to_standard_transition() {
        // provisional rounds move nothing, so every round starts from 1500
        let settings = EloSettings {
            k_factor_provisional: 0.0,
            ..EloSettings::default()
        };
        let engine = RatingEngine::with_settings(settings).unwrap();
        let weeks: Vec<WeeklyMatch> = (0..11)
            .map(|_| one_round(&["a"], &["b"], Some(Side::A)))
            .collect();

        let (after_ten, rounds) = engine.compute_ratings(&weeks, Some(9), &ten).unwrap();
        assert_eq!(rounds.get("a"), 10);
        assert_eq!(after_ten.rating("a"), 1500.0);

        let (after_eleven, rounds) = engine.compute_ratings(&weeks, Some(10), &ten).unwrap();
        assert_eq!(rounds.get("a"), 11);
        assert!((after_eleven.rating("a") - 1548.0).abs() < 1e-9);
    }

    #[test]
    fn test_map_bias_multiplies_attacker_expectation() {
        let round = RoundResult::won_by(Side::A).on_map("Bloody Lane", false);

        let attacker_a = bias_engine(BiasLevel::HeavyAttacker, Side::A);
        assert!((attacker_a.expected_score_for_round(1500.0, 1500.0, &round) - 0.65).abs() < 1e-12);

        let attacker_b = bias_engine(BiasLevel::HeavyAttacker, Side::B);
        assert!((attacker_b.expected_score_for_round(1500.0, 1500.0, &round) - 0.5 / 1.3).abs() < 1e-12);

        let defender = bias_engine(BiasLevel::LightDefender, Side::A);
        assert!((defender.expected_score_for_round(1500.0, 1500.0, &round) - 0.425).abs() < 1e-12);
    }

    #[test]
    fn test_biased_expectation_is_clamped() {
        let round = RoundResult::won_by(Side::A).on_map("Bloody Lane", false);
        let engine = bias_engine(BiasLevel::HeavyAttacker, Side::A);
        assert_eq!(engine.expected_score_for_round(1900.0, 1500.0, &round), 0.95);

        let engine = bias_engine(BiasLevel::HeavyAttacker, Side::B);
        assert_eq!(engine.expected_score_for_round(1000.0, 1700.0, &round), 0.05);
    }

    #[test]
    fn test_round_without_map_is_not_biased() {
        let provider = MockMapBiasProvider::new();
        let engine = RatingEngine::new(EloSettings::default(), Arc::new(provider)).unwrap();
        let round = RoundResult::won_by(Side::A);

        let raw = expected_score(2100.0, 1500.0);
        assert!(raw > 0.95);
        assert_eq!(engine.expected_score_for_round(2100.0, 1500.0, &round), raw);
    }

    #[test]
    fn test_relative_factor_bounds() {
        assert_eq!(relative_factor(1500.0, 1500.0), 1.0);
        assert_eq!(relative_factor(1500.0, 3000.0), 0.8);
        assert_eq!(relative_factor(3000.0, 1500.0), 1.2);
        assert_eq!(relative_factor(1500.0, 0.0), 1.0);
        assert!((relative_factor(1500.0, 1600.0) - (1500.0f64 / 1600.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_weekly_snapshots_and_changes() {
        let weeks = vec![
            one_round(&["a"], &["b"], Some(Side::A)),
            WeeklyMatch::new(["a"], Vec::<String>::new()),
            one_round(&["a"], &["b"], Some(Side::B)),
        ];
        let replay = engine().replay(&weeks, None, &ten).unwrap();

        assert_eq!(replay.weekly.len(), 4);
        assert_eq!(replay.weekly[0].rating("a"), 1500.0);
        assert_eq!(replay.weekly[1], replay.weekly[2]);
        assert_eq!(replay.predictions.len(), 2);

        let changes = replay.last_week_changes();
        assert!(changes["a"] < 0.0);
        assert!(changes["b"] > 0.0);

        let standings = replay.standings(0).unwrap();
        assert_eq!(standings[0].unit, "a");
        assert_eq!(standings[0].rank, 1);
        assert!((standings[0].change - 64.0).abs() < 1e-9);
        assert!(replay.standings(3).is_none());
    }

    #[test]
    fn test_invalid_week_rejected() {
        let mut week = one_round(&["a"], &["b"], Some(Side::A));
        week.lead_b = Some("a".to_string());
        assert!(engine().compute_ratings(&[week], None, &ten).is_err());
    }

    #[test]
    fn test_cutoff_ignores_later_weeks() {
        let weeks = vec![
            one_round(&["a"], &["b"], Some(Side::A)),
            one_round(&["a"], &["b"], Some(Side::A)),
        ];
        let (first, _) = engine().compute_ratings(&weeks, Some(0), &ten).unwrap();
        let (single, _) = engine().compute_ratings(&weeks[..1], None, &ten).unwrap();
        assert_eq!(first, single);
    }
}

//! Prediction-quality metrics over a replayed season

use crate::rating::{RatingState, RoundPrediction, SeasonReplay};
use crate::utils::mean;
use serde::{Deserialize, Serialize};

/// Changes at or below this magnitude are treated as no change
const CHANGE_EPSILON: f64 = 1e-9;

/// How well a settings candidate predicted the season
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionMetrics {
    /// Mean squared error of the expected score; lower is better
    pub brier: f64,
    /// Share of rounds whose favourite won
    pub accuracy: f64,
    /// RMS of the non-zero weekly rating changes
    pub rmse: f64,
    /// Mean absolute week-over-week drift of the mean rating
    pub drift: f64,
    pub r_squared: f64,
}

impl PredictionMetrics {
    pub fn from_replay(replay: &SeasonReplay) -> Self {
        Self {
            brier: brier_score(&replay.predictions),
            accuracy: accuracy(&replay.predictions),
            rmse: rating_volatility(&replay.weekly),
            drift: mean_abs_drift(&replay.weekly),
            r_squared: r_squared(&replay.predictions),
        }
    }

    /// Single 0-100 score where higher is better.
    ///
    /// RMSE is normalised against 100 rating points and drift against 10.
    pub fn composite(&self) -> f64 {
        mean(&[
            1.0 - self.brier,
            self.accuracy,
            1.0 - self.rmse / 100.0,
            1.0 - self.drift / 10.0,
            self.r_squared,
        ]) * 100.0
    }
}

pub fn brier_score(predictions: &[RoundPrediction]) -> f64 {
    let errors: Vec<f64> = predictions
        .iter()
        .map(|p| (p.expected_a - p.actual_a).powi(2))
        .collect();
    mean(&errors)
}

/// Exact 50/50 predictions never count as correct
pub fn accuracy(predictions: &[RoundPrediction]) -> f64 {
    if predictions.is_empty() {
        return 0.0;
    }
    let correct = predictions
        .iter()
        .filter(|p| {
            (p.expected_a > 0.5 && p.actual_a == 1.0) || (p.expected_a < 0.5 && p.actual_a == 0.0)
        })
        .count();
    correct as f64 / predictions.len() as f64
}

/// Root mean square of every non-zero rating change between consecutive
/// snapshots, over the units of the first snapshot
pub fn rating_volatility(weekly: &[RatingState]) -> f64 {
    let Some(first) = weekly.first() else {
        return 0.0;
    };

    let mut squared = 0.0;
    let mut changes = 0usize;
    for pair in weekly.windows(2) {
        for (unit, _) in first.iter() {
            let change = pair[1].rating(unit) - pair[0].rating(unit);
            if change.abs() > CHANGE_EPSILON {
                squared += change * change;
                changes += 1;
            }
        }
    }

    if changes == 0 {
        return 0.0;
    }
    (squared / changes as f64).sqrt()
}

pub fn mean_abs_drift(weekly: &[RatingState]) -> f64 {
    let drifts: Vec<f64> = weekly
        .windows(2)
        .map(|pair| {
            let before = pair[0].mean_rating().unwrap_or(0.0);
            let after = pair[1].mean_rating().unwrap_or(0.0);
            (after - before).abs()
        })
        .collect();
    mean(&drifts)
}

/// Squared Pearson correlation of expected vs actual; 0 when undefined
pub fn r_squared(predictions: &[RoundPrediction]) -> f64 {
    if predictions.len() < 2 {
        return 0.0;
    }

    let expected: Vec<f64> = predictions.iter().map(|p| p.expected_a).collect();
    let actual: Vec<f64> = predictions.iter().map(|p| p.actual_a).collect();
    let mean_e = mean(&expected);
    let mean_a = mean(&actual);

    let mut covariance = 0.0;
    let mut var_e = 0.0;
    let mut var_a = 0.0;
    for (e, a) in expected.iter().zip(&actual) {
        covariance += (e - mean_e) * (a - mean_a);
        var_e += (e - mean_e).powi(2);
        var_a += (a - mean_a).powi(2);
    }

    if var_e <= 0.0 || var_a <= 0.0 {
        return 0.0;
    }
    let correlation = covariance / (var_e.sqrt() * var_a.sqrt());
    correlation * correlation
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(expected_a: f64, actual_a: f64) -> RoundPrediction {
        RoundPrediction {
            week: 0,
            round: 0,
            expected_a,
            actual_a,
        }
    }

    fn snapshot(entries: &[(&str, f64)]) -> RatingState {
        let mut state = RatingState::new(1500.0);
        for (unit, rating) in entries {
            state.set(unit, *rating);
        }
        state
    }

    #[test]
    fn test_empty_predictions() {
        assert_eq!(brier_score(&[]), 0.0);
        assert_eq!(accuracy(&[]), 0.0);
        assert_eq!(r_squared(&[]), 0.0);
    }

    #[test]
    fn test_brier_and_accuracy() {
        let predictions = vec![prediction(0.8, 1.0), prediction(0.3, 1.0), prediction(0.5, 0.0)];

        // (0.04 + 0.49 + 0.25) / 3
        assert!((brier_score(&predictions) - 0.26).abs() < 1e-12);
        assert!((accuracy(&predictions) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_r_squared_perfect_and_degenerate() {
        let perfect = vec![prediction(0.9, 1.0), prediction(0.1, 0.0), prediction(0.9, 1.0)];
        assert!((r_squared(&perfect) - 1.0).abs() < 1e-12);

        let constant = vec![prediction(0.5, 1.0), prediction(0.5, 0.0)];
        assert_eq!(r_squared(&constant), 0.0);
    }

    #[test]
    fn test_volatility_ignores_unchanged_units() {
        let weekly = vec![
            snapshot(&[("a", 1500.0), ("b", 1500.0)]),
            snapshot(&[("a", 1530.0), ("b", 1500.0)]),
            snapshot(&[("a", 1530.0), ("b", 1460.0)]),
        ];
        // changes of 30 and -40
        assert!((rating_volatility(&weekly) - 1250.0f64.sqrt()).abs() < 1e-9);
        assert_eq!(rating_volatility(&weekly[..1]), 0.0);
    }

    #[test]
    fn test_drift() {
        let weekly = vec![
            snapshot(&[("a", 1500.0), ("b", 1500.0)]),
            snapshot(&[("a", 1520.0), ("b", 1490.0)]),
            snapshot(&[("a", 1520.0), ("b", 1490.0)]),
        ];
        assert!((mean_abs_drift(&weekly) - 2.5).abs() < 1e-9);
        assert_eq!(mean_abs_drift(&weekly[..1]), 0.0);
    }

    #[test]
    fn test_composite_of_perfect_season() {
        let metrics = PredictionMetrics {
            brier: 0.0,
            accuracy: 1.0,
            rmse: 0.0,
            drift: 0.0,
            r_squared: 1.0,
        };
        assert_eq!(metrics.composite(), 100.0);
    }
}

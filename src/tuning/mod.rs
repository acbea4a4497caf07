//! Settings tuning
//!
//! Replays a season under every candidate from a parameter grid and ranks
//! the candidates by how well their ratings predicted the rounds.

pub mod grid;
pub mod metrics;

pub use grid::{ParameterRange, SettingsGrid};
pub use metrics::PredictionMetrics;

use crate::config::EloSettings;
use crate::error::Result;
use crate::rating::{HeadcountLookup, MapBiasProvider, RatingEngine};
use crate::types::WeeklyMatch;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of replaying the season with one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuningResult {
    /// 1-based position of the candidate in grid order
    pub id: usize,
    pub settings: EloSettings,
    pub metrics: PredictionMetrics,
    pub composite: f64,
}

/// Evaluate every grid candidate; best composite first, grid order on ties
pub fn tune(
    grid: &SettingsGrid,
    matches: &[WeeklyMatch],
    headcount: &dyn HeadcountLookup,
    map_bias: Arc<dyn MapBiasProvider>,
) -> Result<Vec<TuningResult>> {
    let candidates = grid.candidates()?;
    info!("Tuning over {} settings candidates", candidates.len());

    let mut results = Vec::with_capacity(candidates.len());
    for (index, settings) in candidates.into_iter().enumerate() {
        let engine = RatingEngine::new(settings.clone(), Arc::clone(&map_bias))?;
        let replay = engine.replay(matches, None, headcount)?;
        let metrics = PredictionMetrics::from_replay(&replay);
        let composite = metrics.composite();
        debug!("Candidate {}: composite {:.2}", index + 1, composite);

        results.push(TuningResult {
            id: index + 1,
            settings,
            metrics,
            composite,
        });
    }

    results.sort_by(|a, b| b.composite.total_cmp(&a.composite));
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::StaticMapBias;
    use crate::types::{RoundResult, Side};

    fn ten(_: &str, _: usize) -> f64 {
        10.0
    }

    #[test]
    fn test_tune_sorts_by_composite() {
        let mut weeks = Vec::new();
        for _ in 0..6 {
            let mut week = WeeklyMatch::new(["strong"], ["weak"]);
            week.rounds = [RoundResult::won_by(Side::A), RoundResult::won_by(Side::A)];
            weeks.push(week);
        }

        let mut grid = SettingsGrid::new();
        grid.insert("k_factor_provisional", ParameterRange::parse("0, 128").unwrap())
            .unwrap();
        grid.insert("provisional_rounds", ParameterRange::single(50.0))
            .unwrap();

        let results = tune(&grid, &weeks, &ten, Arc::new(StaticMapBias::default())).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].composite >= results[1].composite);

        // K = 0 never learns that "strong" is the favourite
        let frozen = results
            .iter()
            .find(|r| r.settings.k_factor_provisional == 0.0)
            .unwrap();
        assert_eq!(frozen.metrics.accuracy, 0.0);
    }
}

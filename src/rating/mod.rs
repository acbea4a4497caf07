//! Elo rating system for roster-based team matches
//!
//! This module provides the season replay engine, rating state value
//! objects, headcount lookups, map bias providers, and expected-outcome
//! helpers built on the skillratings crate's logistic Elo curve.

pub mod engine;
pub mod headcount;
pub mod map_bias;
pub mod probability;
pub mod state;

// Re-export commonly used types
pub use engine::{relative_factor, RatingEngine, RoundPrediction, SeasonReplay, Standing};
pub use headcount::{HeadcountLookup, ParticipationHeadcount, WeeklyHeadcount};
pub use map_bias::{MapBiasProvider, StaticMapBias, DEFAULT_ATTACKER_MAPS};
pub use probability::{expected_score, roster_strength, win_chance, WinChance};
pub use state::{RatingState, RoundsPlayed};

//! Season Elo - ratings and team balancing for roster-based team seasons
//!
//! This crate replays a season of weekly two-sided matches into per-unit Elo
//! ratings (roster-weighted, lead-weighted, map-bias-adjusted, with sweep and
//! playoff bonuses), derives co-rostering history, and searches for balanced
//! two-way splits of a unit pool.

pub mod balance;
pub mod config;
pub mod error;
pub mod history;
pub mod rating;
pub mod tuning;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{Result, SeasonError};
pub use types::*;

// Re-export key components
pub use balance::{BalanceOutcome, BalanceRequest, TeamBalancer};
pub use config::{BalancerConfig, EloSettings};
pub use history::{build_teammate_counts, TeammateHistory};
pub use rating::{HeadcountLookup, MapBiasProvider, RatingEngine, StaticMapBias};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

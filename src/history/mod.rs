//! Co-rostering, head-to-head and round-record history
//!
//! Pair counts are derived by a full scan of the season and feed the team
//! balancer's over-teaming penalty. Unit records tally round results.

pub mod builder;
pub mod pairs;
pub mod records;

pub use builder::{build_opponent_counts, build_teammate_counts, OpponentHistory, TeammateHistory};
pub use pairs::PairCounts;
pub use records::{build_unit_records, UnitRecord, UnitRecords};

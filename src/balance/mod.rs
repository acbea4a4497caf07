//! Team balancing
//!
//! Splits a pool of units into two sides of comparable expected headcount,
//! honouring forced oppositions and steering away from pairings that have
//! shared a roster too often.

pub mod balancer;
pub mod partition;

pub use balancer::{BalanceOutcome, BalanceRequest, InfeasibleBalance, TeamBalancer};
pub use partition::{Partition, PartitionScore};

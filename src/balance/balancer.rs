//! Brute-force team balancer
//!
//! Every subset of the assignable units is tried as side A's extra members.
//! The cost is exponential: a pool of `n` assignable units evaluates `2^n`
//! partitions, so callers should keep pools to a few dozen units and may set
//! `BalancerConfig::max_candidates` to refuse larger searches up front.

use crate::balance::partition::{evaluate, Combinations, Partition, TeammatePenalty};
use crate::config::BalancerConfig;
use crate::error::{Result, SeasonError};
use crate::history::TeammateHistory;
use crate::types::{PlayerRange, UnitName};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

/// Inputs for one balancing run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceRequest {
    /// Units eligible for assignment this week
    pub available_units: BTreeSet<UnitName>,
    /// Expected turnout per unit; units without a range or with (0, 0) sit out
    pub unit_ranges: HashMap<UnitName, PlayerRange>,
    /// Each pair puts its first unit on side A and its second on side B
    #[serde(default)]
    pub opposing_pairs: Vec<(UnitName, UnitName)>,
    pub max_player_diff: u32,
}

/// Best partition that still broke the size tolerance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfeasibleBalance {
    pub best: Partition,
    pub max_player_diff: u32,
}

impl InfeasibleBalance {
    pub fn gap_exceeded(&self) -> bool {
        self.best.range_gap > u64::from(self.max_player_diff)
    }

    pub fn min_diff_exceeded(&self) -> bool {
        self.best.min_diff > u64::from(self.max_player_diff)
    }
}

impl std::fmt::Display for InfeasibleBalance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Could not find a balance within the max player difference of {}",
            self.max_player_diff
        )?;
        if self.gap_exceeded() {
            write!(f, "; best range gap is {} players", self.best.range_gap)?;
        }
        if self.min_diff_exceeded() {
            write!(f, "; best minimums difference is {} players", self.best.min_diff)?;
        }
        Ok(())
    }
}

/// Result of a balancing run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BalanceOutcome {
    Balanced(Partition),
    Infeasible(InfeasibleBalance),
}

impl BalanceOutcome {
    pub fn is_balanced(&self) -> bool {
        matches!(self, BalanceOutcome::Balanced(_))
    }

    /// The accepted partition, if any
    pub fn partition(&self) -> Option<&Partition> {
        match self {
            BalanceOutcome::Balanced(partition) => Some(partition),
            BalanceOutcome::Infeasible(_) => None,
        }
    }
}

/// Team balancer
#[derive(Debug, Clone, Default)]
pub struct TeamBalancer {
    config: BalancerConfig,
}

impl TeamBalancer {
    /// Create a new balancer; fails if the configuration is invalid
    pub fn new(config: BalancerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BalancerConfig {
        &self.config
    }

    /// Number of partitions a search over `assignable` units evaluates,
    /// None when it does not fit in a u64
    pub fn candidate_count(assignable: usize) -> Option<u64> {
        u32::try_from(assignable)
            .ok()
            .and_then(|n| 1u64.checked_shl(n))
    }

    /// Find the most balanced split of the request's units.
    ///
    /// Candidates are ranked by range gap, then minimums difference, then
    /// teammate heat, then midpoint difference; the first best candidate in
    /// enumeration order wins ties. Contradictory forcing and oversize
    /// searches are errors; a search whose best candidate breaks the
    /// tolerance returns `BalanceOutcome::Infeasible`.
    pub fn balance(
        &self,
        request: &BalanceRequest,
        history: &TeammateHistory,
    ) -> Result<BalanceOutcome> {
        let (forced_a, forced_b) = forced_sides(&request.opposing_pairs)?;

        let present: BTreeSet<&str> = request
            .unit_ranges
            .iter()
            .filter(|(_, range)| !range.is_absent())
            .map(|(unit, _)| unit.as_str())
            .collect();

        let to_assign: Vec<&str> = request
            .available_units
            .iter()
            .map(String::as_str)
            .filter(|unit| present.contains(unit))
            .filter(|unit| !forced_a.contains(unit) && !forced_b.contains(unit))
            .collect();

        if to_assign.is_empty() && forced_a.is_empty() && forced_b.is_empty() {
            warn!("Balance requested with no participating units");
            return Err(SeasonError::InvalidInput {
                reason: "no participating units to balance".to_string(),
            }
            .into());
        }

        let candidates = Self::candidate_count(to_assign.len());
        let limit = self.config.max_candidates.unwrap_or(u64::MAX);
        if candidates.map_or(true, |count| count > limit) {
            warn!(
                "Refusing balance over {} assignable units (limit {})",
                to_assign.len(),
                limit
            );
            return Err(SeasonError::SearchSpaceTooLarge {
                units: to_assign.len(),
                limit,
            }
            .into());
        }

        let penalty =
            TeammatePenalty::from_history(history, self.config.over_teaming_penalty_multiplier);
        debug!(
            "Balancing {} assignable units ({} forced A, {} forced B), over-teaming threshold {}",
            to_assign.len(),
            forced_a.len(),
            forced_b.len(),
            penalty.threshold
        );

        let mut best: Option<Partition> = None;
        for size in 0..=to_assign.len() {
            for chosen in Combinations::new(to_assign.len(), size) {
                let mut team_a: Vec<&str> = forced_a.iter().copied().collect();
                let mut team_b: Vec<&str> = forced_b.iter().copied().collect();
                let mut next = chosen.iter().peekable();
                for (index, unit) in to_assign.iter().enumerate() {
                    if next.peek() == Some(&&index) {
                        next.next();
                        team_a.push(*unit);
                    } else {
                        team_b.push(*unit);
                    }
                }

                let candidate =
                    evaluate(&team_a, &team_b, &request.unit_ranges, history, &penalty);
                let improves = best
                    .as_ref()
                    .map_or(true, |current| candidate.score() < current.score());
                if improves {
                    best = Some(candidate);
                }
            }
        }

        let Some(best) = best else {
            return Err(SeasonError::InvalidInput {
                reason: "balancer produced no candidate partitions".to_string(),
            }
            .into());
        };

        if best.within(request.max_player_diff) {
            info!(
                "Balanced {} vs {} units: players {}-{} vs {}-{}, midpoint diff {:.1}",
                best.team_a.len(),
                best.team_b.len(),
                best.min_a,
                best.max_a,
                best.min_b,
                best.max_b,
                best.avg_diff
            );
            Ok(BalanceOutcome::Balanced(best))
        } else {
            let infeasible = InfeasibleBalance {
                best,
                max_player_diff: request.max_player_diff,
            };
            info!("{}", infeasible);
            Ok(BalanceOutcome::Infeasible(infeasible))
        }
    }
}

/// Split opposing pairs into forced sides, rejecting units forced onto both
fn forced_sides(pairs: &[(UnitName, UnitName)]) -> Result<(BTreeSet<&str>, BTreeSet<&str>)> {
    let forced_a: BTreeSet<&str> = pairs
        .iter()
        .map(|(a, _)| a.as_str())
        .filter(|unit| !unit.is_empty())
        .collect();
    let forced_b: BTreeSet<&str> = pairs
        .iter()
        .map(|(_, b)| b.as_str())
        .filter(|unit| !unit.is_empty())
        .collect();

    let conflict: Vec<String> = forced_a
        .intersection(&forced_b)
        .map(|unit| unit.to_string())
        .collect();
    if !conflict.is_empty() {
        warn!("Contradictory opposing pairs: {}", conflict.join(", "));
        return Err(SeasonError::ContradictoryConstraints { units: conflict }.into());
    }

    Ok((forced_a, forced_b))
}

//! Per-unit round records
//!
//! Every played round credits a win to each unit on the winning roster and a
//! loss to each unit on the losing one. Rounds that record a map are also
//! split by whether the unit's side attacked or defended.

use crate::rating::MapBiasProvider;
use crate::types::{UnitName, WeeklyMatch};
use crate::utils::weeks_through;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Round tallies for one unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRecord {
    pub wins: u32,
    pub losses: u32,
    pub attack_wins: u32,
    pub attack_losses: u32,
    pub defend_wins: u32,
    pub defend_losses: u32,
}

impl UnitRecord {
    pub fn rounds(&self) -> u32 {
        self.wins + self.losses
    }

    pub fn win_rate(&self) -> Option<f64> {
        rate(self.wins, self.losses)
    }

    pub fn attack_win_rate(&self) -> Option<f64> {
        rate(self.attack_wins, self.attack_losses)
    }

    pub fn defend_win_rate(&self) -> Option<f64> {
        rate(self.defend_wins, self.defend_losses)
    }
}

fn rate(wins: u32, losses: u32) -> Option<f64> {
    let total = wins + losses;
    (total > 0).then(|| f64::from(wins) / f64::from(total))
}

/// Round records keyed by unit
pub type UnitRecords = BTreeMap<UnitName, UnitRecord>;

/// Tally round records over the weeks up to and including `cutoff`
pub fn build_unit_records(
    matches: &[WeeklyMatch],
    cutoff: Option<usize>,
    map_bias: &dyn MapBiasProvider,
) -> UnitRecords {
    let mut records = UnitRecords::new();

    for week in weeks_through(matches, cutoff) {
        for round in &week.rounds {
            let Some(winner) = round.winner else {
                continue;
            };
            let attacker = round
                .map
                .as_deref()
                .filter(|map| !map.is_empty())
                .map(|map| map_bias.attacker_side(map, round.flipped));

            for unit in week.roster(winner) {
                let record = records.entry(unit.clone()).or_default();
                record.wins += 1;
                match attacker {
                    Some(side) if side == winner => record.attack_wins += 1,
                    Some(_) => record.defend_wins += 1,
                    None => {}
                }
            }
            for unit in week.roster(winner.opponent()) {
                let record = records.entry(unit.clone()).or_default();
                record.losses += 1;
                match attacker {
                    Some(side) if side == winner => record.defend_losses += 1,
                    Some(_) => record.attack_losses += 1,
                    None => {}
                }
            }
        }
    }

    debug!("Round records for {} units", records.len());
    records
}

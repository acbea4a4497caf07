//! Common types used throughout the rating engine and balancer

use crate::error::{Result, SeasonError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Unique identifier for a roster unit (regiment)
pub type UnitName = String;

/// One of the two sides of a weekly match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    /// The other side
    pub fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    /// Direction of a rating change seen from side A's expected score
    pub fn sign(self) -> f64 {
        match self {
            Side::A => 1.0,
            Side::B => -1.0,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::A => write!(f, "A"),
            Side::B => write!(f, "B"),
        }
    }
}

/// Expected player turnout for a unit, as an inclusive {min, max} range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerRange {
    pub min: u32,
    pub max: u32,
}

impl PlayerRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Midpoint headcount
    pub fn average(&self) -> f64 {
        (self.min as f64 + self.max as f64) / 2.0
    }

    /// A (0, 0) range marks a unit that is not taking part
    pub fn is_absent(&self) -> bool {
        self.min == 0 && self.max == 0
    }
}

/// A named roster participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub name: UnitName,
    #[serde(default)]
    pub player_range: PlayerRange,
    /// Display-only marker, ignored by the rating and balancing algorithms
    #[serde(default)]
    pub non_token: bool,
}

impl Unit {
    pub fn new(name: impl Into<UnitName>, player_range: PlayerRange) -> Self {
        Self {
            name: name.into(),
            player_range,
            non_token: false,
        }
    }
}

/// Structural advantage a map gives to the attacking or defending faction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiasLevel {
    #[default]
    Balanced,
    LightAttacker,
    HeavyAttacker,
    LightDefender,
    HeavyDefender,
}

impl BiasLevel {
    /// Decode the numeric bias codes used by older season files
    /// (0, 1, 1.5, 2, 2.5)
    pub fn from_code(code: f64) -> Option<BiasLevel> {
        let doubled = code * 2.0;
        if !doubled.is_finite() || doubled.fract() != 0.0 {
            return None;
        }
        match doubled as i64 {
            0 => Some(BiasLevel::Balanced),
            2 => Some(BiasLevel::LightAttacker),
            3 => Some(BiasLevel::HeavyAttacker),
            4 => Some(BiasLevel::LightDefender),
            5 => Some(BiasLevel::HeavyDefender),
            _ => None,
        }
    }
}

/// Outcome and context of one round within a week
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    /// Winning side, or None when the round was not played
    #[serde(default)]
    pub winner: Option<Side>,
    #[serde(default)]
    pub map: Option<String>,
    /// Swaps which side plays the historically attacking faction
    #[serde(default)]
    pub flipped: bool,
    /// Per-round leads, only read during playoffs
    #[serde(default)]
    pub lead_a: Option<UnitName>,
    #[serde(default)]
    pub lead_b: Option<UnitName>,
}

impl RoundResult {
    pub fn won_by(winner: Side) -> Self {
        Self {
            winner: Some(winner),
            ..Self::default()
        }
    }

    pub fn on_map(mut self, map: impl Into<String>, flipped: bool) -> Self {
        self.map = Some(map.into());
        self.flipped = flipped;
        self
    }
}

/// One scheduling period: two rosters and up to two rounds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklyMatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub team_a: BTreeSet<UnitName>,
    #[serde(default)]
    pub team_b: BTreeSet<UnitName>,
    #[serde(default)]
    pub rounds: [RoundResult; 2],
    #[serde(default)]
    pub playoffs: bool,
    /// Week-level leads, read outside of playoffs
    #[serde(default)]
    pub lead_a: Option<UnitName>,
    #[serde(default)]
    pub lead_b: Option<UnitName>,
    /// Week-specific turnout ranges, overriding the global ones
    #[serde(default)]
    pub player_counts: HashMap<UnitName, PlayerRange>,
}

impl WeeklyMatch {
    pub fn new<I, J, S, T>(team_a: I, team_b: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<UnitName>,
        T: Into<UnitName>,
    {
        Self {
            team_a: team_a.into_iter().map(Into::into).collect(),
            team_b: team_b.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn roster(&self, side: Side) -> &BTreeSet<UnitName> {
        match side {
            Side::A => &self.team_a,
            Side::B => &self.team_b,
        }
    }

    /// Whether the unit is on either roster this week
    pub fn fields(&self, unit: &str) -> bool {
        self.team_a.contains(unit) || self.team_b.contains(unit)
    }

    /// Side that won both rounds, if any
    pub fn sweep_winner(&self) -> Option<Side> {
        match (self.rounds[0].winner, self.rounds[1].winner) {
            (Some(first), Some(second)) if first == second => Some(first),
            _ => None,
        }
    }

    /// Lead units for a round (0 or 1): per-round in playoffs, week-level otherwise
    pub fn leads_for(&self, round: usize) -> (Option<&str>, Option<&str>) {
        if self.playoffs {
            let r = &self.rounds[round];
            (r.lead_a.as_deref(), r.lead_b.as_deref())
        } else {
            (self.lead_a.as_deref(), self.lead_b.as_deref())
        }
    }

    /// Check roster disjointness and lead membership
    pub fn validate(&self, week: usize) -> Result<()> {
        let overlap: Vec<&str> = self
            .team_a
            .intersection(&self.team_b)
            .map(String::as_str)
            .collect();
        if !overlap.is_empty() {
            return Err(SeasonError::InvalidMatch {
                week,
                reason: format!("units on both rosters: {}", overlap.join(", ")),
            }
            .into());
        }

        let mut leads = vec![(Side::A, self.lead_a.as_deref()), (Side::B, self.lead_b.as_deref())];
        for round in &self.rounds {
            leads.push((Side::A, round.lead_a.as_deref()));
            leads.push((Side::B, round.lead_b.as_deref()));
        }
        for (side, lead) in leads {
            if let Some(lead) = lead {
                if !self.roster(side).contains(lead) {
                    return Err(SeasonError::InvalidMatch {
                        week,
                        reason: format!("lead '{}' is not on the side {} roster", lead, side),
                    }
                    .into());
                }
            }
        }

        Ok(())
    }
}

/// A full season as handed over by the calling layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeasonData {
    #[serde(default)]
    pub units: Vec<Unit>,
    #[serde(default)]
    pub weeks: Vec<WeeklyMatch>,
    #[serde(default)]
    pub map_biases: HashMap<String, BiasLevel>,
    /// Maps on which the side-A faction attacks; None uses the built-in list
    #[serde(default)]
    pub attacker_maps: Option<BTreeSet<String>>,
    #[serde(default)]
    pub settings: Option<crate::config::EloSettings>,
}

impl SeasonData {
    /// Global turnout ranges keyed by unit name
    pub fn global_ranges(&self) -> HashMap<UnitName, PlayerRange> {
        self.units
            .iter()
            .map(|u| (u.name.clone(), u.player_range))
            .collect()
    }
}

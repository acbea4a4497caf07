//! Map bias classification and attacker-side resolution
//!
//! Some maps structurally favour the attacker or the defender. The engine
//! asks a `MapBiasProvider` how biased a map is and which side attacked.

use crate::types::{BiasLevel, Side};
use std::collections::{BTreeSet, HashMap};

/// Maps on which the side-A faction attacks by default
pub const DEFAULT_ATTACKER_MAPS: &[&str] = &[
    "East Woods Skirmish",
    "Nicodemus Hill",
    "Hooker's Push",
    "Bloody Lane",
    "Pry Ford",
    "Smith Field",
    "Alexander Farm",
    "Crossroads",
    "Wagon Road",
    "Hagertown Turnpike",
    "Pry Grist Mill",
    "Otto & Sherrick Farm",
    "Piper Farm",
    "West Woods",
    "Dunker Church",
    "Burnside Bridge",
    "Garland's Stand",
    "Cox's Push",
    "Hatch's Attack",
    "Colquitt's Defense",
    "Flemming's Meadow",
    "Crossley Creek",
    "Confederate Encampment",
];

/// Trait for classifying maps and resolving which side attacked
#[cfg_attr(test, mockall::automock)]
pub trait MapBiasProvider: Send + Sync {
    /// Bias level of a map; unknown maps are balanced
    fn bias_level(&self, map_name: &str) -> BiasLevel;

    /// Side that attacked on this map given the round's flip flag
    fn attacker_side(&self, map_name: &str, flipped: bool) -> Side;
}

/// Table-driven map bias provider
#[derive(Debug, Clone)]
pub struct StaticMapBias {
    levels: HashMap<String, BiasLevel>,
    attacker_maps: BTreeSet<String>,
}

impl StaticMapBias {
    /// Create a provider with the given bias table and the default attacker maps
    pub fn new(levels: HashMap<String, BiasLevel>) -> Self {
        Self {
            levels,
            attacker_maps: DEFAULT_ATTACKER_MAPS.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Replace the attacker-map set
    pub fn with_attacker_maps<I, S>(mut self, maps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attacker_maps = maps.into_iter().map(Into::into).collect();
        self
    }

    /// Whether side A's faction attacks on this map when not flipped.
    /// Names match by substring, so "Bloody Lane (Night)" counts as Bloody Lane.
    pub fn is_attacker_map(&self, map_name: &str) -> bool {
        self.attacker_maps
            .iter()
            .any(|base| map_name.contains(base.as_str()))
    }
}

impl Default for StaticMapBias {
    fn default() -> Self {
        Self::new(HashMap::new())
    }
}

impl MapBiasProvider for StaticMapBias {
    fn bias_level(&self, map_name: &str) -> BiasLevel {
        self.levels.get(map_name).copied().unwrap_or_default()
    }

    fn attacker_side(&self, map_name: &str, flipped: bool) -> Side {
        let faction_side = if flipped { Side::B } else { Side::A };
        if self.is_attacker_map(map_name) {
            faction_side
        } else {
            faction_side.opponent()
        }
    }
}

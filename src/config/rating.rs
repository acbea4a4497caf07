//! Rating system configuration

use crate::error::{Result, SeasonError};
use crate::types::BiasLevel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

/// Every key `EloSettings::from_raw` understands, legacy aliases included
pub const SETTING_KEYS: &[&str] = &[
    "initial_rating",
    "initial_elo",
    "k_factor_provisional",
    "k_factor_standard",
    "provisional_rounds_threshold",
    "provisional_rounds",
    "sweep_bonus_multiplier",
    "lead_multiplier",
    "size_influence_exponent",
    "size_influence",
    "playoff_multiplier",
    "light_attacker",
    "bias_light_att",
    "heavy_attacker",
    "bias_heavy_att",
    "light_defender",
    "bias_light_def",
    "heavy_defender",
    "bias_heavy_def",
    "expected_score_floor",
    "expected_score_ceiling",
];

/// Legacy key names and the setting each one stands for
pub const SETTING_ALIASES: &[(&str, &str)] = &[
    ("initial_elo", "initial_rating"),
    ("provisional_rounds", "provisional_rounds_threshold"),
    ("size_influence", "size_influence_exponent"),
    ("bias_light_att", "light_attacker"),
    ("bias_heavy_att", "heavy_attacker"),
    ("bias_light_def", "light_defender"),
    ("bias_heavy_def", "heavy_defender"),
];

/// Current name of a setting key, resolving legacy aliases
pub fn canonical_setting_key(key: &str) -> &str {
    SETTING_ALIASES
        .iter()
        .find(|&&(alias, _)| alias == key)
        .map_or(key, |&(_, canonical)| canonical)
}

/// Percentage adjustments applied to the expected score on biased maps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapBiasPercentages {
    pub light_attacker: i32,
    pub heavy_attacker: i32,
    pub light_defender: i32,
    pub heavy_defender: i32,
}

impl Default for MapBiasPercentages {
    fn default() -> Self {
        Self {
            light_attacker: 15,
            heavy_attacker: 30,
            light_defender: 15,
            heavy_defender: 30,
        }
    }
}

impl MapBiasPercentages {
    /// Multiplier on the attacker's expected score for a bias level
    pub fn multiplier(&self, level: BiasLevel) -> f64 {
        match level {
            BiasLevel::Balanced => 1.0,
            BiasLevel::LightAttacker => 1.0 + self.light_attacker as f64 / 100.0,
            BiasLevel::HeavyAttacker => 1.0 + self.heavy_attacker as f64 / 100.0,
            BiasLevel::LightDefender => 1.0 - self.light_defender as f64 / 100.0,
            BiasLevel::HeavyDefender => 1.0 - self.heavy_defender as f64 / 100.0,
        }
    }
}

/// Tuning knobs of the Elo engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EloSettings {
    /// Rating of a unit the first time it is seen
    pub initial_rating: f64,
    /// K-factor while a unit is still provisional
    pub k_factor_provisional: f64,
    /// K-factor once a unit has enough rounds behind it
    pub k_factor_standard: f64,
    /// Rounds a unit must have played to leave the provisional period
    pub provisional_rounds_threshold: u32,
    /// Applied to both rounds when one side wins both
    pub sweep_bonus_multiplier: f64,
    /// Extra share of the rating change for a side's lead unit
    pub lead_multiplier: f64,
    /// Exponent on the log-headcount share of a unit
    pub size_influence_exponent: f64,
    /// Rating volatility during playoff rounds
    pub playoff_multiplier: f64,
    /// Bounds on a bias-adjusted expected score
    pub expected_score_floor: f64,
    pub expected_score_ceiling: f64,
    pub map_bias: MapBiasPercentages,
}

impl Default for EloSettings {
    fn default() -> Self {
        Self {
            initial_rating: 1500.0,
            k_factor_provisional: 128.0,
            k_factor_standard: 96.0,
            provisional_rounds_threshold: 10,
            sweep_bonus_multiplier: 1.25,
            lead_multiplier: 2.0,
            size_influence_exponent: 1.0,
            playoff_multiplier: 1.25,
            map_bias: MapBiasPercentages::default(),
            expected_score_floor: 0.05,
            expected_score_ceiling: 0.95,
        }
    }
}

impl EloSettings {
    /// K-factor for a unit that has played `rounds_played` rounds so far
    pub fn k_factor_for(&self, rounds_played: u32) -> f64 {
        if rounds_played < self.provisional_rounds_threshold {
            self.k_factor_provisional
        } else {
            self.k_factor_standard
        }
    }

    /// Build settings from loosely typed key/value pairs.
    ///
    /// Missing keys fall back to their documented default; a key that is
    /// present but does not parse is an error. Legacy key names
    /// (`initial_elo`, `provisional_rounds`, `size_influence`, `bias_*`) are
    /// accepted.
    pub fn from_raw(raw: &HashMap<String, String>) -> Result<Self> {
        let defaults = Self::default();
        let bias = defaults.map_bias;

        let settings = Self {
            initial_rating: parse_setting(raw, &["initial_rating", "initial_elo"], defaults.initial_rating)?,
            k_factor_provisional: parse_setting(raw, &["k_factor_provisional"], defaults.k_factor_provisional)?,
            k_factor_standard: parse_setting(raw, &["k_factor_standard"], defaults.k_factor_standard)?,
            provisional_rounds_threshold: parse_setting(
                raw,
                &["provisional_rounds_threshold", "provisional_rounds"],
                defaults.provisional_rounds_threshold,
            )?,
            sweep_bonus_multiplier: parse_setting(raw, &["sweep_bonus_multiplier"], defaults.sweep_bonus_multiplier)?,
            lead_multiplier: parse_setting(raw, &["lead_multiplier"], defaults.lead_multiplier)?,
            size_influence_exponent: parse_setting(
                raw,
                &["size_influence_exponent", "size_influence"],
                defaults.size_influence_exponent,
            )?,
            playoff_multiplier: parse_setting(raw, &["playoff_multiplier"], defaults.playoff_multiplier)?,
            map_bias: MapBiasPercentages {
                light_attacker: parse_setting(raw, &["light_attacker", "bias_light_att"], bias.light_attacker)?,
                heavy_attacker: parse_setting(raw, &["heavy_attacker", "bias_heavy_att"], bias.heavy_attacker)?,
                light_defender: parse_setting(raw, &["light_defender", "bias_light_def"], bias.light_defender)?,
                heavy_defender: parse_setting(raw, &["heavy_defender", "bias_heavy_def"], bias.heavy_defender)?,
            },
            expected_score_floor: parse_setting(raw, &["expected_score_floor"], defaults.expected_score_floor)?,
            expected_score_ceiling: parse_setting(raw, &["expected_score_ceiling"], defaults.expected_score_ceiling)?,
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("initial_rating", self.initial_rating),
            ("k_factor_provisional", self.k_factor_provisional),
            ("k_factor_standard", self.k_factor_standard),
            ("sweep_bonus_multiplier", self.sweep_bonus_multiplier),
            ("lead_multiplier", self.lead_multiplier),
            ("size_influence_exponent", self.size_influence_exponent),
            ("playoff_multiplier", self.playoff_multiplier),
            ("expected_score_floor", self.expected_score_floor),
            ("expected_score_ceiling", self.expected_score_ceiling),
        ];
        for (key, value) in finite {
            if !value.is_finite() {
                return Err(config_error(format!("{} must be a finite number", key)));
            }
        }

        if self.initial_rating <= 0.0 {
            return Err(config_error("Initial rating must be positive"));
        }

        if self.k_factor_provisional < 0.0 || self.k_factor_standard < 0.0 {
            return Err(config_error("K-factors must be non-negative"));
        }

        let multipliers = [
            ("sweep_bonus_multiplier", self.sweep_bonus_multiplier),
            ("lead_multiplier", self.lead_multiplier),
            ("playoff_multiplier", self.playoff_multiplier),
        ];
        for (key, value) in multipliers {
            if value <= 0.0 {
                return Err(config_error(format!("{} must be positive", key)));
            }
        }

        if self.size_influence_exponent < 0.0 {
            return Err(config_error("Size influence exponent must be non-negative"));
        }

        let percentages = [
            ("light_attacker", self.map_bias.light_attacker),
            ("heavy_attacker", self.map_bias.heavy_attacker),
            ("light_defender", self.map_bias.light_defender),
            ("heavy_defender", self.map_bias.heavy_defender),
        ];
        for (key, value) in percentages {
            if !(0..100).contains(&value) {
                return Err(config_error(format!(
                    "Map bias percentage {} must be between 0 and 99, got {}",
                    key, value
                )));
            }
        }

        if self.expected_score_floor <= 0.0
            || self.expected_score_ceiling >= 1.0
            || self.expected_score_floor >= self.expected_score_ceiling
        {
            return Err(config_error(
                "Expected score bounds must satisfy 0 < floor < ceiling < 1",
            ));
        }

        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> anyhow::Error {
    SeasonError::ConfigurationError {
        message: message.into(),
    }
    .into()
}

fn parse_setting<T>(raw: &HashMap<String, String>, keys: &[&str], default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let Some((key, value)) = keys
        .iter()
        .find_map(|key| raw.get(*key).map(|value| (*key, value)))
    else {
        return Ok(default);
    };

    value.trim().parse::<T>().map_err(|e| {
        SeasonError::InvalidSetting {
            key: key.to_string(),
            value: value.clone(),
            reason: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_are_valid() {
        let settings = EloSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.initial_rating, 1500.0);
        assert_eq!(settings.k_factor_for(0), 128.0);
        assert_eq!(settings.k_factor_for(9), 128.0);
        assert_eq!(settings.k_factor_for(10), 96.0);
    }

    #[test]
    fn test_bias_multipliers() {
        let bias = MapBiasPercentages::default();
        assert_eq!(bias.multiplier(BiasLevel::Balanced), 1.0);
        assert!((bias.multiplier(BiasLevel::LightAttacker) - 1.15).abs() < 1e-12);
        assert!((bias.multiplier(BiasLevel::HeavyAttacker) - 1.30).abs() < 1e-12);
        assert!((bias.multiplier(BiasLevel::LightDefender) - 0.85).abs() < 1e-12);
        assert!((bias.multiplier(BiasLevel::HeavyDefender) - 0.70).abs() < 1e-12);
    }

    #[test]
    fn test_from_raw_missing_keys_use_defaults() {
        let settings = EloSettings::from_raw(&HashMap::new()).unwrap();
        assert_eq!(settings, EloSettings::default());
    }

    #[test]
    fn test_from_raw_legacy_keys() {
        let settings = EloSettings::from_raw(&raw(&[
            ("initial_elo", "1200"),
            ("provisional_rounds", "4"),
            ("size_influence", "0.5"),
            ("bias_heavy_def", "40"),
        ]))
        .unwrap();

        assert_eq!(settings.initial_rating, 1200.0);
        assert_eq!(settings.provisional_rounds_threshold, 4);
        assert_eq!(settings.size_influence_exponent, 0.5);
        assert_eq!(settings.map_bias.heavy_defender, 40);
        assert_eq!(settings.k_factor_standard, 96.0);

        assert_eq!(canonical_setting_key("bias_heavy_def"), "heavy_defender");
        assert_eq!(canonical_setting_key("k_factor_standard"), "k_factor_standard");
    }

    #[test]
    fn test_from_raw_malformed_value_is_an_error() {
        let err = EloSettings::from_raw(&raw(&[("k_factor_standard", "ninety")])).unwrap_err();
        match err.downcast_ref::<SeasonError>() {
            Some(SeasonError::InvalidSetting { key, value, .. }) => {
                assert_eq!(key, "k_factor_standard");
                assert_eq!(value, "ninety");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_from_raw_bias_must_be_integer() {
        assert!(EloSettings::from_raw(&raw(&[("light_attacker", "12.5")])).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut settings = EloSettings::default();
        settings.k_factor_standard = -1.0;
        assert!(settings.validate().is_err());

        let mut settings = EloSettings::default();
        settings.lead_multiplier = 0.0;
        assert!(settings.validate().is_err());

        let mut settings = EloSettings::default();
        settings.map_bias.heavy_defender = 100;
        assert!(settings.validate().is_err());

        let mut settings = EloSettings::default();
        settings.expected_score_floor = 0.9;
        settings.expected_score_ceiling = 0.1;
        assert!(settings.validate().is_err());

        let mut settings = EloSettings::default();
        settings.expected_score_floor = 0.0;
        assert!(settings.validate().is_err());

        let mut settings = EloSettings::default();
        settings.expected_score_ceiling = 1.0;
        assert!(settings.validate().is_err());

        let mut settings = EloSettings::default();
        settings.expected_score_floor = 0.01;
        settings.expected_score_ceiling = 0.99;
        assert!(settings.validate().is_ok());

        let mut settings = EloSettings::default();
        settings.playoff_multiplier = f64::NAN;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_toml_partial_settings() {
        let settings: EloSettings = toml::from_str("k_factor_standard = 64.0\n[map_bias]\nlight_attacker = 5\n").unwrap();
        assert_eq!(settings.k_factor_standard, 64.0);
        assert_eq!(settings.k_factor_provisional, 128.0);
        assert_eq!(settings.map_bias.light_attacker, 5);
        assert_eq!(settings.map_bias.heavy_attacker, 30);
    }
}

//! Main application configuration
//!
//! This module defines the top-level configuration used by the command line
//! tool: TOML file loading, environment variable overrides and validation.

use crate::config::{BalancerConfig, EloSettings};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub rating: EloSettings,
    pub balancer: BalancerConfig,
}

/// Service-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Name used in log output
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "season-elo".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.apply_overrides(|key| env::var(key).ok())?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_overrides(|key| env::var(key).ok())?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Apply `SEASON_ELO_*` overrides from a variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup("SEASON_ELO_LOG_LEVEL") {
            self.service.log_level = level;
        }
        if let Some(value) = lookup("SEASON_ELO_INITIAL_RATING") {
            self.rating.initial_rating = value
                .parse()
                .map_err(|_| anyhow!("Invalid SEASON_ELO_INITIAL_RATING value: {}", value))?;
        }
        if let Some(value) = lookup("SEASON_ELO_K_PROVISIONAL") {
            self.rating.k_factor_provisional = value
                .parse()
                .map_err(|_| anyhow!("Invalid SEASON_ELO_K_PROVISIONAL value: {}", value))?;
        }
        if let Some(value) = lookup("SEASON_ELO_K_STANDARD") {
            self.rating.k_factor_standard = value
                .parse()
                .map_err(|_| anyhow!("Invalid SEASON_ELO_K_STANDARD value: {}", value))?;
        }
        if let Some(value) = lookup("SEASON_ELO_PROVISIONAL_ROUNDS") {
            self.rating.provisional_rounds_threshold = value
                .parse()
                .map_err(|_| anyhow!("Invalid SEASON_ELO_PROVISIONAL_ROUNDS value: {}", value))?;
        }
        if let Some(value) = lookup("SEASON_ELO_MAX_CANDIDATES") {
            self.balancer.max_candidates = Some(
                value
                    .parse()
                    .map_err(|_| anyhow!("Invalid SEASON_ELO_MAX_CANDIDATES value: {}", value))?,
            );
        }
        Ok(())
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }

    config.rating.validate()?;
    config.balancer.validate()?;

    Ok(())
}

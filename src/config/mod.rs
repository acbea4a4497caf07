//! Configuration management for season-elo
//!
//! This module handles rating and balancer settings, TOML file loading,
//! environment overrides, validation and default values.

pub mod app;
pub mod balance;
pub mod rating;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, ServiceSettings};
pub use balance::BalancerConfig;
pub use rating::{canonical_setting_key, EloSettings, MapBiasPercentages, SETTING_KEYS};

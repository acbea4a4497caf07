//! Team balancer configuration

use crate::error::{Result, SeasonError};
use serde::{Deserialize, Serialize};

/// Knobs for the brute-force team balancer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalancerConfig {
    /// Extra weight on each co-rostering above the over-teaming threshold
    pub over_teaming_penalty_multiplier: u64,
    /// Upper bound on enumerated partitions; None searches the full power set
    pub max_candidates: Option<u64>,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            over_teaming_penalty_multiplier: 10,
            max_candidates: None,
        }
    }
}

impl BalancerConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.max_candidates == Some(0) {
            return Err(SeasonError::ConfigurationError {
                message: "max_candidates must be at least 1 when set".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_balancer_config() {
        let config = BalancerConfig::default();
        assert_eq!(config.over_teaming_penalty_multiplier, 10);
        assert_eq!(config.max_candidates, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_cap_rejected() {
        let config = BalancerConfig {
            max_candidates: Some(0),
            ..BalancerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}

//! Error types for the rating engine and team balancer
//!
//! Domain failures are modelled with thiserror and surfaced through anyhow,
//! so callers can either bubble them up or downcast to `SeasonError`.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific rating and balancing scenarios
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SeasonError {
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Invalid value '{value}' for setting '{key}': {reason}")]
    InvalidSetting {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Invalid match in week {week}: {reason}")]
    InvalidMatch { week: usize, reason: String },

    #[error("Units cannot be forced onto both sides: {}", units.join(", "))]
    ContradictoryConstraints { units: Vec<String> },

    #[error("Balancer search over {units} units exceeds the limit of {limit} candidates")]
    SearchSpaceTooLarge { units: usize, limit: u64 },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contradiction_message_lists_units() {
        let err = SeasonError::ContradictoryConstraints {
            units: vec!["1st Texas".to_string(), "2nd Wisconsin".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Units cannot be forced onto both sides: 1st Texas, 2nd Wisconsin"
        );
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err: anyhow::Error = SeasonError::InvalidInput {
            reason: "empty pool".to_string(),
        }
        .into();

        assert!(matches!(
            err.downcast_ref::<SeasonError>(),
            Some(SeasonError::InvalidInput { .. })
        ));
    }
}

//! Utility functions shared by the rating and balancing modules

use crate::types::{UnitName, WeeklyMatch};

/// Weeks up to and including `cutoff`; the whole season when `cutoff` is
/// None or past the last week
pub fn weeks_through(matches: &[WeeklyMatch], cutoff: Option<usize>) -> &[WeeklyMatch] {
    match cutoff {
        Some(last) if last < matches.len() => &matches[..=last],
        _ => matches,
    }
}

/// Order-independent key for a pair of units
pub fn pair_key(first: &str, second: &str) -> (UnitName, UnitName) {
    if first <= second {
        (first.to_string(), second.to_string())
    } else {
        (second.to_string(), first.to_string())
    }
}

/// Arithmetic mean, 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Round to the nearest integer, ties to even
pub fn round_half_even(value: f64) -> f64 {
    value.round_ties_even()
}

/// Clamp a value into `[lower, upper]`
pub fn clamp(value: f64, lower: f64, upper: f64) -> f64 {
    value.max(lower).min(upper)
}

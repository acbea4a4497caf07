//! Headcount lookups
//!
//! The engine only needs `(unit, week) -> average players`. Two season-backed
//! implementations are provided, and any `Fn(&str, usize) -> f64` closure
//! works as a lookup too.

use crate::types::{PlayerRange, UnitName, WeeklyMatch};
use std::collections::HashMap;

/// Average headcount a unit brings in a given week; 0 when unknown
pub trait HeadcountLookup {
    fn headcount(&self, unit: &str, week_index: usize) -> f64;
}

impl<F> HeadcountLookup for F
where
    F: Fn(&str, usize) -> f64,
{
    fn headcount(&self, unit: &str, week_index: usize) -> f64 {
        self(unit, week_index)
    }
}

/// Week-specific range if the week has one, otherwise the global range
#[derive(Debug, Clone, Copy)]
pub struct WeeklyHeadcount<'a> {
    weeks: &'a [WeeklyMatch],
    global: &'a HashMap<UnitName, PlayerRange>,
}

impl<'a> WeeklyHeadcount<'a> {
    pub fn new(weeks: &'a [WeeklyMatch], global: &'a HashMap<UnitName, PlayerRange>) -> Self {
        Self { weeks, global }
    }
}

impl HeadcountLookup for WeeklyHeadcount<'_> {
    fn headcount(&self, unit: &str, week_index: usize) -> f64 {
        self.weeks
            .get(week_index)
            .and_then(|week| week.player_counts.get(unit))
            .or_else(|| self.global.get(unit))
            .map(PlayerRange::average)
            .unwrap_or(0.0)
    }
}

/// Mean of the week-specific averages over every week up to `week_index` in
/// which the unit was rostered with a usable (max > 0) range.
#[derive(Debug, Clone, Copy)]
pub struct ParticipationHeadcount<'a> {
    weeks: &'a [WeeklyMatch],
    fallback: Option<&'a HashMap<UnitName, PlayerRange>>,
}

impl<'a> ParticipationHeadcount<'a> {
    pub fn new(weeks: &'a [WeeklyMatch]) -> Self {
        Self {
            weeks,
            fallback: None,
        }
    }

    /// Use global ranges for units with no usable weekly data
    pub fn with_global_fallback(mut self, global: &'a HashMap<UnitName, PlayerRange>) -> Self {
        self.fallback = Some(global);
        self
    }
}

impl HeadcountLookup for ParticipationHeadcount<'_> {
    fn headcount(&self, unit: &str, week_index: usize) -> f64 {
        let last = week_index.min(self.weeks.len().saturating_sub(1));
        let averages: Vec<f64> = self
            .weeks
            .iter()
            .take(last + 1)
            .filter(|week| week.fields(unit))
            .filter_map(|week| week.player_counts.get(unit))
            .filter(|range| range.max > 0)
            .map(PlayerRange::average)
            .collect();

        if averages.is_empty() {
            return self
                .fallback
                .and_then(|global| global.get(unit))
                .map(PlayerRange::average)
                .unwrap_or(0.0);
        }

        crate::utils::mean(&averages)
    }
}

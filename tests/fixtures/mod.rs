//! Season builders shared by the integration tests

#![allow(dead_code)]

use season_elo::types::{PlayerRange, RoundResult, SeasonData, Side, Unit, UnitName, WeeklyMatch};
use std::collections::HashMap;

/// Turnout ranges keyed by unit
pub fn unit_ranges(entries: &[(&str, u32, u32)]) -> HashMap<UnitName, PlayerRange> {
    entries
        .iter()
        .map(|(unit, min, max)| (unit.to_string(), PlayerRange::new(*min, *max)))
        .collect()
}

/// A week between two rosters with the given round winners
pub fn week(team_a: &[&str], team_b: &[&str], winners: [Option<Side>; 2]) -> WeeklyMatch {
    let mut week = WeeklyMatch::new(team_a.iter().copied(), team_b.iter().copied());
    week.rounds = [
        RoundResult {
            winner: winners[0],
            ..RoundResult::default()
        },
        RoundResult {
            winner: winners[1],
            ..RoundResult::default()
        },
    ];
    week
}

/// Every unit brings the same number of players every week
pub fn flat_headcount(players: f64) -> impl Fn(&str, usize) -> f64 {
    move |_: &str, _: usize| players
}

/// A short season touching every rating feature: leads, maps, a sweep,
/// week-specific turnout, a roster-only week and a playoff week
pub fn sample_season() -> SeasonData {
    let units = vec![
        Unit::new("1st Minnesota", PlayerRange::new(20, 30)),
        Unit::new("2nd Wisconsin", PlayerRange::new(15, 25)),
        Unit::new("20th Maine", PlayerRange::new(10, 20)),
        Unit::new("1st Texas", PlayerRange::new(25, 35)),
        Unit::new("4th Alabama", PlayerRange::new(10, 15)),
        Unit::new("Stonewall Brigade", PlayerRange::new(20, 25)),
    ];

    let union_side = ["1st Minnesota", "2nd Wisconsin", "20th Maine"];
    let confederate_side = ["1st Texas", "4th Alabama", "Stonewall Brigade"];

    let mut opener = week(&union_side, &confederate_side, [Some(Side::A), Some(Side::B)]);
    opener.name = Some("Week 1".to_string());
    opener.lead_a = Some("1st Minnesota".to_string());
    opener.lead_b = Some("1st Texas".to_string());
    opener.rounds[0] = opener.rounds[0].clone().on_map("Bloody Lane", false);
    opener.rounds[1] = opener.rounds[1].clone().on_map("Bloody Lane", true);

    let mut sweep = week(
        &["1st Minnesota", "4th Alabama"],
        &["1st Texas", "2nd Wisconsin", "20th Maine", "Stonewall Brigade"],
        [Some(Side::B), Some(Side::B)],
    );
    sweep.name = Some("Week 2".to_string());
    sweep
        .player_counts
        .insert("1st Minnesota".to_string(), PlayerRange::new(35, 45));

    let mut roster_only = week(&union_side, &confederate_side, [None, None]);
    roster_only.name = Some("Week 3".to_string());

    let mut playoffs = week(&union_side, &confederate_side, [Some(Side::A), Some(Side::A)]);
    playoffs.name = Some("Playoffs".to_string());
    playoffs.playoffs = true;
    playoffs.rounds[0].lead_a = Some("20th Maine".to_string());
    playoffs.rounds[1].lead_a = Some("2nd Wisconsin".to_string());
    playoffs.rounds[0] = playoffs.rounds[0].clone().on_map("Pry Ford", false);

    SeasonData {
        units,
        weeks: vec![opener, sweep, roster_only, playoffs],
        map_biases: [
            ("Bloody Lane".to_string(), season_elo::types::BiasLevel::HeavyAttacker),
            ("Pry Ford".to_string(), season_elo::types::BiasLevel::LightDefender),
        ]
        .into_iter()
        .collect(),
        attacker_maps: None,
        settings: None,
    }
}

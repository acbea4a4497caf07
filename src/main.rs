//! Command line entry point for season-elo
//!
//! Loads a season from JSON, then rates it, prints pairing history,
//! balances a pool of units or searches rating settings.

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use season_elo::balance::{BalanceOutcome, BalanceRequest, TeamBalancer};
use season_elo::config::{AppConfig, EloSettings};
use season_elo::history::{
    build_opponent_counts, build_teammate_counts, build_unit_records, PairCounts, UnitRecords,
};
use season_elo::rating::{
    win_chance, HeadcountLookup, ParticipationHeadcount, RatingEngine, StaticMapBias,
    WeeklyHeadcount,
};
use season_elo::tuning::{tune, SettingsGrid};
use season_elo::types::{PlayerRange, SeasonData, UnitName};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// Season Elo - roster-weighted ratings and team balancing
#[derive(Parser)]
#[command(
    name = "season-elo",
    version,
    about = "Roster-weighted Elo ratings and team balancing for team-vs-team seasons"
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        global = true,
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        global = true,
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay the season and print standings
    Ratings(RatingsArgs),
    /// Print pair counts and per-unit round records
    History(HistoryArgs),
    /// Split a pool of units into two balanced sides
    Balance(BalanceArgs),
    /// Rank rating settings from a parameter grid
    Tune(TuneArgs),
}

#[derive(ClapArgs)]
struct SeasonArgs {
    /// Season data file (JSON)
    #[arg(value_name = "SEASON")]
    season: PathBuf,

    /// Last week to include (0-based); defaults to the whole season
    #[arg(short, long, value_name = "WEEK")]
    week: Option<usize>,
}

#[derive(ClapArgs)]
struct RatingsArgs {
    #[command(flatten)]
    season: SeasonArgs,

    /// Average each unit's headcount over the weeks it took part in
    #[arg(long)]
    participation: bool,

    /// Print the standings as JSON
    #[arg(long)]
    json: bool,
}

#[derive(ClapArgs)]
struct HistoryArgs {
    #[command(flatten)]
    season: SeasonArgs,

    /// Only show pairings and the record of this unit
    #[arg(short, long, value_name = "UNIT")]
    unit: Option<String>,
}

#[derive(ClapArgs)]
struct BalanceArgs {
    #[command(flatten)]
    season: SeasonArgs,

    /// Units available this week; defaults to every unit in the season
    #[arg(short, long, value_delimiter = ',', value_name = "UNITS")]
    units: Vec<String>,

    /// Force two units apart, first on side A (repeatable, "A:B")
    #[arg(short, long, value_name = "A:B")]
    oppose: Vec<String>,

    /// Largest tolerated player difference
    #[arg(short, long, value_name = "PLAYERS", default_value_t = 5)]
    max_diff: u32,
}

#[derive(ClapArgs)]
struct TuneArgs {
    /// Season data file (JSON)
    #[arg(value_name = "SEASON")]
    season: PathBuf,

    /// Parameter grid (TOML)
    #[arg(value_name = "GRID")]
    grid: PathBuf,

    /// Number of results to print
    #[arg(short, long, default_value_t = 10)]
    top: usize,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load configuration from file or environment, then apply CLI overrides
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    season_elo::config::validate_config(&config)?;
    Ok(config)
}

fn load_season(path: &Path) -> Result<SeasonData> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read season file {}", path.display()))?;
    let season: SeasonData = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse season file {}", path.display()))?;
    info!(
        "Loaded {} units and {} weeks from {}",
        season.units.len(),
        season.weeks.len(),
        path.display()
    );
    Ok(season)
}

fn map_bias_for(season: &SeasonData) -> StaticMapBias {
    let provider = StaticMapBias::new(season.map_biases.clone());
    match &season.attacker_maps {
        Some(maps) => provider.with_attacker_maps(maps.iter().cloned()),
        None => provider,
    }
}

/// Settings embedded in the season file win over the configured ones
fn settings_for(season: &SeasonData, config: &AppConfig) -> EloSettings {
    season
        .settings
        .clone()
        .unwrap_or_else(|| config.rating.clone())
}

fn run_ratings(args: &RatingsArgs, config: &AppConfig) -> Result<()> {
    let season = load_season(&args.season.season)?;
    let engine = RatingEngine::new(settings_for(&season, config), Arc::new(map_bias_for(&season)))?;

    let global = season.global_ranges();
    let weekly = WeeklyHeadcount::new(&season.weeks, &global);
    let participation = ParticipationHeadcount::new(&season.weeks).with_global_fallback(&global);
    let headcount: &dyn HeadcountLookup = if args.participation {
        &participation
    } else {
        &weekly
    };

    let replay = engine.replay(&season.weeks, args.season.week, headcount)?;
    let Some(last_week) = replay.weekly.len().checked_sub(2) else {
        println!("No weeks to rate");
        return Ok(());
    };
    let standings = replay.standings(last_week).unwrap_or_default();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&standings)?);
        return Ok(());
    }

    println!("Standings after week {}", last_week + 1);
    println!("{:>4}  {:<32} {:>9} {:>8} {:>7}", "Rank", "Unit", "Rating", "Change", "Rounds");
    for standing in &standings {
        println!(
            "{:>4}  {:<32} {:>9.1} {:>+8.1} {:>7}",
            standing.rank,
            standing.unit,
            standing.rating,
            standing.change,
            replay.rounds_played.get(&standing.unit)
        );
    }

    // preview the week after the cutoff with the ratings as they stand
    if let Some(next) = season.weeks.get(last_week + 1) {
        let chance = win_chance(next, &replay.ratings, headcount, last_week + 1);
        if let (Some(a), Some(b)) = (chance.chance_a, chance.chance_b) {
            println!();
            println!("Week {} win chance: A {:.1}% / B {:.1}%", last_week + 2, a * 100.0, b * 100.0);
        }
    }

    Ok(())
}

fn print_pairs(title: &str, pairs: &PairCounts, unit: Option<&str>) {
    println!("{}", title);
    match unit {
        Some(unit) => {
            for (partner, count) in pairs.partners(unit) {
                println!("  {:<32} {:>4}", partner, count);
            }
        }
        None => {
            let mut rows: Vec<(&str, &str, u32)> = pairs.iter().collect();
            rows.sort_by(|a, b| b.2.cmp(&a.2));
            for (first, second, count) in rows {
                println!("  {:<32} {:<32} {:>4}", first, second, count);
            }
        }
    }
}

fn run_history(args: &HistoryArgs) -> Result<()> {
    let season = load_season(&args.season.season)?;
    let teammates = build_teammate_counts(&season.weeks, args.season.week);
    let opponents = build_opponent_counts(&season.weeks, args.season.week);

    print_pairs("Teammates", &teammates, args.unit.as_deref());
    println!(
        "  mean {:.2}, over-teaming threshold {}",
        teammates.mean_count(),
        teammates.over_teaming_threshold()
    );
    println!();
    print_pairs("Opponents", &opponents, args.unit.as_deref());
    println!();
    let records = build_unit_records(&season.weeks, args.season.week, &map_bias_for(&season));
    print_records(&records, args.unit.as_deref());
    Ok(())
}

fn format_rate(rate: Option<f64>) -> String {
    rate.map(|r| format!("{:.1}%", r * 100.0))
        .unwrap_or_else(|| "-".to_string())
}

fn print_records(records: &UnitRecords, unit: Option<&str>) {
    println!(
        "{:<32} {:>4} {:>4} {:>7} {:>5} {:>5} {:>7} {:>5} {:>5} {:>7}",
        "Unit", "W", "L", "Win%", "AtkW", "AtkL", "Atk%", "DefW", "DefL", "Def%"
    );
    for (name, record) in records {
        if unit.is_some_and(|u| u != name.as_str()) {
            continue;
        }
        println!(
            "{:<32} {:>4} {:>4} {:>7} {:>5} {:>5} {:>7} {:>5} {:>5} {:>7}",
            name,
            record.wins,
            record.losses,
            format_rate(record.win_rate()),
            record.attack_wins,
            record.attack_losses,
            format_rate(record.attack_win_rate()),
            record.defend_wins,
            record.defend_losses,
            format_rate(record.defend_win_rate())
        );
    }
}

fn parse_opposing_pairs(values: &[String]) -> Result<Vec<(UnitName, UnitName)>> {
    values
        .iter()
        .map(|value| {
            value
                .split_once(':')
                .map(|(a, b)| (a.trim().to_string(), b.trim().to_string()))
                .ok_or_else(|| anyhow::anyhow!("Opposing pair must look like 'A:B', got '{}'", value))
        })
        .collect()
}

fn run_balance(args: &BalanceArgs, config: &AppConfig) -> Result<()> {
    let season = load_season(&args.season.season)?;
    let history = build_teammate_counts(&season.weeks, args.season.week);
    let unit_ranges: HashMap<UnitName, PlayerRange> = season.global_ranges();

    let available_units: BTreeSet<UnitName> = if args.units.is_empty() {
        unit_ranges.keys().cloned().collect()
    } else {
        args.units.iter().map(|u| u.trim().to_string()).collect()
    };

    let request = BalanceRequest {
        available_units,
        unit_ranges,
        opposing_pairs: parse_opposing_pairs(&args.oppose)?,
        max_player_diff: args.max_diff,
    };

    let balancer = TeamBalancer::new(config.balancer.clone())?;
    match balancer.balance(&request, &history)? {
        BalanceOutcome::Balanced(partition) => {
            println!("Side A ({}-{} players)", partition.min_a, partition.max_a);
            for unit in &partition.team_a {
                println!("  {}", unit);
            }
            println!("Side B ({}-{} players)", partition.min_b, partition.max_b);
            for unit in &partition.team_b {
                println!("  {}", unit);
            }
            println!(
                "Average player difference {:.1}, teammate score {}",
                partition.avg_diff, partition.teammate_score
            );
        }
        BalanceOutcome::Infeasible(infeasible) => {
            println!("{}", infeasible);
        }
    }
    Ok(())
}

fn run_tune(args: &TuneArgs) -> Result<()> {
    let season = load_season(&args.season)?;
    let grid_text = std::fs::read_to_string(&args.grid)
        .with_context(|| format!("Failed to read grid file {}", args.grid.display()))?;
    let grid = SettingsGrid::from_toml_str(&grid_text)?;

    let global = season.global_ranges();
    let headcount = ParticipationHeadcount::new(&season.weeks).with_global_fallback(&global);
    let results = tune(&grid, &season.weeks, &headcount, Arc::new(map_bias_for(&season)))?;

    println!(
        "{:>4} {:>9} {:>8} {:>8} {:>8} {:>8} {:>9}",
        "ID", "Composite", "Brier", "Acc", "RMSE", "Drift", "R2"
    );
    for result in results.iter().take(args.top) {
        println!(
            "{:>4} {:>9.2} {:>8.4} {:>7.1}% {:>8.2} {:>8.4} {:>8.1}%",
            result.id,
            result.composite,
            result.metrics.brier,
            result.metrics.accuracy * 100.0,
            result.metrics.rmse,
            result.metrics.drift,
            result.metrics.r_squared * 100.0
        );
    }
    if let Some(best) = results.first() {
        println!();
        println!("Best settings:");
        print!("{}", toml::to_string(&best.settings)?);
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let result = match &args.command {
        Command::Ratings(ratings) => run_ratings(ratings, &config),
        Command::History(history) => run_history(history),
        Command::Balance(balance) => run_balance(balance, &config),
        Command::Tune(tuning) => run_tune(tuning),
    };

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}

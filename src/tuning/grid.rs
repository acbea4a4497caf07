//! Parameter grids for settings search

use crate::config::{canonical_setting_key, EloSettings, SETTING_KEYS};
use crate::error::{Result, SeasonError};
use std::collections::{BTreeMap, HashMap};

/// Most values a single `range(..)` may expand to
pub const MAX_RANGE_VALUES: usize = 10_000;

/// Candidate values for one setting
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterRange {
    values: Vec<f64>,
}

impl ParameterRange {
    pub fn single(value: f64) -> Self {
        Self {
            values: vec![value],
        }
    }

    /// Parse `range(start, stop, step)`, a comma-separated list, or a single
    /// number. Ranges exclude `stop`; `range(stop)` and `range(start, stop)`
    /// default the start to 0 and the step to 1.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let lowered = trimmed.to_ascii_lowercase();

        let values = if let Some(args) = lowered
            .strip_prefix("range(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let args = parse_numbers(input, args.split(','))?;
            let (start, stop, step) = match args.as_slice() {
                [stop] => (0.0, *stop, 1.0),
                [start, stop] => (*start, *stop, 1.0),
                [start, stop, step] => (*start, *stop, *step),
                _ => return Err(invalid(input, "range takes one to three arguments")),
            };
            arange(input, start, stop, step)?
        } else {
            parse_numbers(input, trimmed.split(','))?
        };

        if values.is_empty() {
            return Err(invalid(input, "no values"));
        }
        Ok(Self { values })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Cartesian product of parameter ranges over `EloSettings` keys.
/// Keys left out keep their default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsGrid {
    parameters: BTreeMap<String, ParameterRange>,
}

impl SettingsGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the range for a setting key. A key and its legacy
    /// alias cannot both be present.
    pub fn insert(&mut self, key: &str, range: ParameterRange) -> Result<()> {
        if !SETTING_KEYS.contains(&key) {
            return Err(SeasonError::InvalidSetting {
                key: key.to_string(),
                value: format!("{:?}", range.values()),
                reason: "unknown setting".to_string(),
            }
            .into());
        }

        let canonical = canonical_setting_key(key);
        if let Some(existing) = self
            .parameters
            .keys()
            .find(|existing| existing.as_str() != key && canonical_setting_key(existing) == canonical)
        {
            return Err(SeasonError::InvalidSetting {
                key: key.to_string(),
                value: format!("{:?}", range.values()),
                reason: format!("'{}' already sets {}", existing, canonical),
            }
            .into());
        }
        self.parameters.insert(key.to_string(), range);
        Ok(())
    }

    /// Read a grid from TOML: each key maps to a number or a range string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let table: BTreeMap<String, toml::Value> = toml::from_str(content)?;
        let mut grid = Self::new();

        for (key, value) in table {
            let range = match &value {
                toml::Value::String(s) => ParameterRange::parse(s)?,
                toml::Value::Integer(i) => ParameterRange::single(*i as f64),
                toml::Value::Float(f) => ParameterRange::single(*f),
                other => {
                    return Err(SeasonError::InvalidSetting {
                        key,
                        value: other.to_string(),
                        reason: "expected a number or a range string".to_string(),
                    }
                    .into())
                }
            };
            grid.insert(&key, range)?;
        }

        Ok(grid)
    }

    /// Number of combinations the grid expands to
    pub fn len(&self) -> usize {
        self.parameters.values().map(ParameterRange::len).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every combination as validated settings, in a stable order.
    /// A combination that does not form valid settings is an error.
    pub fn candidates(&self) -> Result<Vec<EloSettings>> {
        let mut combinations: Vec<HashMap<String, String>> = vec![HashMap::new()];

        for (key, range) in &self.parameters {
            let mut expanded = Vec::with_capacity(combinations.len() * range.len());
            for partial in &combinations {
                for value in range.values() {
                    let mut next = partial.clone();
                    next.insert(key.clone(), format_value(*value));
                    expanded.push(next);
                }
            }
            combinations = expanded;
        }

        combinations.iter().map(EloSettings::from_raw).collect()
    }
}

/// Integral values print without a fraction so integer settings parse
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn arange(input: &str, start: f64, stop: f64, step: f64) -> Result<Vec<f64>> {
    if step == 0.0 {
        return Err(invalid(input, "range step must not be zero"));
    }
    let count = ((stop - start) / step).ceil();
    if !count.is_finite() {
        return Err(invalid(input, "range bounds must be finite"));
    }

    if count > MAX_RANGE_VALUES as f64 {
        return Err(invalid(
            input,
            &format!("range expands to more than {} values", MAX_RANGE_VALUES),
        ));
    }

    let count = count.max(0.0) as usize;
    Ok((0..count).map(|i| start + i as f64 * step).collect())
}

fn parse_numbers<'a>(input: &str, parts: impl Iterator<Item = &'a str>) -> Result<Vec<f64>> {
    parts
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|e| invalid(input, &e.to_string()))
        })
        .collect()
}

fn invalid(input: &str, reason: &str) -> anyhow::Error {
    SeasonError::InvalidInput {
        reason: format!("cannot parse parameter range '{}': {}", input, reason),
    }
    .into()
}

//! Hero data loading
//!
//! Decodes the hero roster, per-hero win rates, matchup matrix and optional
//! per-hero metric arrays. Two layouts are accepted: a plain JSON object, or
//! the script layout written by the matrix generator where every array sits
//! on its own `var name = <json>;` line.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{
    validate_matrix_index, validate_metric_array, validate_win_rate_count, DataError,
};
use crate::models::{Hero, HeroData, MatchupEntry, MatchupMatrix, DEFAULT_HERO_WIN_RATE};

/// Keys that start with `heroes_` but are not per-hero metric arrays
const NON_METRIC_KEYS: [&str; 2] = ["heroes_bg", "heroes_wr"];

/// A number that may have been serialized as a string ("52.10")
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum NumOrText {
    Num(f64),
    Text(String),
}

impl NumOrText {
    fn value(&self) -> Option<f64> {
        let v = match self {
            NumOrText::Num(n) => *n,
            NumOrText::Text(s) => s.trim().parse().ok()?,
        };
        v.is_finite().then_some(v)
    }
}

type MatrixCell = Option<Vec<Option<NumOrText>>>;

#[derive(Debug, Deserialize)]
struct HeroFile {
    heroes: Vec<String>,
    #[serde(default)]
    heroes_wr: Option<Vec<Option<NumOrText>>>,
    #[serde(default)]
    win_rates: Vec<Option<Vec<MatrixCell>>>,
    #[serde(default)]
    update_time: Option<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

/// Load hero data from a file in either layout
pub fn load_hero_data<P: AsRef<Path>>(path: P) -> Result<HeroData, DataError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| DataError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let data = parse_hero_data(&content)?;

    info!(
        "Loaded {} heroes, {} matchup entries, {} metric arrays from {:?}",
        data.heroes.len(),
        data.matrix.len(),
        data.hero_metrics.len(),
        path
    );
    if let Some(date) = data.update_time {
        info!("Hero data last updated {}", date);
    }

    Ok(data)
}

/// Parse hero data from a string
pub fn parse_hero_data(content: &str) -> Result<HeroData, DataError> {
    let file: HeroFile = if content.trim_start().starts_with('{') {
        serde_json::from_str(content)?
    } else {
        serde_json::from_value(Value::Object(parse_script(content)?))?
    };
    build_hero_data(file)
}

/// Parse `var name = <json>;` lines into a JSON object
fn parse_script(content: &str) -> Result<Map<String, Value>, DataError> {
    let mut map = Map::new();

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }

        let statement = line.strip_prefix("var ").unwrap_or(line);
        let (name, value) = statement.split_once('=').ok_or_else(|| {
            DataError::InvalidHeroData(format!("line {}: expected an assignment", line_no + 1))
        })?;
        let value = value.trim().trim_end_matches(';').trim();

        map.insert(name.trim().to_string(), serde_json::from_str(value)?);
    }

    Ok(map)
}

fn build_hero_data(file: HeroFile) -> Result<HeroData, DataError> {
    let count = file.heroes.len();

    let win_rates: Vec<f64> = match &file.heroes_wr {
        Some(values) => {
            validate_win_rate_count(count, values.len())?;
            values
                .iter()
                .map(|v| {
                    v.as_ref()
                        .and_then(NumOrText::value)
                        .unwrap_or(DEFAULT_HERO_WIN_RATE)
                })
                .collect()
        }
        None => vec![DEFAULT_HERO_WIN_RATE; count],
    };

    let heroes: Vec<Hero> = file
        .heroes
        .iter()
        .zip(win_rates)
        .map(|(name, wr)| Hero::new(name.as_str(), wr))
        .collect();

    let mut matrix = MatchupMatrix::new();
    for (row, cells) in file.win_rates.iter().enumerate() {
        let Some(cells) = cells else { continue };
        for (col, cell) in cells.iter().enumerate() {
            let Some(values) = cell else { continue };
            validate_matrix_index(row, col, count)?;
            matrix.insert(row, col, decode_entry(values));
        }
    }

    let mut hero_metrics = BTreeMap::new();
    for (key, value) in &file.extra {
        if !key.starts_with("heroes_") || NON_METRIC_KEYS.contains(&key.as_str()) {
            continue;
        }
        let Value::Array(items) = value else { continue };
        validate_metric_array(key, items.len(), count)?;
        let values: Vec<f64> = items.iter().map(metric_value).collect();
        hero_metrics.insert(key.clone(), values);
    }

    let update_time = file.update_time.as_deref().and_then(|s| {
        let parsed = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok();
        if parsed.is_none() {
            warn!("Unrecognized update_time '{}' in hero data", s);
        }
        parsed
    });

    Ok(HeroData {
        heroes,
        matrix,
        hero_metrics,
        update_time,
    })
}

/// `[advantage, winrate, matches, synergy?]`, missing or null fields read as zero
fn decode_entry(values: &[Option<NumOrText>]) -> MatchupEntry {
    let field = |i: usize| -> f64 {
        values
            .get(i)
            .and_then(|v| v.as_ref())
            .and_then(NumOrText::value)
            .unwrap_or(0.0)
    };

    MatchupEntry {
        advantage: field(0),
        winrate: field(1),
        matches: field(2).max(0.0) as u32,
        synergy: field(3),
    }
}

/// Same number rules as the matrix cells; anything unusable reads as zero
fn metric_value(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

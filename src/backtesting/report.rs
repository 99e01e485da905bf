//! Summary Writer
//!
//! Flat CSV tables with a fixed column order:
//!
//! - `scenarios/<id>.csv`: one table per scenario, money to two decimals
//! - `summary.csv`: every scenario row, money in whole units
//! - `leagues/<slug>/summary.csv`: the same summary per league subset
//!
//! ROI is written to four decimals and win percentage to two.
//! `scenarios/` and `leagues/` are cleared and rewritten on every run.

use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

use super::metrics::SummaryRow;
use super::simulator::SimulationResult;
use super::sweep::{ScenarioReport, SweepReport};
use crate::data::{Dataset, Metric};
use crate::error::DataError;
use crate::models::{slugify, DerivedMatch, Side};

pub const SCENARIO_COLUMNS: [&str; 11] = [
    "metric",
    "threshold",
    "bets",
    "wins",
    "losses",
    "final_bank",
    "profit",
    "total_staked",
    "roi",
    "max_stake",
    "max_drawdown",
];

pub const SUMMARY_COLUMNS: [&str; 16] = [
    "scenario",
    "strategy_group",
    "hero_filter",
    "odds_condition",
    "metric",
    "delta_threshold",
    "bets",
    "wins",
    "losses",
    "win_pct",
    "final_bank",
    "profit",
    "total_staked",
    "roi",
    "max_drawdown",
    "max_stake",
];

const DATASET_COLUMNS: [&str; 11] = [
    "team1",
    "team2",
    "league",
    "winner",
    "team1_odds",
    "team2_odds",
    "team1_label",
    "team2_label",
    "team1_score",
    "team2_score",
    "team1_advantages",
];

/// In-memory table written once, after all rows are known
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render to CSV text
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        out.push_str(&join_escaped(&self.headers));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&join_escaped(row));
            out.push('\n');
        }
        out
    }

    /// Write to `path`, creating parent directories
    pub fn write(&self, path: &Path) -> Result<(), DataError> {
        let write_err = |source| DataError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let mut file = BufWriter::new(File::create(path).map_err(write_err)?);
        file.write_all(self.to_csv().as_bytes()).map_err(write_err)?;
        file.flush().map_err(write_err)?;
        Ok(())
    }
}

fn join_escaped(values: &[String]) -> String {
    values
        .iter()
        .map(|s| escape(s))
        .collect::<Vec<_>>()
        .join(",")
}

/// Quote fields containing a comma, quote or line break
fn escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Fixed decimals without a `-0.00`
fn fixed(value: f64, places: usize) -> String {
    let s = format!("{:.*}", places, value);
    if s.starts_with('-') && s[1..].chars().all(|c| c == '0' || c == '.') {
        s[1..].to_string()
    } else {
        s
    }
}

/// Rounded to whole units, half away from zero
fn whole(value: f64) -> String {
    (value.round() as i64).to_string()
}

fn threshold_text(threshold: f64) -> String {
    format!("{}", threshold)
}

fn scenario_row(r: &SimulationResult) -> Vec<String> {
    vec![
        r.metric.label().to_string(),
        threshold_text(r.threshold),
        r.bets.to_string(),
        r.wins.to_string(),
        r.losses.to_string(),
        fixed(r.final_bankroll, 2),
        fixed(r.profit(), 2),
        fixed(r.total_staked, 2),
        fixed(r.roi(), 4),
        fixed(r.max_stake, 2),
        fixed(r.max_drawdown, 2),
    ]
}

fn summary_row(row: &SummaryRow) -> Vec<String> {
    let r = &row.result;
    vec![
        row.scenario.clone(),
        row.strategy_group.clone(),
        row.hero_filter.clone(),
        row.odds_condition.clone(),
        r.metric.label().to_string(),
        threshold_text(r.threshold),
        r.bets.to_string(),
        r.wins.to_string(),
        r.losses.to_string(),
        fixed(r.win_pct(), 2),
        whole(r.final_bankroll),
        whole(r.profit()),
        whole(r.total_staked),
        fixed(r.roi(), 4),
        whole(r.max_drawdown),
        whole(r.max_stake),
    ]
}

/// Per-scenario table
pub fn scenario_table(report: &ScenarioReport) -> CsvTable {
    let mut table = CsvTable::new(&SCENARIO_COLUMNS);
    for r in &report.results {
        table.push(scenario_row(r));
    }
    table
}

/// Combined summary table
pub fn summary_table(rows: &[SummaryRow]) -> CsvTable {
    let mut table = CsvTable::new(&SUMMARY_COLUMNS);
    for row in rows {
        table.push(summary_row(row));
    }
    table
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn dataset_row(m: &DerivedMatch) -> Vec<String> {
    let winner = match m.winner {
        Some(Side::Team1) => m.team1.name.clone(),
        Some(Side::Team2) => m.team2.name.clone(),
        None => String::new(),
    };
    let advantages = m
        .team1
        .hero_advantages
        .iter()
        .map(|a| fixed(*a, 4))
        .collect::<Vec<_>>()
        .join("|");

    let mut row = vec![
        m.team1.name.clone(),
        m.team2.name.clone(),
        m.league.clone(),
        winner,
        optional(m.team1.odds),
        optional(m.team2.odds),
        m.team1.label.as_str().to_string(),
        m.team2.label.as_str().to_string(),
        fixed(m.team1.score, 4),
        fixed(m.team2.score, 4),
        advantages,
    ];
    for metric in Metric::ALL {
        row.push(m.metric(metric.label()).map(|v| fixed(v, 4)).unwrap_or_default());
    }
    row
}

/// Derived dataset table, one row per kept match in replay order
pub fn dataset_table(dataset: &Dataset) -> CsvTable {
    let mut headers: Vec<&str> = DATASET_COLUMNS.to_vec();
    headers.extend(Metric::ALL.iter().map(|m| m.label()));

    let mut table = CsvTable::new(&headers);
    for m in &dataset.matches {
        table.push(dataset_row(m));
    }
    table
}

/// Files produced by one backtest run
#[derive(Debug, Clone, Default, Serialize)]
pub struct WrittenOutputs {
    pub scenario_files: Vec<PathBuf>,
    pub summary_file: PathBuf,
    pub league_files: Vec<PathBuf>,
}

impl WrittenOutputs {
    pub fn file_count(&self) -> usize {
        self.scenario_files.len() + 1 + self.league_files.len()
    }
}

/// Directory name per league, suffixed `-2`, `-3`, ... when two slugs collide
fn league_slugs<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    // slug -> position of the league that claimed it
    let mut used: BTreeMap<String, usize> = BTreeMap::new();
    let mut slugs = Vec::new();
    for (idx, name) in names.into_iter().enumerate() {
        let mut base = slugify(name);
        if base.is_empty() {
            base = "unnamed".to_string();
        }
        let mut slug = base.clone();
        let mut suffix = 1;
        while used.contains_key(&slug) {
            suffix += 1;
            slug = format!("{}-{}", base, suffix);
        }
        used.insert(slug.clone(), idx);
        slugs.push(slug);
    }
    slugs
}

/// Remove a generated directory left over from an earlier run
fn clear_dir(dir: &Path) -> Result<(), DataError> {
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(|source| DataError::Write {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

/// Write every table of a backtest run under `out_dir`
///
/// Tables are built from completed sweeps only; any failed write aborts.
pub fn write_outputs(
    out_dir: &Path,
    sweep: &SweepReport,
    leagues: &[(String, SweepReport)],
) -> Result<WrittenOutputs, DataError> {
    let mut outputs = WrittenOutputs::default();

    let scenario_dir = out_dir.join("scenarios");
    let league_dir = out_dir.join("leagues");
    clear_dir(&scenario_dir)?;
    clear_dir(&league_dir)?;

    for report in &sweep.reports {
        let path = scenario_dir.join(format!("{}.csv", report.scenario.id));
        scenario_table(report).write(&path)?;
        outputs.scenario_files.push(path);
    }

    let summary_path = out_dir.join("summary.csv");
    summary_table(&sweep.rows()).write(&summary_path)?;
    outputs.summary_file = summary_path;

    let slugs = league_slugs(leagues.iter().map(|(name, _)| name.as_str()));
    for ((_, report), slug) in leagues.iter().zip(slugs) {
        let path = league_dir.join(slug).join("summary.csv");
        summary_table(&report.rows()).write(&path)?;
        outputs.league_files.push(path);
    }

    info!(
        "Wrote {} files under {:?}",
        outputs.file_count(),
        out_dir
    );
    Ok(outputs)
}

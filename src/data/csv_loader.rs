//! CSV loading for the historical match log

use polars::prelude::*;
use std::path::Path;
use tracing::info;

use crate::error::DataError;
use crate::models::MatchRecord;

/// Columns every match log must carry
const REQUIRED_COLUMNS: [&str; 7] = [
    "team1",
    "team2",
    "team1_heroes",
    "team2_heroes",
    "team1_odds",
    "team2_odds",
    "winner",
];

/// Accepted names for the league column, first match wins
const LEAGUE_COLUMNS: [&str; 2] = ["league", "tournament"];

/// Historical match log in file order
#[derive(Debug, Clone, Default)]
pub struct MatchLog {
    records: Vec<MatchRecord>,
}

impl MatchLog {
    /// Load the match log from CSV
    ///
    /// Every column is read as text; odds are parsed afterwards so a single
    /// malformed value only affects its own row.
    pub fn load<P: AsRef<Path>>(csv_path: P) -> Result<Self, DataError> {
        let csv_path = csv_path.as_ref();
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(csv_path.to_path_buf()))?
            .finish()?;

        let records = Self::dataframe_to_records(&df)?;
        info!("Loaded {} match rows from {:?}", records.len(), csv_path);

        Ok(Self { records })
    }

    fn dataframe_to_records(df: &DataFrame) -> Result<Vec<MatchRecord>, DataError> {
        let names = df.get_column_names_str();
        for required in REQUIRED_COLUMNS {
            if !names.contains(&required) {
                return Err(DataError::MissingColumn(required.to_string()));
            }
        }

        let team1_col = df.column("team1")?.str()?;
        let team2_col = df.column("team2")?.str()?;
        let heroes1_col = df.column("team1_heroes")?.str()?;
        let heroes2_col = df.column("team2_heroes")?.str()?;
        let odds1_col = df.column("team1_odds")?.str()?;
        let odds2_col = df.column("team2_odds")?.str()?;
        let winner_col = df.column("winner")?.str()?;
        let league_col = match LEAGUE_COLUMNS.iter().find(|c| names.contains(*c)) {
            Some(name) => Some(df.column(name)?.str()?),
            None => None,
        };

        let mut records = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            records.push(MatchRecord {
                team1: team1_col.get(i).unwrap_or("").to_string(),
                team2: team2_col.get(i).unwrap_or("").to_string(),
                team1_heroes: heroes1_col.get(i).unwrap_or("").to_string(),
                team2_heroes: heroes2_col.get(i).unwrap_or("").to_string(),
                team1_odds: parse_odds(odds1_col.get(i)),
                team2_odds: parse_odds(odds2_col.get(i)),
                winner: winner_col.get(i).unwrap_or("").to_string(),
                league: league_col
                    .and_then(|c| c.get(i))
                    .unwrap_or("")
                    .trim()
                    .to_string(),
            });
        }

        Ok(records)
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Decimal odds, `None` for empty or non-numeric cells
pub fn parse_odds(value: Option<&str>) -> Option<f64> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

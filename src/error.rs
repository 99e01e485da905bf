use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a run
///
/// Bad individual match rows are never reported here; the dataset builder
/// drops them. These are structural failures of the inputs or outputs.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] polars::prelude::PolarsError),

    #[error("Missing column '{0}' in match log")]
    MissingColumn(String),

    #[error("Invalid hero data: {0}")]
    InvalidHeroData(String),
}

/// Hero win rate array must line up with the roster
pub fn validate_win_rate_count(heroes: usize, win_rates: usize) -> Result<(), DataError> {
    if heroes != win_rates {
        return Err(DataError::InvalidHeroData(format!(
            "{} heroes but {} win rates",
            heroes, win_rates
        )));
    }
    Ok(())
}

/// Matrix coordinates must point into the roster
pub fn validate_matrix_index(row: usize, col: usize, heroes: usize) -> Result<(), DataError> {
    if row >= heroes || col >= heroes {
        return Err(DataError::InvalidHeroData(format!(
            "matrix cell ({}, {}) outside roster of {} heroes",
            row, col, heroes
        )));
    }
    Ok(())
}

/// Side-channel metric arrays must be parallel to the roster
pub fn validate_metric_array(name: &str, len: usize, heroes: usize) -> Result<(), DataError> {
    if len != heroes {
        return Err(DataError::InvalidHeroData(format!(
            "metric array '{}' has {} values for {} heroes",
            name, len, heroes
        )));
    }
    Ok(())
}

//! Counterpick - hero matchup betting backtester
//!
//! This library provides:
//! - Hero data and match log loading
//! - Per-match counter-pick signals derived from the matchup matrix
//! - Staking strategies (flat, percentage, Fibonacci) replayed over history
//! - Threshold sweeps across scenario grids with CSV summaries
//!
//! # Example
//!
//! ```no_run
//! use counterpick::backtesting::{generate_scenarios, run_sweep, ScenarioGrid, SweepConfig};
//! use counterpick::data::{load_hero_data, DatasetBuilder, DatasetOptions, MatchLog};
//!
//! let heroes = load_hero_data("cs.json").unwrap();
//! let log = MatchLog::load("matches.csv").unwrap();
//! let dataset = DatasetBuilder::new(&heroes, DatasetOptions::default()).build(log.records());
//!
//! let scenarios = generate_scenarios(ScenarioGrid::Standard, true);
//! let sweep = run_sweep(&dataset.matches, &scenarios, &SweepConfig::default(), |_| {});
//! println!("{} summary rows", sweep.rows().len());
//! ```

pub mod backtesting;
pub mod core;
pub mod data;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use error::DataError;
pub use models::{DerivedMatch, HeroData, MatchRecord, MatchupEntry, MatchupMatrix, Side};

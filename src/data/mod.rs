//! Data loading and feature engineering modules

pub mod csv_loader;
pub mod features;
pub mod hero_loader;

// Re-export commonly used types
pub use csv_loader::{parse_odds, MatchLog};
pub use features::{Dataset, DatasetBuilder, DatasetOptions, DatasetStats, Metric};
pub use hero_loader::{load_hero_data, parse_hero_data};

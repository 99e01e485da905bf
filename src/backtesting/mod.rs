//! Backtesting engine: scenarios, staking replay, threshold sweep and reports

pub mod metrics;
pub mod report;
pub mod scenario;
pub mod simulator;
pub mod sweep;

pub use metrics::{analyze_by_group, calculate_metrics, BetMetrics, GroupAnalysis, SummaryRow};
pub use report::{write_outputs, CsvTable, WrittenOutputs};
pub use scenario::{generate_scenarios, HeroFilter, OddsFilter, Scenario, ScenarioFilters, ScenarioGrid};
pub use simulator::{replay, BankrollFloor, BetRecord, EngineConfig, SimulationResult};
pub use sweep::{run_league_sweeps, run_sweep, ScenarioReport, SweepConfig, SweepReport};

//! Threshold Sweep
//!
//! Run every scenario × metric × threshold through the staking engine.
//! Scenarios are independent and may run on a rayon pool; results are
//! collected in scenario order either way.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::metrics::SummaryRow;
use super::scenario::Scenario;
use super::simulator::{replay, EngineConfig, SimulationResult};
use crate::data::{Dataset, Metric};
use crate::models::DerivedMatch;

/// Sweep configuration
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Metrics to sweep, each over its own threshold list
    pub metrics: Vec<Metric>,
    /// Distribute scenarios over a worker pool
    pub parallel: bool,
    /// Worker count, rayon's default when unset
    pub threads: Option<usize>,
    pub engine: EngineConfig,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            metrics: vec![Metric::WrDelta],
            parallel: true,
            threads: None,
            engine: EngineConfig::default(),
        }
    }
}

/// All replays of one scenario, metric-major then ascending threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub scenario: Scenario,
    pub results: Vec<SimulationResult>,
}

/// Output of a full sweep over one match sequence
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepReport {
    pub reports: Vec<ScenarioReport>,
}

impl SweepReport {
    /// Flatten into summary rows, scenario order preserved
    pub fn rows(&self) -> Vec<SummaryRow> {
        self.reports
            .iter()
            .flat_map(|report| {
                report
                    .results
                    .iter()
                    .map(move |r| SummaryRow::new(&report.scenario, r.clone()))
            })
            .collect()
    }

    pub fn replay_count(&self) -> usize {
        self.reports.iter().map(|r| r.results.len()).sum()
    }
}

/// Sweep one scenario over every configured metric and threshold
pub fn sweep_scenario(
    matches: &[DerivedMatch],
    scenario: &Scenario,
    config: &SweepConfig,
) -> ScenarioReport {
    let mut results = Vec::new();
    for &metric in &config.metrics {
        for &threshold in metric.thresholds() {
            results.push(replay(matches, scenario, metric, threshold, &config.engine));
        }
    }
    debug!("{}: {} replays", scenario.id, results.len());

    ScenarioReport {
        scenario: scenario.clone(),
        results,
    }
}

/// Sweep every scenario, calling `on_done` as each one finishes
pub fn run_sweep<F>(
    matches: &[DerivedMatch],
    scenarios: &[Scenario],
    config: &SweepConfig,
    on_done: F,
) -> SweepReport
where
    F: Fn(&Scenario) + Sync,
{
    let run = |scenario: &Scenario| {
        let report = sweep_scenario(matches, scenario, config);
        on_done(scenario);
        report
    };

    let reports: Vec<ScenarioReport> = if config.parallel {
        with_sweep_pool(config.threads, || scenarios.par_iter().map(run).collect())
    } else {
        scenarios.iter().map(run).collect()
    };

    SweepReport { reports }
}

/// Sweep each league's subset of the dataset separately, leagues sorted
pub fn run_league_sweeps(
    dataset: &Dataset,
    scenarios: &[Scenario],
    config: &SweepConfig,
) -> Vec<(String, SweepReport)> {
    let leagues = dataset.leagues();
    if leagues.is_empty() {
        warn!("No league names in the match log, skipping per-league summaries");
    }

    leagues
        .into_iter()
        .map(|league| {
            let subset = dataset.league_subset(&league);
            info!("League '{}': {} matches", league, subset.len());
            let report = run_sweep(&subset, scenarios, config, |_| {});
            (league, report)
        })
        .collect()
}

fn with_sweep_pool<T>(threads: Option<usize>, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    let Some(threads) = threads else {
        return action();
    };
    match rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()
    {
        Ok(pool) => pool.install(action),
        Err(err) => {
            warn!("Failed to build a {}-thread pool ({}), using the global pool", threads, err);
            action()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backtesting::scenario::{odds_cap_scenarios, standard_scenarios};
    use crate::data::features::tests::{countering_hero_data, record};
    use crate::data::{DatasetBuilder, DatasetOptions};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn dataset() -> Dataset {
        let heroes = countering_hero_data();
        let mut other = record(2.4, 1.6, "Alpha");
        other.league = "Autumn Open".to_string();
        DatasetBuilder::new(&heroes, DatasetOptions::default()).build(&[
            record(1.8, 2.2, "Alpha"),
            record(1.7, 2.3, "Beta"),
            other,
            record(1.5, 2.6, "Alpha"),
        ])
    }

    fn fingerprint(report: &SweepReport) -> Vec<(String, usize, u64)> {
        report
            .rows()
            .iter()
            .map(|r| {
                (
                    r.scenario.clone(),
                    r.result.bets,
                    r.result.final_bankroll.to_bits(),
                )
            })
            .collect()
    }

    #[test]
    fn test_sweep_config_default() {
        let config = SweepConfig::default();
        assert_eq!(config.metrics, vec![Metric::WrDelta]);
        assert!(config.parallel);
    }

    #[test]
    fn test_rows_per_scenario() {
        let data = dataset();
        let scenarios = standard_scenarios(true);
        let report = run_sweep(&data.matches, &scenarios, &SweepConfig::default(), |_| {});

        assert_eq!(report.reports.len(), scenarios.len());
        let thresholds = Metric::WrDelta.thresholds().len();
        assert_eq!(report.replay_count(), scenarios.len() * thresholds);

        let first = &report.reports[0];
        assert_eq!(first.scenario.id, scenarios[0].id);
        let listed: Vec<f64> = first.results.iter().map(|r| r.threshold).collect();
        assert_eq!(listed, Metric::WrDelta.thresholds());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let data = dataset();
        let scenarios = odds_cap_scenarios();
        let parallel = SweepConfig {
            threads: Some(4),
            ..Default::default()
        };
        let sequential = SweepConfig {
            parallel: false,
            ..Default::default()
        };

        let a = run_sweep(&data.matches, &scenarios, &parallel, |_| {});
        let b = run_sweep(&data.matches, &scenarios, &sequential, |_| {});
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn test_progress_callback() {
        let data = dataset();
        let scenarios = standard_scenarios(false);
        let done = AtomicUsize::new(0);
        run_sweep(&data.matches, &scenarios, &SweepConfig::default(), |_| {
            done.fetch_add(1, Ordering::Relaxed);
        });
        assert_eq!(done.load(Ordering::Relaxed), scenarios.len());
    }

    #[test]
    fn test_multiple_metrics() {
        let data = dataset();
        let scenarios = standard_scenarios(false);
        let config = SweepConfig {
            metrics: vec![Metric::WrDelta, Metric::AdvDelta],
            parallel: false,
            ..Default::default()
        };
        let report = run_sweep(&data.matches, &scenarios[..1], &config, |_| {});
        let results = &report.reports[0].results;

        let expected = Metric::WrDelta.thresholds().len() + Metric::AdvDelta.thresholds().len();
        assert_eq!(results.len(), expected);
        assert_eq!(results[0].metric, Metric::WrDelta);
        assert_eq!(results.last().map(|r| r.metric), Some(Metric::AdvDelta));
    }

    #[test]
    fn test_league_sweeps() {
        let data = dataset();
        let scenarios = standard_scenarios(false);
        let config = SweepConfig {
            parallel: false,
            ..Default::default()
        };
        let leagues = run_league_sweeps(&data, &scenarios, &config);

        let names: Vec<&str> = leagues.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(names, vec!["Autumn Open", "Spring Cup"]);

        // Flat100, any odds, lowest threshold: every Spring Cup match clears 50
        let spring = &leagues[1].1.reports[0].results[0];
        assert_eq!(spring.bets, 3);
        let autumn = &leagues[0].1.reports[0].results[0];
        assert_eq!(autumn.bets, 1);
    }
}

//! Backtest Metrics
//!
//! Summary rows for the sweep output, bet-level metrics for a single replay,
//! and per-dimension breakdowns for console display.

use super::scenario::Scenario;
use super::simulator::{BetRecord, SimulationResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bet-level metrics of one replay
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BetMetrics {
    pub total_bets: usize,
    pub winning_bets: usize,
    pub hit_rate: f64,
    pub roi: f64,

    pub avg_odds: f64,
    pub avg_stake: f64,

    pub profit_factor: f64,
    pub longest_losing_streak: usize,

    pub gross_profit: f64,
    pub gross_loss: f64,
    pub net_profit: f64,
}

/// Calculate metrics from bet records
pub fn calculate_metrics(bets: &[BetRecord], total_staked: f64) -> BetMetrics {
    if bets.is_empty() {
        return BetMetrics::default();
    }

    let total_bets = bets.len();
    let winning_bets = bets.iter().filter(|b| b.won).count();
    let hit_rate = winning_bets as f64 / total_bets as f64;

    let avg_odds = bets.iter().map(|b| b.odds).sum::<f64>() / total_bets as f64;
    let avg_stake = bets.iter().map(|b| b.stake).sum::<f64>() / total_bets as f64;

    let gross_profit: f64 = bets.iter().map(|b| b.profit).filter(|&p| p > 0.0).sum();
    let gross_loss: f64 = bets
        .iter()
        .map(|b| b.profit)
        .filter(|&p| p < 0.0)
        .map(f64::abs)
        .sum();
    let net_profit = gross_profit - gross_loss;

    let profit_factor = if gross_loss > 0.0 {
        gross_profit / gross_loss
    } else if gross_profit > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };

    let mut longest_losing_streak = 0;
    let mut streak = 0;
    for bet in bets {
        if bet.won {
            streak = 0;
        } else {
            streak += 1;
            longest_losing_streak = longest_losing_streak.max(streak);
        }
    }

    let roi = if total_staked > 0.0 {
        net_profit / total_staked
    } else {
        0.0
    };

    BetMetrics {
        total_bets,
        winning_bets,
        hit_rate,
        roi,
        avg_odds,
        avg_stake,
        profit_factor,
        longest_losing_streak,
        gross_profit,
        gross_loss,
        net_profit,
    }
}

/// One row of the combined summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRow {
    pub scenario: String,
    pub strategy_group: String,
    pub hero_filter: String,
    pub odds_condition: String,
    pub result: SimulationResult,
}

impl SummaryRow {
    pub fn new(scenario: &Scenario, result: SimulationResult) -> Self {
        Self {
            scenario: scenario.id.clone(),
            strategy_group: scenario.strategy_group(),
            hero_filter: scenario.hero_filter_label(),
            odds_condition: scenario.odds_condition_label(),
            result,
        }
    }

    pub fn is_profitable(&self) -> bool {
        self.result.profit() > 0.0
    }
}

/// Rows ranked by ROI, best first; rows without bets are left out
pub fn top_by_roi(rows: &[SummaryRow], limit: usize) -> Vec<&SummaryRow> {
    let mut ranked: Vec<&SummaryRow> = rows.iter().filter(|r| r.result.bets > 0).collect();
    ranked.sort_by(|a, b| b.result.roi().total_cmp(&a.result.roi()));
    ranked.truncate(limit);
    ranked
}

/// Breakdown of summary rows by one label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupAnalysis {
    pub key: String,
    pub rows: usize,
    pub profitable_rows: usize,
    pub bets: usize,
    pub best_roi: f64,
    pub best_profit: f64,
}

/// Analyze summary rows by strategy group
pub fn analyze_by_group(rows: &[SummaryRow]) -> Vec<GroupAnalysis> {
    analyze_by(rows, |r| r.strategy_group.as_str())
}

/// Analyze summary rows by odds condition
pub fn analyze_by_odds_condition(rows: &[SummaryRow]) -> Vec<GroupAnalysis> {
    analyze_by(rows, |r| r.odds_condition.as_str())
}

fn analyze_by<'a, F>(rows: &'a [SummaryRow], key: F) -> Vec<GroupAnalysis>
where
    F: Fn(&'a SummaryRow) -> &'a str,
{
    let mut grouped: BTreeMap<&str, Vec<&SummaryRow>> = BTreeMap::new();
    for row in rows {
        grouped.entry(key(row)).or_default().push(row);
    }

    grouped
        .into_iter()
        .map(|(key, group)| {
            let with_bets: Vec<&&SummaryRow> = group.iter().filter(|r| r.result.bets > 0).collect();

            GroupAnalysis {
                key: key.to_string(),
                rows: group.len(),
                profitable_rows: group.iter().filter(|r| r.is_profitable()).count(),
                bets: group.iter().map(|r| r.result.bets).sum(),
                best_roi: with_bets
                    .iter()
                    .map(|r| r.result.roi())
                    .fold(None, |best: Option<f64>, v| Some(best.map_or(v, |b| b.max(v))))
                    .unwrap_or(0.0),
                best_profit: with_bets
                    .iter()
                    .map(|r| r.result.profit())
                    .fold(None, |best: Option<f64>, v| Some(best.map_or(v, |b| b.max(v))))
                    .unwrap_or(0.0),
            }
        })
        .collect()
}

/// Analyze settled bets by odds range
pub fn analyze_bets_by_odds_range(bets: &[BetRecord]) -> Vec<(String, BetMetrics)> {
    let mut grouped: BTreeMap<&str, Vec<BetRecord>> = BTreeMap::new();
    for bet in bets {
        let key = if bet.odds < 1.5 {
            "low (<1.5)"
        } else if bet.odds < 2.5 {
            "mid (1.5-2.5)"
        } else {
            "high (>=2.5)"
        };
        grouped.entry(key).or_default().push(bet.clone());
    }

    grouped
        .into_iter()
        .map(|(key, group)| {
            let staked: f64 = group.iter().map(|b| b.stake).sum();
            (key.to_string(), calculate_metrics(&group, staked))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backtesting::scenario::{standard_scenarios, ScenarioFilters};
    use crate::core::staking::StakingStrategy;
    use crate::data::Metric;
    use crate::models::{OddsLabel, Side};

    fn bet(odds: f64, stake: f64, won: bool) -> BetRecord {
        BetRecord {
            match_index: 0,
            team: "Alpha".to_string(),
            side: Side::Team1,
            label: OddsLabel::Favorite,
            delta: 60.0,
            odds,
            stake,
            won,
            profit: if won { stake * (odds - 1.0) } else { -stake },
            bankroll_after: 0.0,
        }
    }

    fn result(bets: usize, wins: usize, final_bankroll: f64, staked: f64) -> SimulationResult {
        SimulationResult {
            metric: Metric::WrDelta,
            threshold: 50.0,
            bets,
            wins,
            losses: bets - wins,
            initial_bankroll: 1000.0,
            final_bankroll,
            total_staked: staked,
            max_stake: 100.0,
            max_drawdown: 0.0,
            halted: false,
            bet_log: Vec::new(),
        }
    }

    #[test]
    fn test_calculate_metrics() {
        let bets = vec![
            bet(2.0, 100.0, true),
            bet(1.5, 100.0, false),
            bet(1.8, 100.0, false),
            bet(3.0, 100.0, true),
        ];
        let metrics = calculate_metrics(&bets, 400.0);

        assert_eq!(metrics.total_bets, 4);
        assert_eq!(metrics.winning_bets, 2);
        assert!((metrics.hit_rate - 0.5).abs() < 1e-9);
        assert!((metrics.gross_profit - 300.0).abs() < 1e-9);
        assert!((metrics.gross_loss - 200.0).abs() < 1e-9);
        assert!((metrics.net_profit - 100.0).abs() < 1e-9);
        assert!((metrics.roi - 0.25).abs() < 1e-9);
        assert!((metrics.profit_factor - 1.5).abs() < 1e-9);
        assert_eq!(metrics.longest_losing_streak, 2);
    }

    #[test]
    fn test_calculate_metrics_empty() {
        let metrics = calculate_metrics(&[], 0.0);
        assert_eq!(metrics.total_bets, 0);
        assert_eq!(metrics.hit_rate, 0.0);
        assert_eq!(metrics.roi, 0.0);
    }

    #[test]
    fn test_profit_factor_without_losses() {
        let metrics = calculate_metrics(&[bet(2.0, 50.0, true)], 50.0);
        assert!(metrics.profit_factor.is_infinite());
    }

    #[test]
    fn test_result_ratios() {
        let r = result(4, 3, 1200.0, 400.0);
        assert!((r.profit() - 200.0).abs() < 1e-9);
        assert!((r.roi() - 0.5).abs() < 1e-9);
        assert!((r.win_pct() - 75.0).abs() < 1e-9);

        let empty = result(0, 0, 1000.0, 0.0);
        assert_eq!(empty.roi(), 0.0);
        assert_eq!(empty.win_pct(), 0.0);
    }

    #[test]
    fn test_summary_row_labels() {
        let scenario = Scenario::new(
            7,
            StakingStrategy::BankrollPct { pct: 0.3 },
            ScenarioFilters {
                max_odds: Some(1.6),
                ..Default::default()
            },
        );
        let row = SummaryRow::new(&scenario, result(2, 1, 1010.0, 200.0));
        assert_eq!(row.scenario, scenario.id);
        assert_eq!(row.strategy_group, "Pct30");
        assert_eq!(row.hero_filter, "none");
        assert_eq!(row.odds_condition, "<1.6");
        assert!(row.is_profitable());
    }

    #[test]
    fn test_analyze_by_group() {
        let scenarios = standard_scenarios(false);
        let rows = vec![
            SummaryRow::new(&scenarios[0], result(4, 3, 1200.0, 400.0)),
            SummaryRow::new(&scenarios[1], result(4, 1, 900.0, 400.0)),
            SummaryRow::new(&scenarios[1], result(0, 0, 1000.0, 0.0)),
            SummaryRow::new(&scenarios[14], result(2, 0, 800.0, 200.0)),
        ];
        let analysis = analyze_by_group(&rows);

        assert_eq!(analysis.len(), 2);
        let flat = analysis.iter().find(|a| a.key == "Flat100").unwrap();
        assert_eq!(flat.rows, 3);
        assert_eq!(flat.profitable_rows, 1);
        assert_eq!(flat.bets, 8);
        assert!((flat.best_roi - 0.5).abs() < 1e-9);
        assert!((flat.best_profit - 200.0).abs() < 1e-9);

        let fib = analysis.iter().find(|a| a.key == "Fib25").unwrap();
        assert_eq!(fib.profitable_rows, 0);
        assert!((fib.best_roi + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_analyze_by_odds_condition() {
        let scenarios = standard_scenarios(false);
        let rows: Vec<SummaryRow> = scenarios
            .iter()
            .map(|s| SummaryRow::new(s, result(1, 1, 1080.0, 100.0)))
            .collect();
        let analysis = analyze_by_odds_condition(&rows);
        let keys: Vec<&str> = analysis.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, vec!["any", "favorite", "underdog"]);
        assert!(analysis.iter().all(|a| a.rows == 5));
    }

    #[test]
    fn test_top_by_roi() {
        let scenarios = standard_scenarios(false);
        let rows = vec![
            SummaryRow::new(&scenarios[0], result(4, 1, 900.0, 400.0)),
            SummaryRow::new(&scenarios[1], result(0, 0, 1000.0, 0.0)),
            SummaryRow::new(&scenarios[2], result(4, 3, 1200.0, 400.0)),
        ];
        let top = top_by_roi(&rows, 5);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].scenario, scenarios[2].id);
    }

    #[test]
    fn test_analyze_bets_by_odds_range() {
        let bets = vec![bet(1.3, 100.0, true), bet(1.8, 100.0, false), bet(2.0, 100.0, true)];
        let analysis = analyze_bets_by_odds_range(&bets);

        assert_eq!(analysis.len(), 2);
        let (key, mid) = &analysis[1];
        assert_eq!(key, "mid (1.5-2.5)");
        assert_eq!(mid.total_bets, 2);
        assert_eq!(mid.winning_bets, 1);
    }
}

//! Staking Engine
//!
//! Replay one scenario over the ordered dataset at a single metric threshold.
//! The replay is sequential and path dependent: every stake depends on the
//! bankroll and Fibonacci step left by the bets before it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::metrics::{calculate_metrics, BetMetrics};
use super::scenario::{HeroFilter, OddsFilter, Scenario};
use crate::core::staking::FibonacciProgression;
use crate::data::Metric;
use crate::models::{DerivedMatch, OddsLabel, Side};

/// Starting bankroll of every replay
pub const START_BANKROLL: f64 = 1000.0;
/// Upper clamp on a single stake
pub const MAX_BET: f64 = 10_000.0;

/// What happens when a loss takes the bankroll to zero or below
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BankrollFloor {
    /// Clamp to zero and stop betting for the rest of the replay
    HaltAtZero,
    /// Let the bankroll go negative and keep replaying
    Unbounded,
}

/// Staking engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub initial_bankroll: f64,
    pub max_bet: f64,
    pub floor: BankrollFloor,
    /// Also skip matches where the side not bet on has no odds
    pub require_both_odds: bool,
    /// Keep every settled bet on the result
    pub record_bets: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_bankroll: START_BANKROLL,
            max_bet: MAX_BET,
            floor: BankrollFloor::HaltAtZero,
            require_both_odds: false,
            record_bets: false,
        }
    }
}

/// Individual settled bet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetRecord {
    /// Position of the match in the replayed sequence
    pub match_index: usize,
    pub team: String,
    pub side: Side,
    pub label: OddsLabel,
    pub delta: f64,
    pub odds: f64,
    pub stake: f64,
    pub won: bool,
    pub profit: f64,
    pub bankroll_after: f64,
}

/// Outcome of one (scenario, metric, threshold) replay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub metric: Metric,
    pub threshold: f64,
    pub bets: usize,
    pub wins: usize,
    pub losses: usize,
    pub initial_bankroll: f64,
    pub final_bankroll: f64,
    pub total_staked: f64,
    pub max_stake: f64,
    pub max_drawdown: f64,
    /// Bankroll hit the floor and betting stopped
    pub halted: bool,
    /// Settled bets, only kept when `EngineConfig::record_bets` is set
    pub bet_log: Vec<BetRecord>,
}

impl SimulationResult {
    pub fn profit(&self) -> f64 {
        self.final_bankroll - self.initial_bankroll
    }

    pub fn roi(&self) -> f64 {
        if self.total_staked == 0.0 {
            0.0
        } else {
            self.profit() / self.total_staked
        }
    }

    /// Win percentage in 0..=100
    pub fn win_pct(&self) -> f64 {
        if self.bets == 0 {
            0.0
        } else {
            self.wins as f64 / self.bets as f64 * 100.0
        }
    }

    /// Bet-level metrics, empty unless the bet log was kept
    pub fn bet_metrics(&self) -> BetMetrics {
        calculate_metrics(&self.bet_log, self.total_staked)
    }
}

/// Mutable state owned by a single replay
struct ReplayState {
    bankroll: f64,
    peak: f64,
    max_drawdown: f64,
    bets: usize,
    wins: usize,
    losses: usize,
    total_staked: f64,
    max_stake: f64,
    fib: FibonacciProgression,
    halted: bool,
    bet_log: Vec<BetRecord>,
}

impl ReplayState {
    fn new(initial_bankroll: f64) -> Self {
        Self {
            bankroll: initial_bankroll,
            peak: initial_bankroll,
            max_drawdown: 0.0,
            bets: 0,
            wins: 0,
            losses: 0,
            total_staked: 0.0,
            max_stake: 0.0,
            fib: FibonacciProgression::new(),
            halted: false,
            bet_log: Vec::new(),
        }
    }
}

/// Side the signal points at: positive delta favors team1
pub fn predicted_side(delta: f64) -> Option<Side> {
    if delta > 0.0 {
        Some(Side::Team1)
    } else if delta < 0.0 {
        Some(Side::Team2)
    } else {
        None
    }
}

/// Does the predicted side's bookmaker label satisfy the filter
pub fn odds_filter_allows(filter: OddsFilter, label: OddsLabel) -> bool {
    match filter {
        OddsFilter::Any => true,
        OddsFilter::Underdog => label == OddsLabel::Underdog,
        OddsFilter::Favorite => label == OddsLabel::Favorite,
    }
}

/// Hero-count filter on the predicted side and its opponent
pub fn hero_filter_allows(filter: HeroFilter, m: &DerivedMatch, side: Side) -> bool {
    match filter {
        HeroFilter::None => true,
        HeroFilter::AtLeast(n) => {
            m.team(side).positive_slots() >= n && m.team(side.opponent()).negative_slots() >= n
        }
    }
}

/// Replay `scenario` over `matches` at one metric threshold
pub fn replay(
    matches: &[DerivedMatch],
    scenario: &Scenario,
    metric: Metric,
    threshold: f64,
    config: &EngineConfig,
) -> SimulationResult {
    let mut state = ReplayState::new(config.initial_bankroll);
    let filters = &scenario.filters;

    for (index, m) in matches.iter().enumerate() {
        if state.halted {
            break;
        }

        let Some(winner) = m.winner else { continue };

        let Some(delta) = m.metric(metric.label()) else { continue };
        if delta == 0.0 || delta.abs() < threshold {
            continue;
        }
        let Some(side) = predicted_side(delta) else { continue };

        let Some(odds) = m.odds(side) else { continue };
        if config.require_both_odds && m.odds(side.opponent()).is_none() {
            continue;
        }

        let team = m.team(side);
        if !odds_filter_allows(filters.odds, team.label) {
            continue;
        }
        if filters.max_odds.is_some_and(|cap| odds >= cap) {
            continue;
        }
        if !hero_filter_allows(filters.hero, m, side) {
            continue;
        }

        let stake = scenario
            .strategy
            .stake(config.initial_bankroll, state.bankroll, &mut state.fib);
        if !stake.is_finite() || stake <= 0.0 {
            continue;
        }
        let stake = stake.min(config.max_bet);

        state.bets += 1;
        state.total_staked += stake;
        state.max_stake = state.max_stake.max(stake);

        let won = winner == side;
        let profit = if won {
            state.wins += 1;
            stake * (odds - 1.0)
        } else {
            state.losses += 1;
            -stake
        };
        state.bankroll += profit;

        if config.floor == BankrollFloor::HaltAtZero && state.bankroll <= 0.0 {
            debug!(
                "{} @ {} {}: bankroll exhausted at match {}",
                scenario.id, metric, threshold, index
            );
            state.bankroll = 0.0;
            state.halted = true;
        }

        state.peak = state.peak.max(state.bankroll);
        state.max_drawdown = state.max_drawdown.max(state.peak - state.bankroll);

        if won {
            state.fib.record_win();
        } else {
            state.fib.record_loss();
        }

        if config.record_bets {
            state.bet_log.push(BetRecord {
                match_index: index,
                team: team.name.clone(),
                side,
                label: team.label,
                delta,
                odds,
                stake,
                won,
                profit,
                bankroll_after: state.bankroll,
            });
        }
    }

    SimulationResult {
        metric,
        threshold,
        bets: state.bets,
        wins: state.wins,
        losses: state.losses,
        initial_bankroll: config.initial_bankroll,
        final_bankroll: state.bankroll,
        total_staked: state.total_staked,
        max_stake: state.max_stake,
        max_drawdown: state.max_drawdown,
        halted: state.halted,
        bet_log: state.bet_log,
    }
}

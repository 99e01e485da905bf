//! Stake Sizing
//!
//! Staking rules supported by the backtester:
//!
//! - `flat`: constant amount per bet
//! - `flat_pct_initial`: fixed share of the *initial* bankroll
//! - `bankroll_pct`: share of the *current* bankroll at decision time
//! - `fibonacci`: unit × F(step), where the step climbs one on a loss and
//!   falls two on a win (floored at zero)

use serde::{Deserialize, Serialize};

/// Staking strategy descriptor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StakingStrategy {
    Flat { amount: f64 },
    FlatPctInitial { pct: f64 },
    BankrollPct { pct: f64 },
    Fibonacci { unit: f64 },
}

impl StakingStrategy {
    pub fn kind(&self) -> &'static str {
        match self {
            StakingStrategy::Flat { .. } => "flat",
            StakingStrategy::FlatPctInitial { .. } => "flat_pct_initial",
            StakingStrategy::BankrollPct { .. } => "bankroll_pct",
            StakingStrategy::Fibonacci { .. } => "fibonacci",
        }
    }

    /// Short group label used in reports, e.g. `Flat100`, `Pct5`, `Fib10`
    pub fn group_label(&self) -> String {
        match self {
            StakingStrategy::Flat { amount } => format!("Flat{}", fmt_amount(*amount)),
            StakingStrategy::FlatPctInitial { pct } => format!("FlatPct{}", fmt_pct(*pct)),
            StakingStrategy::BankrollPct { pct } => format!("Pct{}", fmt_pct(*pct)),
            StakingStrategy::Fibonacci { unit } => format!("Fib{}", fmt_amount(*unit)),
        }
    }

    /// Stake for the next bet
    ///
    /// # Arguments
    /// * `initial_bankroll` - Bankroll the replay started with
    /// * `bankroll` - Current bankroll
    /// * `fib` - Fibonacci memo and step of the running replay
    ///
    /// May return zero or a negative value; callers skip such bets.
    pub fn stake(&self, initial_bankroll: f64, bankroll: f64, fib: &mut FibonacciProgression) -> f64 {
        match *self {
            StakingStrategy::Flat { amount } => amount,
            StakingStrategy::FlatPctInitial { pct } => initial_bankroll * pct,
            StakingStrategy::BankrollPct { pct } => bankroll * pct,
            StakingStrategy::Fibonacci { unit } => unit * fib.current(),
        }
    }
}

fn fmt_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{}", amount as i64)
    } else {
        format!("{}", amount)
    }
}

fn fmt_pct(pct: f64) -> String {
    fmt_amount((pct * 1000.0).round() / 10.0)
}

/// Lazily extended Fibonacci sequence {1, 1, 2, 3, 5, ...}
#[derive(Debug, Clone)]
pub struct FibonacciSequence {
    memo: Vec<f64>,
}

impl Default for FibonacciSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl FibonacciSequence {
    pub fn new() -> Self {
        Self {
            memo: vec![1.0, 1.0],
        }
    }

    /// n-th term, zero-based
    pub fn get(&mut self, n: usize) -> f64 {
        while self.memo.len() <= n {
            let len = self.memo.len();
            self.memo.push(self.memo[len - 1] + self.memo[len - 2]);
        }
        self.memo[n]
    }

    /// Number of memoized terms
    #[cfg(test)]
    fn cached(&self) -> usize {
        self.memo.len()
    }
}

/// Fibonacci step state owned by a single replay
#[derive(Debug, Clone, Default)]
pub struct FibonacciProgression {
    sequence: FibonacciSequence,
    step: usize,
}

impl FibonacciProgression {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn step(&self) -> usize {
        self.step
    }

    /// Multiplier at the current step
    pub fn current(&mut self) -> f64 {
        self.sequence.get(self.step)
    }

    pub fn record_win(&mut self) {
        self.step = self.step.saturating_sub(2);
    }

    pub fn record_loss(&mut self) {
        self.step += 1;
    }
}

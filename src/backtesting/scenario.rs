//! Scenario Generation
//!
//! Enumerate staking strategies × filter conditions into named, immutable
//! scenarios. Enumeration is nested loops over fixed constant lists, so the
//! output is identical on every run.

use serde::{Deserialize, Serialize};

use crate::core::staking::StakingStrategy;

/// Flat stake amount
const FLAT_AMOUNT: f64 = 100.0;
/// Share of the initial bankroll staked per bet
const FLAT_PCT_INITIAL: f64 = 0.05;
/// Share of the current bankroll staked per bet
const BANKROLL_PCT: f64 = 0.05;
/// Fibonacci unit sizes
const FIBONACCI_UNITS: [f64; 2] = [10.0, 25.0];

/// Bankroll shares swept by the odds-cap grid
const ODDS_CAP_PERCENTS: [f64; 5] = [0.10, 0.20, 0.30, 0.40, 0.50];
/// Exclusive upper bounds on the predicted side's odds
const ODDS_CAPS: [f64; 8] = [1.9, 1.8, 1.7, 1.6, 1.5, 1.4, 1.3, 1.2];

/// Bookmaker-label requirement on the predicted side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OddsFilter {
    Any,
    Underdog,
    Favorite,
}

impl OddsFilter {
    pub const ALL: [OddsFilter; 3] = [OddsFilter::Any, OddsFilter::Underdog, OddsFilter::Favorite];

    pub fn as_str(self) -> &'static str {
        match self {
            OddsFilter::Any => "any",
            OddsFilter::Underdog => "underdog",
            OddsFilter::Favorite => "favorite",
        }
    }
}

/// Hero-count advantage requirement
///
/// `AtLeast(n)`: predicted side has ≥ n slots with positive advantage and the
/// opponent has ≥ n slots with negative advantage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeroFilter {
    None,
    AtLeast(usize),
}

impl HeroFilter {
    pub fn label(self) -> String {
        match self {
            HeroFilter::None => "none".to_string(),
            HeroFilter::AtLeast(n) => format!("{}+{}", n, n),
        }
    }

    /// Parse `none`, `4+4` or `5+5`
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "none" | "" => Some(HeroFilter::None),
            "4+4" => Some(HeroFilter::AtLeast(4)),
            "5+5" => Some(HeroFilter::AtLeast(5)),
            _ => None,
        }
    }

    fn id_part(self) -> String {
        match self {
            HeroFilter::None => "allheroes".to_string(),
            HeroFilter::AtLeast(n) => format!("hero{}of5", n),
        }
    }
}

/// Filters applied to the predicted side before staking
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioFilters {
    pub odds: OddsFilter,
    pub hero: HeroFilter,
    /// Bet only when the predicted odds are strictly below this cap
    pub max_odds: Option<f64>,
}

impl Default for ScenarioFilters {
    fn default() -> Self {
        Self {
            odds: OddsFilter::Any,
            hero: HeroFilter::None,
            max_odds: None,
        }
    }
}

impl ScenarioFilters {
    /// Report label, e.g. `any`, `underdog`, `<1.9`, `favorite<1.5`
    pub fn odds_condition_label(&self) -> String {
        match (self.odds, self.max_odds) {
            (odds, None) => odds.as_str().to_string(),
            (OddsFilter::Any, Some(cap)) => format!("<{}", cap),
            (odds, Some(cap)) => format!("{}<{}", odds.as_str(), cap),
        }
    }

    fn id_part(&self) -> String {
        match self.max_odds {
            None => self.odds.as_str().to_string(),
            Some(cap) if self.odds == OddsFilter::Any => format!("lt{}", cap),
            Some(cap) => format!("{}-lt{}", self.odds.as_str(), cap),
        }
    }
}

/// Named betting scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub strategy: StakingStrategy,
    pub filters: ScenarioFilters,
}

impl Scenario {
    /// Build a scenario with a sequence-numbered identifier
    pub fn new(seq: usize, strategy: StakingStrategy, filters: ScenarioFilters) -> Self {
        let id = format!(
            "{:02}_{}_{}_{}",
            seq,
            strategy.group_label().to_lowercase(),
            filters.id_part(),
            filters.hero.id_part()
        );
        Self {
            id,
            strategy,
            filters,
        }
    }

    pub fn strategy_group(&self) -> String {
        self.strategy.group_label()
    }

    pub fn hero_filter_label(&self) -> String {
        self.filters.hero.label()
    }

    pub fn odds_condition_label(&self) -> String {
        self.filters.odds_condition_label()
    }
}

/// Which family of scenarios to enumerate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioGrid {
    /// Strategies × {any, underdog, favorite} × optional hero filters
    Standard,
    /// Bankroll percentages × odds caps
    OddsCap,
}

impl ScenarioGrid {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "standard" => Some(ScenarioGrid::Standard),
            "odds-cap" | "odds_cap" => Some(ScenarioGrid::OddsCap),
            _ => None,
        }
    }
}

/// Strategies of the standard grid, in enumeration order
pub fn standard_strategies() -> Vec<StakingStrategy> {
    let mut strategies = vec![
        StakingStrategy::Flat {
            amount: FLAT_AMOUNT,
        },
        StakingStrategy::FlatPctInitial {
            pct: FLAT_PCT_INITIAL,
        },
        StakingStrategy::BankrollPct { pct: BANKROLL_PCT },
    ];
    strategies.extend(
        FIBONACCI_UNITS
            .iter()
            .map(|&unit| StakingStrategy::Fibonacci { unit }),
    );
    strategies
}

/// Enumerate the scenarios of a grid
pub fn generate_scenarios(grid: ScenarioGrid, include_hero_filters: bool) -> Vec<Scenario> {
    match grid {
        ScenarioGrid::Standard => standard_scenarios(include_hero_filters),
        ScenarioGrid::OddsCap => odds_cap_scenarios(),
    }
}

/// Standard grid: strategy, then odds filter, then hero filter
pub fn standard_scenarios(include_hero_filters: bool) -> Vec<Scenario> {
    let hero_filters: &[HeroFilter] = if include_hero_filters {
        &[HeroFilter::None, HeroFilter::AtLeast(4), HeroFilter::AtLeast(5)]
    } else {
        &[HeroFilter::None]
    };

    let mut scenarios = Vec::new();
    for strategy in standard_strategies() {
        for odds in OddsFilter::ALL {
            for &hero in hero_filters {
                let filters = ScenarioFilters {
                    odds,
                    hero,
                    max_odds: None,
                };
                scenarios.push(Scenario::new(scenarios.len() + 1, strategy, filters));
            }
        }
    }
    scenarios
}

/// Odds-cap grid: bankroll percentage, then odds cap
pub fn odds_cap_scenarios() -> Vec<Scenario> {
    let mut scenarios = Vec::new();
    for pct in ODDS_CAP_PERCENTS {
        for cap in ODDS_CAPS {
            let filters = ScenarioFilters {
                max_odds: Some(cap),
                ..Default::default()
            };
            scenarios.push(Scenario::new(
                scenarios.len() + 1,
                StakingStrategy::BankrollPct { pct },
                filters,
            ));
        }
    }
    scenarios
}

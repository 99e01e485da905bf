//! Match Feature Engineering
//!
//! Join match log rows against hero data and derive the per-match signals the
//! backtester bets on.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

use crate::models::{
    normalize_name, DerivedMatch, HeroData, MatchRecord, MatchupMatrix, OddsLabel, Side,
    TeamFeatures, ROSTER_SIZE,
};

/// Roster separator inside the hero columns of the match log
const ROSTER_DELIMITER: char = '|';

/// How a per-hero array is folded into one team value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Sum,
    Average,
}

/// Where a metric's team value comes from
#[derive(Debug, Clone, Copy, PartialEq)]
enum MetricSource {
    /// Sum of win rate + advantage per hero
    TeamScore,
    /// Sum of per-hero advantages
    Advantage,
    /// Sum of stored synergy over teammate pairs
    Synergy,
    /// Side-channel per-hero array from the hero data
    HeroArray {
        key: &'static str,
        aggregation: Aggregation,
        scale: f64,
    },
}

/// Signals a match can be bet on, each a team1-minus-team2 delta
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Metric {
    WrDelta,
    AdvDelta,
    SynergyDelta,
    Gpm,
    Xpm,
    HeroDamage,
    TowerDamage,
    DamageTaken,
    Teamfight,
    Duration,
}

impl Metric {
    pub const ALL: [Metric; 10] = [
        Metric::WrDelta,
        Metric::AdvDelta,
        Metric::SynergyDelta,
        Metric::Gpm,
        Metric::Xpm,
        Metric::HeroDamage,
        Metric::TowerDamage,
        Metric::DamageTaken,
        Metric::Teamfight,
        Metric::Duration,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Metric::WrDelta => "WR_DELTA",
            Metric::AdvDelta => "ADV_DELTA",
            Metric::SynergyDelta => "SYNERGY_DELTA",
            Metric::Gpm => "GPM_DELTA",
            Metric::Xpm => "XPM_DELTA",
            Metric::HeroDamage => "HERO_DAMAGE_DELTA",
            Metric::TowerDamage => "TOWER_DAMAGE_DELTA",
            Metric::DamageTaken => "DAMAGE_TAKEN_DELTA",
            Metric::Teamfight => "TEAMFIGHT_DELTA",
            Metric::Duration => "DURATION_DELTA",
        }
    }

    /// Parse a label, case-insensitive, with or without the `_DELTA` suffix
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim().to_uppercase();
        Metric::ALL.into_iter().find(|m| {
            let full = m.label();
            full == wanted || full.trim_end_matches("_DELTA") == wanted
        })
    }

    /// Fixed ascending sweep thresholds on this metric's scale
    pub fn thresholds(self) -> &'static [f64] {
        match self {
            Metric::WrDelta => &[50.0, 100.0, 150.0, 200.0, 250.0, 300.0, 350.0, 400.0],
            Metric::AdvDelta => &[5.0, 10.0, 15.0, 20.0, 30.0, 40.0, 50.0, 75.0],
            Metric::SynergyDelta => &[1.0, 2.0, 3.0, 5.0, 8.0, 10.0],
            Metric::Gpm | Metric::Xpm => &[100.0, 200.0, 300.0, 500.0, 750.0, 1000.0],
            Metric::HeroDamage | Metric::DamageTaken => &[2.0, 5.0, 10.0, 15.0, 20.0],
            Metric::TowerDamage => &[0.5, 1.0, 2.0, 3.0, 5.0],
            Metric::Teamfight => &[1.0, 2.0, 3.0, 5.0, 8.0],
            Metric::Duration => &[0.5, 1.0, 2.0, 3.0, 5.0],
        }
    }

    fn source(self) -> MetricSource {
        match self {
            Metric::WrDelta => MetricSource::TeamScore,
            Metric::AdvDelta => MetricSource::Advantage,
            Metric::SynergyDelta => MetricSource::Synergy,
            Metric::Gpm => MetricSource::HeroArray {
                key: "heroes_gpm",
                aggregation: Aggregation::Sum,
                scale: 1.0,
            },
            Metric::Xpm => MetricSource::HeroArray {
                key: "heroes_xpm",
                aggregation: Aggregation::Sum,
                scale: 1.0,
            },
            // Damage totals are reported in thousands
            Metric::HeroDamage => MetricSource::HeroArray {
                key: "heroes_hero_damage",
                aggregation: Aggregation::Sum,
                scale: 0.001,
            },
            Metric::TowerDamage => MetricSource::HeroArray {
                key: "heroes_tower_damage",
                aggregation: Aggregation::Sum,
                scale: 0.001,
            },
            Metric::DamageTaken => MetricSource::HeroArray {
                key: "heroes_damage_taken",
                aggregation: Aggregation::Sum,
                scale: 0.001,
            },
            // Participation is stored as a fraction, swept in percentage points
            Metric::Teamfight => MetricSource::HeroArray {
                key: "heroes_teamfight_participation",
                aggregation: Aggregation::Average,
                scale: 100.0,
            },
            Metric::Duration => MetricSource::HeroArray {
                key: "heroes_match_duration",
                aggregation: Aggregation::Average,
                scale: 1.0,
            },
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Dataset construction options
#[derive(Debug, Clone)]
pub struct DatasetOptions {
    /// Drop rows that lack odds for either side
    pub require_odds: bool,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self { require_odds: true }
    }
}

/// Row accounting for one dataset build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetStats {
    pub rows_read: usize,
    pub bad_roster_size: usize,
    pub unknown_hero: usize,
    pub missing_odds: usize,
    /// Kept rows whose winner matched neither team
    pub unknown_winner: usize,
    pub kept: usize,
}

impl DatasetStats {
    pub fn dropped(&self) -> usize {
        self.bad_roster_size + self.unknown_hero + self.missing_odds
    }
}

/// Derived matches in replay order
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub matches: Vec<DerivedMatch>,
    pub stats: DatasetStats,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Distinct non-empty league names, sorted
    pub fn leagues(&self) -> Vec<String> {
        self.matches
            .iter()
            .filter(|m| !m.league.is_empty())
            .map(|m| m.league.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Matches of one league, replay order preserved
    pub fn league_subset(&self, league: &str) -> Vec<DerivedMatch> {
        self.matches
            .iter()
            .filter(|m| m.league == league)
            .cloned()
            .collect()
    }

    /// Share of settled matches with a favorite that the favorite won
    pub fn favorite_hit_rate(&self) -> Option<f64> {
        let mut decided = 0usize;
        let mut hits = 0usize;
        for m in &self.matches {
            if let (Some(fav), Some(winner)) = (m.favorite(), m.winner) {
                decided += 1;
                if fav == winner {
                    hits += 1;
                }
            }
        }
        (decided > 0).then(|| hits as f64 / decided as f64)
    }
}

/// Builds the ordered derived-match dataset
pub struct DatasetBuilder<'a> {
    heroes: &'a HeroData,
    options: DatasetOptions,
}

impl<'a> DatasetBuilder<'a> {
    pub fn new(heroes: &'a HeroData, options: DatasetOptions) -> Self {
        Self { heroes, options }
    }

    pub fn build(&self, records: &[MatchRecord]) -> Dataset {
        let index = self.heroes.name_index();
        let mut stats = DatasetStats {
            rows_read: records.len(),
            ..Default::default()
        };
        let mut matches = Vec::with_capacity(records.len());

        for (row, record) in records.iter().enumerate() {
            let (Some(names1), Some(names2)) = (
                split_roster(&record.team1_heroes),
                split_roster(&record.team2_heroes),
            ) else {
                debug!("Row {}: roster is not {} heroes, dropped", row, ROSTER_SIZE);
                stats.bad_roster_size += 1;
                continue;
            };

            let resolve = |names: &[String; ROSTER_SIZE]| -> Option<[usize; ROSTER_SIZE]> {
                let mut out = [0usize; ROSTER_SIZE];
                for (slot, name) in names.iter().enumerate() {
                    out[slot] = *index.get(&normalize_name(name))?;
                }
                Some(out)
            };
            let (Some(idx1), Some(idx2)) = (resolve(&names1), resolve(&names2)) else {
                debug!("Row {}: unknown hero in roster, dropped", row);
                stats.unknown_hero += 1;
                continue;
            };

            if self.options.require_odds
                && (record.team1_odds.is_none() || record.team2_odds.is_none())
            {
                debug!("Row {}: missing odds, dropped", row);
                stats.missing_odds += 1;
                continue;
            }

            let derived = self.derive(record, idx1, idx2);
            if derived.winner.is_none() {
                stats.unknown_winner += 1;
            }
            matches.push(derived);
        }

        stats.kept = matches.len();
        info!(
            "Dataset: {} of {} rows kept ({} bad roster, {} unknown hero, {} missing odds)",
            stats.kept,
            stats.rows_read,
            stats.bad_roster_size,
            stats.unknown_hero,
            stats.missing_odds
        );
        if stats.unknown_winner > 0 {
            warn!(
                "{} matches have a winner matching neither team and will never be bet",
                stats.unknown_winner
            );
        }

        Dataset { matches, stats }
    }

    fn derive(
        &self,
        record: &MatchRecord,
        idx1: [usize; ROSTER_SIZE],
        idx2: [usize; ROSTER_SIZE],
    ) -> DerivedMatch {
        let matrix = &self.heroes.matrix;
        let adv1 = idx1.map(|hero| hero_advantage(matrix, hero, &idx2));
        let adv2 = idx2.map(|hero| hero_advantage(matrix, hero, &idx1));

        let score = |indices: &[usize; ROSTER_SIZE], adv: &[f64; ROSTER_SIZE]| -> f64 {
            indices
                .iter()
                .zip(adv)
                .map(|(&idx, a)| self.heroes.win_rate(idx) + a)
                .sum()
        };

        let (label1, label2) = odds_labels(record.team1_odds, record.team2_odds);

        let team1 = TeamFeatures {
            name: record.team1.clone(),
            hero_indices: idx1,
            hero_advantages: adv1,
            score: score(&idx1, &adv1),
            odds: record.team1_odds,
            label: label1,
        };
        let team2 = TeamFeatures {
            name: record.team2.clone(),
            hero_indices: idx2,
            hero_advantages: adv2,
            score: score(&idx2, &adv2),
            odds: record.team2_odds,
            label: label2,
        };

        let mut metrics = BTreeMap::new();
        for metric in Metric::ALL {
            if let Some(delta) = self.metric_delta(metric, &team1, &team2) {
                metrics.insert(metric.label().to_string(), delta);
            }
        }

        let winner = resolve_winner(&record.winner, &record.team1, &record.team2);

        DerivedMatch {
            team1,
            team2,
            metrics,
            winner,
            league: record.league.clone(),
        }
    }

    fn metric_delta(&self, metric: Metric, t1: &TeamFeatures, t2: &TeamFeatures) -> Option<f64> {
        match metric.source() {
            MetricSource::TeamScore => Some(t1.score - t2.score),
            MetricSource::Advantage => Some(
                t1.hero_advantages.iter().sum::<f64>() - t2.hero_advantages.iter().sum::<f64>(),
            ),
            MetricSource::Synergy => {
                let matrix = &self.heroes.matrix;
                Some(team_synergy(matrix, &t1.hero_indices) - team_synergy(matrix, &t2.hero_indices))
            }
            MetricSource::HeroArray {
                key,
                aggregation,
                scale,
            } => {
                let values = self.heroes.metric_array(key)?;
                let team = |indices: &[usize; ROSTER_SIZE]| -> Option<f64> {
                    let sum: f64 = indices
                        .iter()
                        .map(|&i| values.get(i).copied())
                        .sum::<Option<f64>>()?;
                    Some(match aggregation {
                        Aggregation::Sum => sum,
                        Aggregation::Average => sum / ROSTER_SIZE as f64,
                    })
                };
                Some((team(&t1.hero_indices)? - team(&t2.hero_indices)?) * scale)
            }
        }
    }
}

/// Split a pipe-delimited roster, `None` unless it holds exactly five names
pub fn split_roster(roster: &str) -> Option<[String; ROSTER_SIZE]> {
    let names: Vec<String> = roster
        .split(ROSTER_DELIMITER)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    names.try_into().ok()
}

/// Advantage of `hero` against the whole opposing roster
///
/// The matrix is read at (opponent, hero) and negated.
pub fn hero_advantage(matrix: &MatchupMatrix, hero: usize, opponents: &[usize]) -> f64 {
    -opponents
        .iter()
        .map(|&opp| matrix.advantage(opp, hero))
        .sum::<f64>()
}

/// Sum of stored synergy over every unordered teammate pair
pub fn team_synergy(matrix: &MatchupMatrix, roster: &[usize]) -> f64 {
    let mut total = 0.0;
    for (i, &a) in roster.iter().enumerate() {
        for &b in &roster[i + 1..] {
            total += matrix.synergy(a, b);
        }
    }
    total
}

/// Lower decimal odds is the favorite; ties or missing odds give no label
pub fn odds_labels(odds1: Option<f64>, odds2: Option<f64>) -> (OddsLabel, OddsLabel) {
    match (odds1, odds2) {
        (Some(a), Some(b)) if a < b => (OddsLabel::Favorite, OddsLabel::Underdog),
        (Some(a), Some(b)) if a > b => (OddsLabel::Underdog, OddsLabel::Favorite),
        _ => (OddsLabel::None, OddsLabel::None),
    }
}

/// Exact match of the winner name against the team names
pub fn resolve_winner(winner: &str, team1: &str, team2: &str) -> Option<Side> {
    if winner == team1 {
        Some(Side::Team1)
    } else if winner == team2 {
        Some(Side::Team2)
    } else {
        None
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{Hero, MatchupEntry};

    pub(crate) const TEAM1_HEROES: &str = "H0|H1|H2|H3|H4";
    pub(crate) const TEAM2_HEROES: &str = "H5|H6|H7|H8|H9";

    /// Ten heroes at 50% where every H5..H9 stores a -1.0 advantage against
    /// every H0..H4, so each team1 slot reads +5.0 and each team2 slot -5.0
    pub(crate) fn countering_hero_data() -> HeroData {
        let heroes = (0..10).map(|i| Hero::new(format!("H{}", i), 50.0)).collect();
        let mut matrix = MatchupMatrix::new();
        for opp in 5..10 {
            for hero in 0..5 {
                matrix.insert(
                    opp,
                    hero,
                    MatchupEntry {
                        advantage: -1.0,
                        winrate: 49.0,
                        matches: 20,
                        synergy: 0.0,
                    },
                );
                matrix.insert(
                    hero,
                    opp,
                    MatchupEntry {
                        advantage: 1.0,
                        winrate: 51.0,
                        matches: 20,
                        synergy: 0.0,
                    },
                );
            }
        }
        HeroData {
            heroes,
            matrix,
            ..Default::default()
        }
    }

    pub(crate) fn record(odds1: f64, odds2: f64, winner: &str) -> MatchRecord {
        MatchRecord {
            team1: "Alpha".to_string(),
            team2: "Beta".to_string(),
            team1_heroes: TEAM1_HEROES.to_string(),
            team2_heroes: TEAM2_HEROES.to_string(),
            team1_odds: Some(odds1),
            team2_odds: Some(odds2),
            winner: winner.to_string(),
            league: "Spring Cup".to_string(),
        }
    }

    #[test]
    fn test_split_roster() {
        let roster = split_roster(" Axe | Lina |Tiny|Io| Zeus ").unwrap();
        assert_eq!(roster[1], "Lina");
        assert!(split_roster("Axe|Lina|Tiny|Io").is_none());
        assert!(split_roster("Axe|Lina|Tiny|Io|Zeus|Sven").is_none());
        // Empty segments do not count toward the five
        assert!(split_roster("Axe||Lina|Tiny|Io").is_none());
        assert!(split_roster("").is_none());
    }

    #[test]
    fn test_hero_advantage_reads_opponent_orientation() {
        let mut matrix = MatchupMatrix::new();
        let entry = |advantage| MatchupEntry {
            advantage,
            winrate: 50.0,
            matches: 10,
            synergy: 0.0,
        };
        matrix.insert(5, 0, entry(-2.0));
        matrix.insert(6, 0, entry(1.5));
        // Stored in the hero's own orientation: must be ignored
        matrix.insert(0, 5, entry(9.0));

        let adv = hero_advantage(&matrix, 0, &[5, 6, 7, 8, 9]);
        assert!((adv - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_team_synergy_counts_pairs_once() {
        let mut matrix = MatchupMatrix::new();
        matrix.insert(
            0,
            1,
            MatchupEntry {
                advantage: 0.0,
                winrate: 50.0,
                matches: 10,
                synergy: 2.0,
            },
        );
        matrix.insert(
            1,
            0,
            MatchupEntry {
                advantage: 0.0,
                winrate: 50.0,
                matches: 10,
                synergy: 7.0,
            },
        );
        assert_eq!(team_synergy(&matrix, &[0, 1, 2]), 2.0);
    }

    #[test]
    fn test_odds_labels() {
        assert_eq!(
            odds_labels(Some(1.5), Some(2.5)),
            (OddsLabel::Favorite, OddsLabel::Underdog)
        );
        assert_eq!(
            odds_labels(Some(3.0), Some(1.4)),
            (OddsLabel::Underdog, OddsLabel::Favorite)
        );
        assert_eq!(
            odds_labels(Some(1.9), Some(1.9)),
            (OddsLabel::None, OddsLabel::None)
        );
        assert_eq!(
            odds_labels(None, Some(1.9)),
            (OddsLabel::None, OddsLabel::None)
        );
    }

    #[test]
    fn test_resolve_winner() {
        assert_eq!(resolve_winner("Alpha", "Alpha", "Beta"), Some(Side::Team1));
        assert_eq!(resolve_winner("Beta", "Alpha", "Beta"), Some(Side::Team2));
        assert_eq!(resolve_winner("alpha", "Alpha", "Beta"), None);
        assert_eq!(resolve_winner("", "Alpha", "Beta"), None);
    }

    #[test]
    fn test_build_derives_advantages_and_delta() {
        let heroes = countering_hero_data();
        let dataset = DatasetBuilder::new(&heroes, DatasetOptions::default())
            .build(&[record(1.8, 2.2, "Alpha")]);

        assert_eq!(dataset.len(), 1);
        let m = &dataset.matches[0];
        assert!(m.team1.hero_advantages.iter().all(|&a| (a - 5.0).abs() < 1e-12));
        assert!(m.team2.hero_advantages.iter().all(|&a| (a + 5.0).abs() < 1e-12));
        // 5 * (50 + 5) - 5 * (50 - 5)
        assert!((m.metric("WR_DELTA").unwrap() - 50.0).abs() < 1e-9);
        assert!((m.metric("ADV_DELTA").unwrap() - 50.0).abs() < 1e-9);
        assert_eq!(m.team1.label, OddsLabel::Favorite);
        assert_eq!(m.team2.label, OddsLabel::Underdog);
        assert_eq!(m.winner, Some(Side::Team1));
        assert_eq!(m.league, "Spring Cup");
        // No side-channel arrays in this hero data
        assert!(m.metric("GPM_DELTA").is_none());
    }

    #[test]
    fn test_per_hero_advantage_is_negated_opponent_sum() {
        let heroes = countering_hero_data();
        let dataset = DatasetBuilder::new(&heroes, DatasetOptions::default())
            .build(&[record(1.8, 2.2, "Alpha")]);
        let m = &dataset.matches[0];

        for (slot, &hero) in m.team1.hero_indices.iter().enumerate() {
            let expected: f64 = -m
                .team2
                .hero_indices
                .iter()
                .map(|&opp| heroes.matrix.advantage(opp, hero))
                .sum::<f64>();
            assert_eq!(m.team1.hero_advantages[slot], expected);
        }
    }

    #[test]
    fn test_unknown_hero_drops_match() {
        let heroes = countering_hero_data();
        let mut bad = record(1.8, 2.2, "Alpha");
        bad.team2_heroes = "H5|H6|H7|H8|Nobody".to_string();

        let dataset = DatasetBuilder::new(&heroes, DatasetOptions::default())
            .build(&[record(1.8, 2.2, "Alpha"), bad]);

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.stats.unknown_hero, 1);
        assert_eq!(dataset.stats.dropped(), 1);
    }

    #[test]
    fn test_bad_roster_size_drops_match() {
        let heroes = countering_hero_data();
        let mut bad = record(1.8, 2.2, "Alpha");
        bad.team1_heroes = "H0|H1|H2|H3".to_string();

        let dataset =
            DatasetBuilder::new(&heroes, DatasetOptions::default()).build(&[bad]);
        assert!(dataset.is_empty());
        assert_eq!(dataset.stats.bad_roster_size, 1);
    }

    #[test]
    fn test_missing_odds_policy() {
        let heroes = countering_hero_data();
        let mut no_odds = record(1.8, 2.2, "Alpha");
        no_odds.team2_odds = None;

        let strict = DatasetBuilder::new(&heroes, DatasetOptions::default())
            .build(&[no_odds.clone()]);
        assert!(strict.is_empty());
        assert_eq!(strict.stats.missing_odds, 1);

        let lenient = DatasetBuilder::new(
            &heroes,
            DatasetOptions {
                require_odds: false,
            },
        )
        .build(&[no_odds]);
        assert_eq!(lenient.len(), 1);
        assert_eq!(lenient.matches[0].team1.label, OddsLabel::None);
    }

    #[test]
    fn test_unknown_winner_is_kept() {
        let heroes = countering_hero_data();
        let dataset = DatasetBuilder::new(&heroes, DatasetOptions::default())
            .build(&[record(1.8, 2.2, "Gamma")]);

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.matches[0].winner, None);
        assert_eq!(dataset.stats.unknown_winner, 1);
    }

    #[test]
    fn test_hero_array_metric() {
        let mut heroes = countering_hero_data();
        let gpm: Vec<f64> = (0..10).map(|i| if i < 5 { 500.0 } else { 450.0 }).collect();
        heroes.hero_metrics.insert("heroes_gpm".to_string(), gpm);
        let duration: Vec<f64> = (0..10).map(|i| if i < 5 { 40.0 } else { 38.0 }).collect();
        heroes
            .hero_metrics
            .insert("heroes_match_duration".to_string(), duration);

        let dataset = DatasetBuilder::new(&heroes, DatasetOptions::default())
            .build(&[record(1.8, 2.2, "Alpha")]);
        let m = &dataset.matches[0];

        assert!((m.metric("GPM_DELTA").unwrap() - 250.0).abs() < 1e-9);
        assert!((m.metric("DURATION_DELTA").unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_order_is_preserved() {
        let heroes = countering_hero_data();
        let mut second = record(2.0, 1.7, "Beta");
        second.team1 = "Gamma".to_string();
        let dataset = DatasetBuilder::new(&heroes, DatasetOptions::default())
            .build(&[record(1.8, 2.2, "Alpha"), second]);

        assert_eq!(dataset.matches[0].team1.name, "Alpha");
        assert_eq!(dataset.matches[1].team1.name, "Gamma");
    }

    #[test]
    fn test_leagues_and_subset() {
        let heroes = countering_hero_data();
        let mut other = record(2.0, 1.7, "Beta");
        other.league = "Autumn Open".to_string();
        let dataset = DatasetBuilder::new(&heroes, DatasetOptions::default()).build(&[
            record(1.8, 2.2, "Alpha"),
            other,
            record(1.6, 2.4, "Beta"),
        ]);

        assert_eq!(dataset.leagues(), vec!["Autumn Open", "Spring Cup"]);
        assert_eq!(dataset.league_subset("Spring Cup").len(), 2);
        // Favorite won 2 of 3
        assert!((dataset.favorite_hit_rate().unwrap() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_metric_labels() {
        assert_eq!(Metric::from_label("wr_delta"), Some(Metric::WrDelta));
        assert_eq!(Metric::from_label("GPM"), Some(Metric::Gpm));
        assert_eq!(Metric::from_label("nope"), None);
        for metric in Metric::ALL {
            let t = metric.thresholds();
            assert!(t.windows(2).all(|w| w[0] < w[1]), "{} not ascending", metric);
        }
    }
}

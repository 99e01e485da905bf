use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Number of heroes on each side of a match
pub const ROSTER_SIZE: usize = 5;

/// Win rate assumed for a hero whose general win rate is unknown
pub const DEFAULT_HERO_WIN_RATE: f64 = 50.0;

/// Hero identity and general win rate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hero {
    pub name: String,
    pub slug: String,
    pub win_rate: f64,
}

impl Hero {
    pub fn new(name: impl Into<String>, win_rate: f64) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        Self {
            name,
            slug,
            win_rate,
        }
    }
}

/// One cell of the matchup matrix
///
/// Read at `(row, col)`: how the row hero fares against the col hero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchupEntry {
    /// Signed advantage in percentage points, positive favors the row hero
    pub advantage: f64,
    /// Row hero win rate against the col hero
    pub winrate: f64,
    /// Number of matches the pair was observed in
    pub matches: u32,
    /// How well the pair performs as teammates
    pub synergy: f64,
}

/// Sparse hero-vs-hero matrix
#[derive(Debug, Clone, Default)]
pub struct MatchupMatrix {
    entries: HashMap<(usize, usize), MatchupEntry>,
}

impl MatchupMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, row: usize, col: usize, entry: MatchupEntry) {
        self.entries.insert((row, col), entry);
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&MatchupEntry> {
        self.entries.get(&(row, col))
    }

    /// Stored advantage of `row` against `col`, zero for unknown pairs
    pub fn advantage(&self, row: usize, col: usize) -> f64 {
        self.get(row, col).map(|e| e.advantage).unwrap_or(0.0)
    }

    /// Stored synergy of `row` with `col`, zero for unknown pairs
    pub fn synergy(&self, row: usize, col: usize) -> f64 {
        self.get(row, col).map(|e| e.synergy).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Hero roster, matchup matrix and per-hero side-channel metrics
#[derive(Debug, Clone, Default)]
pub struct HeroData {
    pub heroes: Vec<Hero>,
    pub matrix: MatchupMatrix,
    /// Per-hero metric arrays keyed by source name (e.g. `heroes_gpm`),
    /// each parallel to `heroes`
    pub hero_metrics: BTreeMap<String, Vec<f64>>,
    pub update_time: Option<chrono::NaiveDate>,
}

impl HeroData {
    /// Normalized name -> index, built once per dataset build
    ///
    /// Duplicate normalized names resolve to the first hero listed.
    pub fn name_index(&self) -> HashMap<String, usize> {
        let mut index = HashMap::with_capacity(self.heroes.len());
        for (idx, hero) in self.heroes.iter().enumerate() {
            index.entry(normalize_name(&hero.name)).or_insert(idx);
        }
        index
    }

    pub fn win_rate(&self, idx: usize) -> f64 {
        self.heroes
            .get(idx)
            .map(|h| h.win_rate)
            .unwrap_or(DEFAULT_HERO_WIN_RATE)
    }

    pub fn metric_array(&self, source: &str) -> Option<&[f64]> {
        self.hero_metrics.get(source).map(|v| v.as_slice())
    }

    pub fn len(&self) -> usize {
        self.heroes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heroes.is_empty()
    }
}

/// Raw historical match row as read from the match log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchRecord {
    pub team1: String,
    pub team2: String,
    /// Pipe-delimited hero names
    pub team1_heroes: String,
    pub team2_heroes: String,
    pub team1_odds: Option<f64>,
    pub team2_odds: Option<f64>,
    pub winner: String,
    pub league: String,
}

/// One side of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Team1,
    Team2,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Team1 => Side::Team2,
            Side::Team2 => Side::Team1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Team1 => "team1",
            Side::Team2 => "team2",
        }
    }
}

/// Bookmaker label of a side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OddsLabel {
    Favorite,
    Underdog,
    None,
}

impl OddsLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            OddsLabel::Favorite => "favorite",
            OddsLabel::Underdog => "underdog",
            OddsLabel::None => "none",
        }
    }
}

/// Per-team features of a derived match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamFeatures {
    pub name: String,
    pub hero_indices: [usize; ROSTER_SIZE],
    /// Advantage of each roster slot against the whole opposing roster
    pub hero_advantages: [f64; ROSTER_SIZE],
    /// Sum of win rate + advantage over the roster
    pub score: f64,
    pub odds: Option<f64>,
    pub label: OddsLabel,
}

impl TeamFeatures {
    pub fn positive_slots(&self) -> usize {
        self.hero_advantages.iter().filter(|&&a| a > 0.0).count()
    }

    pub fn negative_slots(&self) -> usize {
        self.hero_advantages.iter().filter(|&&a| a < 0.0).count()
    }
}

/// Match record joined against hero data, ready for replay
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedMatch {
    pub team1: TeamFeatures,
    pub team2: TeamFeatures,
    /// Metric label -> team1 minus team2 delta
    pub metrics: BTreeMap<String, f64>,
    pub winner: Option<Side>,
    pub league: String,
}

impl DerivedMatch {
    pub fn team(&self, side: Side) -> &TeamFeatures {
        match side {
            Side::Team1 => &self.team1,
            Side::Team2 => &self.team2,
        }
    }

    pub fn metric(&self, label: &str) -> Option<f64> {
        self.metrics.get(label).copied()
    }

    pub fn odds(&self, side: Side) -> Option<f64> {
        self.team(side).odds
    }

    pub fn favorite(&self) -> Option<Side> {
        match (self.team1.label, self.team2.label) {
            (OddsLabel::Favorite, _) => Some(Side::Team1),
            (_, OddsLabel::Favorite) => Some(Side::Team2),
            _ => None,
        }
    }
}

/// Normalize a hero name for lookup
pub fn normalize_name(name: &str) -> String {
    name.replace('\u{a0}', " ").trim().to_lowercase()
}

/// URL/file friendly slug: lower-case alphanumerics joined by single dashes
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Anti-Mage "), "anti-mage");
        assert_eq!(normalize_name("Queen\u{a0}of Pain"), "queen of pain");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Nature's Prophet"), "nature-s-prophet");
        assert_eq!(slugify("  Queen of Pain "), "queen-of-pain");
        assert_eq!(slugify("DreamLeague Season 22"), "dreamleague-season-22");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn test_matrix_unknown_pair_is_zero() {
        let mut matrix = MatchupMatrix::new();
        matrix.insert(
            0,
            1,
            MatchupEntry {
                advantage: 2.5,
                winrate: 52.5,
                matches: 100,
                synergy: 1.0,
            },
        );
        assert_eq!(matrix.advantage(0, 1), 2.5);
        assert_eq!(matrix.advantage(1, 0), 0.0);
        assert_eq!(matrix.synergy(0, 1), 1.0);
        assert_eq!(matrix.len(), 1);
    }

    #[test]
    fn test_name_index_is_normalized() {
        let data = HeroData {
            heroes: vec![
                Hero::new("Axe", 51.0),
                Hero::new("Queen of Pain", 49.0),
                Hero::new("queen\u{a0}of pain ", 48.0),
            ],
            ..Default::default()
        };
        let index = data.name_index();
        assert_eq!(index.get(&normalize_name("Queen\u{a0}of Pain ")), Some(&1));
        assert_eq!(index.get("lina"), None);
        assert_eq!(index.len(), 2);
        assert_eq!(data.win_rate(0), 51.0);
        assert_eq!(data.win_rate(7), DEFAULT_HERO_WIN_RATE);
    }

    #[test]
    fn test_side_opponent() {
        assert_eq!(Side::Team1.opponent(), Side::Team2);
        assert_eq!(Side::Team2.opponent(), Side::Team1);
        assert_eq!(Side::Team2.as_str(), "team2");
    }

    #[test]
    fn test_team_slot_counts() {
        let team = TeamFeatures {
            name: "A".to_string(),
            hero_indices: [0, 1, 2, 3, 4],
            hero_advantages: [1.0, 0.5, 0.0, -0.2, 3.0],
            score: 0.0,
            odds: Some(1.5),
            label: OddsLabel::Favorite,
        };
        assert_eq!(team.positive_slots(), 3);
        assert_eq!(team.negative_slots(), 1);
    }
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

use crate::error::{GatewayError, Result};

const BUILTIN_RULES: &str = include_str!("../../config/league_rules.toml");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeagueKey {
    Nfl,
    Nba,
    Mlb,
    Nhl,
}

impl LeagueKey {
    /// Priority order used for classification ties and for ordering the `all` view.
    pub const PRIORITY: [LeagueKey; 4] = [Self::Nfl, Self::Nba, Self::Mlb, Self::Nhl];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nfl => "nfl",
            Self::Nba => "nba",
            Self::Mlb => "mlb",
            Self::Nhl => "nhl",
        }
    }

    /// ESPN sport path segment.
    pub fn sport(&self) -> &'static str {
        match self {
            Self::Nfl => "football",
            Self::Nba => "basketball",
            Self::Mlb => "baseball",
            Self::Nhl => "hockey",
        }
    }

    pub fn priority(&self) -> usize {
        Self::PRIORITY
            .iter()
            .position(|league| league == self)
            .unwrap_or(Self::PRIORITY.len())
    }
}

impl std::fmt::Display for LeagueKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LeagueKey {
    type Err = GatewayError;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "nfl" => Ok(Self::Nfl),
            "nba" => Ok(Self::Nba),
            "mlb" => Ok(Self::Mlb),
            "nhl" => Ok(Self::Nhl),
            _ => Err(GatewayError::unsupported_league(raw)),
        }
    }
}

/// `all` or a single league, as accepted by the list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeagueScope {
    All,
    League(LeagueKey),
}

impl LeagueScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::League(league) => league.as_str(),
        }
    }

    pub fn league(&self) -> Option<LeagueKey> {
        match self {
            Self::All => None,
            Self::League(league) => Some(*league),
        }
    }
}

impl std::fmt::Display for LeagueScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LeagueScope {
    type Err = GatewayError;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        if raw.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            raw.parse().map(Self::League)
        }
    }
}

/// Keyword sets that decide whether a free-text match record belongs to a league.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LeagueRules {
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub brand_keywords: Vec<String>,
    #[serde(default)]
    pub team_keywords: Vec<String>,
    #[serde(default)]
    pub exclude_keywords: Vec<String>,
}

impl LeagueRules {
    fn lowercased(self) -> Self {
        let lower = |values: Vec<String>| {
            values
                .into_iter()
                .map(|v| v.trim().to_lowercase())
                .filter(|v| !v.is_empty())
                .collect()
        };
        Self {
            categories: lower(self.categories),
            brand_keywords: lower(self.brand_keywords),
            team_keywords: lower(self.team_keywords),
            exclude_keywords: lower(self.exclude_keywords),
        }
    }
}

/// The declarative league table, keyed by league.
#[derive(Debug, Clone, Default)]
pub struct RulesTable {
    rules: BTreeMap<LeagueKey, LeagueRules>,
}

impl RulesTable {
    /// Table compiled into the binary from `config/league_rules.toml`.
    pub fn builtin() -> Result<Self> {
        Self::from_toml(BUILTIN_RULES)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    /// Parse a rules table. Sections that are not a known league are skipped.
    pub fn from_toml(raw: &str) -> Result<Self> {
        let parsed: BTreeMap<String, LeagueRules> = toml::from_str(raw)?;
        let mut rules = BTreeMap::new();
        for (name, entry) in parsed {
            match name.parse::<LeagueKey>() {
                Ok(league) => {
                    rules.insert(league, entry.lowercased());
                }
                Err(_) => warn!(section = %name, "ignoring league rules for unknown league"),
            }
        }
        Ok(Self { rules })
    }

    pub fn get(&self, league: LeagueKey) -> Option<&LeagueRules> {
        self.rules.get(&league)
    }

    /// Leagues in table order.
    pub fn leagues(&self) -> impl Iterator<Item = LeagueKey> + '_ {
        self.rules.keys().copied()
    }

    pub fn team_keywords(&self, league: LeagueKey) -> &[String] {
        self.rules
            .get(&league)
            .map(|rules| rules.team_keywords.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_league_key_parse_and_sport() {
        assert_eq!("NFL".parse::<LeagueKey>().unwrap(), LeagueKey::Nfl);
        assert_eq!(LeagueKey::Nhl.sport(), "hockey");
        assert_eq!(LeagueKey::Mlb.priority(), 2);
        assert!("xfl".parse::<LeagueKey>().is_err());
        assert_eq!("all".parse::<LeagueScope>().unwrap(), LeagueScope::All);
        assert_eq!(
            "nba".parse::<LeagueScope>().unwrap(),
            LeagueScope::League(LeagueKey::Nba)
        );
    }

    #[test]
    fn test_builtin_rules_cover_every_league() {
        let table = RulesTable::builtin().unwrap();
        for league in LeagueKey::PRIORITY {
            let rules = table.get(league).unwrap();
            assert!(!rules.categories.is_empty());
            assert!(!rules.team_keywords.is_empty());
        }
        assert!(table.team_keywords(LeagueKey::Nfl).iter().any(|k| k == "bills"));
    }

    #[test]
    fn test_unknown_sections_are_skipped() {
        let table = RulesTable::from_toml(
            r#"
            [wnba]
            categories = ["basketball"]

            [nba]
            categories = ["Basketball"]
            brand_keywords = ["NBA"]
            "#,
        )
        .unwrap();
        assert_eq!(table.leagues().collect::<Vec<_>>(), vec![LeagueKey::Nba]);
        assert_eq!(table.get(LeagueKey::Nba).unwrap().brand_keywords, vec!["nba"]);
    }
}

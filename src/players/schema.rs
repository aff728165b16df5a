//! Player table layouts and stat extraction.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::adapters::espn::AthleteStats;
use crate::domain::LeagueKey;
use crate::error::{GatewayError, Result};

/// Layouts compiled into the binary from `config/player_tables.toml`.
pub const BUILTIN_TABLES: &str = include_str!("../../config/player_tables.toml");

// =============================================================================
// View / mode
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableView {
    #[default]
    Standard,
    Expanded,
}

impl TableView {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Expanded => "expanded",
        }
    }
}

impl FromStr for TableView {
    type Err = GatewayError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "expanded" => Ok(Self::Expanded),
            other => Err(GatewayError::unsupported(
                "unsupported_view",
                format!("unsupported view: {other}"),
            )),
        }
    }
}

/// MLB splits hitters and pitchers into separate tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsMode {
    #[default]
    Hitting,
    Pitching,
}

impl StatsMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hitting => "hitting",
            Self::Pitching => "pitching",
        }
    }
}

impl FromStr for StatsMode {
    type Err = GatewayError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hitting" => Ok(Self::Hitting),
            "pitching" => Ok(Self::Pitching),
            other => Err(GatewayError::unsupported(
                "unsupported_view",
                format!("unsupported mode: {other}"),
            )),
        }
    }
}

// =============================================================================
// Schemas
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatColumn {
    pub key: String,
    pub label: String,
    pub keys: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnHeader {
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableSchema {
    pub league: LeagueKey,
    #[serde(default)]
    pub mode: Option<StatsMode>,
    pub view: TableView,
    /// Default sort column for leader boards
    pub leader: String,
    pub stat_categories: Vec<String>,
    pub columns: Vec<StatColumn>,
}

impl TableSchema {
    pub fn column(&self, key: &str) -> Option<&StatColumn> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn headers(&self) -> Vec<ColumnHeader> {
        self.columns
            .iter()
            .map(|c| ColumnHeader {
                key: c.key.clone(),
                label: c.label.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct SchemaFile {
    schema: Vec<TableSchema>,
}

#[derive(Debug, Clone, Default)]
pub struct SchemaTable {
    schemas: Vec<TableSchema>,
}

impl SchemaTable {
    pub fn builtin() -> Result<Self> {
        Self::from_toml(BUILTIN_TABLES)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let file: SchemaFile = toml::from_str(raw)?;
        Ok(Self { schemas: file.schema })
    }

    /// Mode only distinguishes MLB tables; elsewhere it is ignored.
    pub fn resolve(&self, league: LeagueKey, mode: StatsMode, view: TableView) -> Option<&TableSchema> {
        let mode = (league == LeagueKey::Mlb).then_some(mode);
        self.schemas
            .iter()
            .find(|s| s.league == league && s.mode == mode && s.view == view)
    }
}

// =============================================================================
// Extraction
// =============================================================================

fn normalize_key(value: &str) -> String {
    value.trim().to_lowercase()
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Cell value for `column`: the stat's display value, else its raw value.
///
/// Categories named by the column (or `fallback_categories`) are searched first, then every
/// category.
pub fn extract_stat_value(stats: &AthleteStats, column: &StatColumn, fallback_categories: &[String]) -> Option<String> {
    let keys: Vec<String> = column.keys.iter().map(|k| normalize_key(k)).filter(|k| !k.is_empty()).collect();
    if keys.is_empty() || stats.categories.is_empty() {
        return None;
    }

    let desired: Vec<String> = if column.categories.is_empty() {
        fallback_categories.iter().map(|c| normalize_key(c)).collect()
    } else {
        column.categories.iter().map(|c| normalize_key(c)).collect()
    };

    let find_in = |categories: &mut dyn Iterator<Item = &crate::adapters::espn::StatCategory>| {
        for category in categories {
            for stat in &category.stats {
                if stat.labels().any(|label| keys.contains(&normalize_key(label))) {
                    if let Some(display) = &stat.display_value {
                        return Some(display.clone());
                    }
                    if let Some(value) = stat.value {
                        return Some(format_number(value));
                    }
                }
            }
        }
        None
    };

    let preferred: Vec<_> = desired
        .iter()
        .filter_map(|name| {
            stats
                .categories
                .iter()
                .find(|c| c.name.as_deref().map(normalize_key).as_deref() == Some(name.as_str()))
        })
        .collect();

    if !preferred.is_empty() {
        if let Some(value) = find_in(&mut preferred.iter().copied()) {
            return Some(value);
        }
    }
    find_in(&mut stats.categories.iter())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::espn::{StatCategory, StatValue};

    fn stat(name: &str, abbr: &str, display: Option<&str>, value: Option<f64>) -> StatValue {
        StatValue {
            name: Some(name.into()),
            abbreviation: Some(abbr.into()),
            display_value: display.map(str::to_string),
            value,
            ..StatValue::default()
        }
    }

    fn stats() -> AthleteStats {
        AthleteStats {
            categories: vec![
                StatCategory {
                    name: Some("passing".into()),
                    stats: vec![
                        stat("interceptions", "INT", Some("9"), Some(9.0)),
                        stat("passingYards", "YDS", Some("4,183"), Some(4183.0)),
                    ],
                },
                StatCategory {
                    name: Some("defensiveInterceptions".into()),
                    stats: vec![stat("interceptions", "INT", None, Some(0.0))],
                },
                StatCategory {
                    name: Some("general".into()),
                    stats: vec![stat("gamesPlayed", "GP", None, Some(17.0))],
                },
            ],
        }
    }

    #[test]
    fn test_builtin_tables_cover_every_league() {
        let table = SchemaTable::builtin().unwrap();
        for league in LeagueKey::PRIORITY {
            for view in [TableView::Standard, TableView::Expanded] {
                let schema = table.resolve(league, StatsMode::Hitting, view).unwrap();
                assert!(schema.column(&schema.leader).is_some(), "{league} {view:?}");
            }
        }
        let pitching = table.resolve(LeagueKey::Mlb, StatsMode::Pitching, TableView::Standard).unwrap();
        assert_eq!(pitching.leader, "era");
        // Mode is ignored outside MLB.
        let nba = table.resolve(LeagueKey::Nba, StatsMode::Pitching, TableView::Standard).unwrap();
        assert_eq!(nba.leader, "pts");
    }

    #[test]
    fn test_extract_prefers_column_categories() {
        let table = SchemaTable::builtin().unwrap();
        let schema = table.resolve(LeagueKey::Nfl, StatsMode::Hitting, TableView::Standard).unwrap();
        let s = stats();
        let value = |key: &str| extract_stat_value(&s, schema.column(key).unwrap(), &schema.stat_categories);
        assert_eq!(value("int").as_deref(), Some("9"));
        assert_eq!(value("defInt").as_deref(), Some("0"));
        assert_eq!(value("passYds").as_deref(), Some("4,183"));
        assert_eq!(value("g").as_deref(), Some("17"));
        assert_eq!(value("sacks"), None);
    }

    #[test]
    fn test_extract_falls_back_to_all_categories() {
        let column = StatColumn {
            key: "gp".into(),
            label: "GP".into(),
            keys: vec!["gp".into()],
            categories: vec!["batting".into()],
        };
        assert_eq!(extract_stat_value(&stats(), &column, &[]).as_deref(), Some("17"));
        assert_eq!(extract_stat_value(&AthleteStats::default(), &column, &[]), None);
    }

    #[test]
    fn test_view_and_mode_parse() {
        assert_eq!("Expanded".parse::<TableView>().unwrap(), TableView::Expanded);
        assert_eq!("wide".parse::<TableView>().unwrap_err().code(), "unsupported_view");
        assert_eq!("PITCHING".parse::<StatsMode>().unwrap(), StatsMode::Pitching);
        assert!("fielding".parse::<StatsMode>().is_err());
    }
}

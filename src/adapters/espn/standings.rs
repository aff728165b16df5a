use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient_id;
use super::teams::{select_logo, WireLogo};
use crate::domain::LeagueKey;
use crate::error::UpstreamError;

// ── Public types ────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standings {
    pub league: String,
    pub season: Option<String>,
    pub season_type: Option<i64>,
    pub groups: Vec<StandingsGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsGroup {
    pub name: String,
    pub entries: Vec<StandingsEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsEntry {
    pub team: StandingsTeam,
    pub stats: StandingsStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandingsTeam {
    pub id: Option<String>,
    pub name: Option<String>,
    pub abbreviation: Option<String>,
    pub logo: Option<String>,
}

/// Display values as ESPN formats them (`"12"`, `".750"`, `"W3"`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsStats {
    pub wins: Option<String>,
    pub losses: Option<String>,
    pub ties: Option<String>,
    pub ot_losses: Option<String>,
    pub win_percent: Option<String>,
    pub points: Option<String>,
    pub games_behind: Option<String>,
    pub streak: Option<String>,
}

// ── Wire ────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct WireStandingsDoc {
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "shortName", default)]
    short_name: Option<String>,
    #[serde(default)]
    abbreviation: Option<String>,
    #[serde(default)]
    children: Vec<WireStandingsDoc>,
    #[serde(default)]
    standings: Option<WireStandingsBlock>,
}

#[derive(Debug, Default, Deserialize)]
struct WireStandingsBlock {
    #[serde(default)]
    season: Option<Value>,
    #[serde(rename = "seasonDisplayName", default)]
    season_display_name: Option<String>,
    #[serde(rename = "seasonType", default)]
    season_type: Option<i64>,
    #[serde(default)]
    entries: Vec<WireEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct WireEntry {
    #[serde(default)]
    team: WireEntryTeam,
    #[serde(default)]
    stats: Vec<WireStat>,
}

#[derive(Debug, Default, Deserialize)]
struct WireEntryTeam {
    #[serde(default, deserialize_with = "lenient_id")]
    id: Option<String>,
    #[serde(rename = "displayName", default)]
    display_name: Option<String>,
    #[serde(rename = "shortDisplayName", default)]
    short_display_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    abbreviation: Option<String>,
    #[serde(default)]
    logos: Vec<WireLogo>,
}

#[derive(Debug, Default, Deserialize)]
struct WireStat {
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "displayValue", default)]
    display_value: Option<String>,
    #[serde(default)]
    value: Option<Value>,
}

impl WireStandingsDoc {
    fn label(&self) -> Option<String> {
        self.short_name
            .clone()
            .or_else(|| self.name.clone())
            .or_else(|| self.abbreviation.clone())
    }
}

fn stat(stats: &[WireStat], names: &[&str]) -> Option<String> {
    let found = stats
        .iter()
        .find(|s| s.name.as_deref().map(|n| names.contains(&n)).unwrap_or(false))?;
    found.display_value.clone().or_else(|| match found.value.as_ref()? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    })
}

fn parse_entry(entry: WireEntry) -> StandingsEntry {
    let stats = &entry.stats;
    let team = entry.team;
    StandingsEntry {
        team: StandingsTeam {
            id: team.id,
            name: team.display_name.or(team.short_display_name).or(team.name),
            abbreviation: team.abbreviation,
            logo: select_logo(&team.logos),
        },
        stats: StandingsStats {
            wins: stat(stats, &["wins"]),
            losses: stat(stats, &["losses"]),
            ties: stat(stats, &["ties"]),
            ot_losses: stat(stats, &["otLosses", "overtimeLosses"]),
            win_percent: stat(stats, &["winPercent", "pointsPercentage"]),
            points: stat(stats, &["points"]),
            games_behind: stat(stats, &["gamesBehind", "gamesBack"]),
            streak: stat(stats, &["streak"]),
        },
    }
}

pub fn parse_standings(url: &str, body: Value, league: LeagueKey) -> Result<Standings, UpstreamError> {
    if !body.is_object() {
        return Err(UpstreamError::invalid_payload(url, "standings payload is not an object"));
    }
    let doc: WireStandingsDoc =
        serde_json::from_value(body).map_err(|e| UpstreamError::invalid_payload(url, e.to_string()))?;

    let league_name = doc
        .label()
        .unwrap_or_else(|| league.as_str().to_uppercase());
    let mut out = Standings {
        league: league_name.clone(),
        ..Standings::default()
    };

    let mut add_group = |name: String, block: Option<WireStandingsBlock>| {
        let Some(block) = block else { return };
        if out.season.is_none() {
            out.season = block.season_display_name.clone().or_else(|| {
                block.season.as_ref().and_then(|s| match s {
                    Value::Number(n) => Some(n.to_string()),
                    Value::String(s) => Some(s.clone()),
                    _ => None,
                })
            });
        }
        if out.season_type.is_none() {
            out.season_type = block.season_type;
        }
        out.groups.push(StandingsGroup {
            name,
            entries: block.entries.into_iter().map(parse_entry).collect(),
        });
    };

    if doc.children.is_empty() {
        add_group(league_name, doc.standings);
    } else {
        for child in doc.children {
            let name = child.label().unwrap_or_else(|| "Standings".to_string());
            add_group(name, child.standings);
        }
    }

    Ok(out)
}

use serde::Deserialize;
use serde_json::Value;

use super::lenient_id;
use crate::error::UpstreamError;

/// One team's roster for a season.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamRoster {
    pub season_year: Option<i32>,
    pub athletes: Vec<RosterAthlete>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RosterAthlete {
    pub id: String,
    pub display_name: Option<String>,
    pub short_name: Option<String>,
    pub headshot: Option<String>,
    pub position: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireAthlete {
    #[serde(default, deserialize_with = "lenient_id")]
    id: Option<String>,
    #[serde(rename = "displayName", default)]
    display_name: Option<String>,
    #[serde(rename = "fullName", default)]
    full_name: Option<String>,
    #[serde(rename = "shortName", default)]
    short_name: Option<String>,
    #[serde(default)]
    headshot: Option<Value>,
    #[serde(default)]
    position: Option<WirePosition>,
}

#[derive(Debug, Default, Deserialize)]
struct WirePosition {
    #[serde(default)]
    abbreviation: Option<String>,
    #[serde(rename = "shortName", default)]
    short_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

fn headshot(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Object(obj) => obj.get("href").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn parse_athlete(value: Value) -> Option<RosterAthlete> {
    let wire: WireAthlete = serde_json::from_value(value).ok()?;
    let id = wire.id?;
    let display_name = wire.display_name.or(wire.full_name);
    Some(RosterAthlete {
        id,
        short_name: wire.short_name.or_else(|| display_name.clone()),
        display_name,
        headshot: headshot(wire.headshot),
        position: wire
            .position
            .and_then(|p| p.abbreviation.or(p.short_name).or(p.name))
            .map(|p| p.to_uppercase()),
    })
}

/// Rosters come either flat (`athletes: [athlete]`) or grouped by position
/// (`athletes: [{ position, items: [athlete] }]`).
pub fn parse_roster(url: &str, body: Value) -> Result<TeamRoster, UpstreamError> {
    let Value::Object(mut obj) = body else {
        return Err(UpstreamError::invalid_payload(url, "roster payload is not an object"));
    };

    let season_year = obj
        .get("season")
        .and_then(|s| s.get("year"))
        .and_then(Value::as_i64)
        .map(|y| y as i32);

    let entries = match obj.remove("athletes") {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };

    let mut athletes = Vec::new();
    for entry in entries {
        match entry.get("items") {
            Some(Value::Array(items)) => {
                athletes.extend(items.iter().cloned().filter_map(parse_athlete));
            }
            _ => athletes.extend(parse_athlete(entry)),
        }
    }

    Ok(TeamRoster {
        season_year,
        athletes,
    })
}

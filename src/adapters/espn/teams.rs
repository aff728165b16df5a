use serde::Deserialize;
use serde_json::Value;

use super::lenient_id;
use crate::domain::{LeagueKey, Team};
use crate::error::UpstreamError;

#[derive(Debug, Default, Deserialize)]
struct WireTeams {
    #[serde(default)]
    sports: Vec<WireSport>,
}

#[derive(Debug, Default, Deserialize)]
struct WireSport {
    #[serde(default)]
    leagues: Vec<WireLeague>,
}

#[derive(Debug, Default, Deserialize)]
struct WireLeague {
    #[serde(default)]
    teams: Vec<WireTeamEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct WireTeamEntry {
    #[serde(default)]
    team: Option<WireTeam>,
}

#[derive(Debug, Default, Deserialize)]
struct WireTeam {
    #[serde(default, deserialize_with = "lenient_id")]
    id: Option<String>,
    #[serde(default)]
    abbreviation: Option<String>,
    #[serde(rename = "displayName", default)]
    display_name: Option<String>,
    #[serde(rename = "shortDisplayName", default)]
    short_display_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    color: Option<String>,
    #[serde(rename = "alternateColor", default)]
    alternate_color: Option<String>,
    #[serde(default)]
    logos: Vec<WireLogo>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireLogo {
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

/// Largest logo by width, then height.
pub(crate) fn select_logo(logos: &[WireLogo]) -> Option<String> {
    logos
        .iter()
        .filter(|l| l.href.as_deref().map(|h| !h.is_empty()).unwrap_or(false))
        .max_by(|a, b| {
            let key = |l: &WireLogo| (l.width.unwrap_or(0.0), l.height.unwrap_or(0.0));
            key(a).partial_cmp(&key(b)).unwrap_or(std::cmp::Ordering::Equal)
        })
        .and_then(|l| l.href.clone())
}

fn color(value: Option<String>) -> Option<String> {
    value
        .map(|c| c.trim().trim_start_matches('#').to_string())
        .filter(|c| !c.is_empty())
        .map(|c| format!("#{c}"))
}

pub fn parse_teams(url: &str, body: Value, league: LeagueKey) -> Result<Vec<Team>, UpstreamError> {
    if !body.is_object() {
        return Err(UpstreamError::invalid_payload(url, "teams payload is not an object"));
    }
    let wire: WireTeams =
        serde_json::from_value(body).map_err(|e| UpstreamError::invalid_payload(url, e.to_string()))?;

    let teams = wire
        .sports
        .into_iter()
        .flat_map(|s| s.leagues)
        .flat_map(|l| l.teams)
        .filter_map(|entry| entry.team)
        .filter_map(|t| {
            let abbreviation = t.abbreviation.as_deref()?.trim().to_uppercase();
            if abbreviation.is_empty() {
                return None;
            }
            let name = t
                .display_name
                .clone()
                .or_else(|| t.name.clone())
                .unwrap_or_else(|| abbreviation.clone());
            Some(Team {
                id: t.id.clone(),
                short_name: t.short_display_name.clone().unwrap_or_else(|| name.clone()),
                name,
                abbreviation,
                logo: select_logo(&t.logos),
                color: color(t.color),
                alternate_color: color(t.alternate_color),
                league: Some(league),
            })
        })
        .collect();
    Ok(teams)
}

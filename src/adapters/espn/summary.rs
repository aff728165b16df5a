//! ESPN game summary: box score, leaders, plays and odds for one event.
//!
//! The sections are passed through untouched; only the event id and the two spellings
//! of the win-probability key are normalized.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::UpstreamError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub header: Option<Value>,
    pub boxscore: Option<Value>,
    pub leaders: Option<Value>,
    pub injuries: Option<Value>,
    pub broadcasts: Option<Value>,
    pub game_info: Option<Value>,
    pub notes: Option<Value>,
    pub standings: Option<Value>,
    pub drives: Option<Value>,
    pub plays: Option<Value>,
    pub scoring_plays: Option<Value>,
    #[serde(alias = "winprobability")]
    pub win_probability: Option<Value>,
    pub probability: Option<Value>,
    pub odds: Option<Value>,
    /// Upstream `meta` block, reported separately
    #[serde(rename(deserialize = "meta"), skip_serializing)]
    pub source: Option<Value>,
}

/// Null sections read as absent. A body that is not an object is rejected.
pub(crate) fn parse_summary(url: &str, body: Value) -> Result<GameSummary, UpstreamError> {
    let Value::Object(mut map) = body else {
        return Err(UpstreamError::invalid_payload(url, "summary is not an object"));
    };
    map.retain(|_, v| !v.is_null());
    // Both spellings present: the camelCase one wins.
    if map.contains_key("winProbability") {
        map.remove("winprobability");
    }
    serde_json::from_value(Value::Object(map)).map_err(|e| UpstreamError::invalid_payload(url, e.to_string()))
}

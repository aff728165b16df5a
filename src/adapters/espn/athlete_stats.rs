use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Statistic categories for one athlete, as served by the core API (`splits.categories`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AthleteStats {
    pub categories: Vec<StatCategory>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatCategory {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub stats: Vec<StatValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatValue {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub abbreviation: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub short_display_name: Option<String>,
    #[serde(default)]
    pub display_value: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
}

impl StatValue {
    /// Every label this stat answers to.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        [
            &self.name,
            &self.abbreviation,
            &self.display_name,
            &self.short_display_name,
        ]
        .into_iter()
        .filter_map(|label| label.as_deref())
    }
}

/// Malformed categories or stats are dropped rather than failing the whole athlete.
pub fn parse_athlete_stats(body: Value) -> AthleteStats {
    let categories = body
        .get("splits")
        .and_then(|s| s.get("categories"))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|c| {
                    let stats = c
                        .get("stats")
                        .and_then(Value::as_array)
                        .map(|stats| {
                            stats
                                .iter()
                                .filter_map(|s| serde_json::from_value::<StatValue>(s.clone()).ok())
                                .collect()
                        })
                        .unwrap_or_default();
                    let name = c.get("name").and_then(Value::as_str).map(str::to_string);
                    (name.is_some() || c.get("stats").is_some()).then_some(StatCategory { name, stats })
                })
                .collect()
        })
        .unwrap_or_default();
    AthleteStats { categories }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_splits() {
        let stats = parse_athlete_stats(json!({
            "splits": {"categories": [
                {"name": "passing", "stats": [
                    {"name": "passingYards", "abbreviation": "YDS", "displayName": "Passing Yards",
                     "displayValue": "4,183", "value": 4183.0},
                    {"name": "broken", "value": "not a number"}
                ]},
                {"name": "rushing"}
            ]}
        }));
        assert_eq!(stats.categories.len(), 2);
        assert_eq!(stats.categories[0].stats.len(), 1);
        let yards = &stats.categories[0].stats[0];
        assert_eq!(yards.labels().collect::<Vec<_>>(), vec!["passingYards", "YDS", "Passing Yards"]);
        assert!(stats.categories[1].stats.is_empty());
    }

    #[test]
    fn test_missing_splits() {
        assert!(parse_athlete_stats(json!({})).categories.is_empty());
    }
}

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::league::LeagueKey;
use super::slug::join_name;

/// A team as listed by `/teams`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: Option<String>,
    pub abbreviation: String,
    pub name: String,
    pub short_name: String,
    pub logo: Option<String>,
    pub color: Option<String>,
    pub alternate_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub league: Option<LeagueKey>,
}

/// Name -> abbreviation lookup over one league's teams.
#[derive(Debug, Clone, Default)]
pub struct TeamDirectory {
    by_name: HashMap<String, String>,
}

impl TeamDirectory {
    pub fn new(teams: &[Team]) -> Self {
        let mut by_name = HashMap::new();
        for team in teams {
            for name in [&team.name, &team.short_name] {
                let key = join_name(name);
                if !key.is_empty() {
                    by_name.entry(key).or_insert_with(|| team.abbreviation.clone());
                }
            }
        }
        Self { by_name }
    }

    pub fn abbreviation(&self, name: &str) -> Option<&str> {
        self.by_name.get(&join_name(name)).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

//! Lexical league classification of streamed match records.

use crate::adapters::streamed::RawMatch;
use crate::domain::{LeagueKey, LeagueRules, RulesTable};

/// Keyword heuristic over title, id and category. Stable and deterministic, not semantic.
#[derive(Debug, Clone)]
pub struct LeagueClassifier {
    rules: RulesTable,
}

fn haystack(raw: &RawMatch) -> String {
    format!("{} {}", raw.title(), raw.id()).to_lowercase()
}

fn accepts(rules: &LeagueRules, category: &str, haystack: &str) -> bool {
    if !category.is_empty() && !rules.categories.iter().any(|c| category.contains(c.as_str())) {
        return false;
    }
    if rules.exclude_keywords.iter().any(|k| haystack.contains(k.as_str())) {
        return false;
    }
    rules
        .brand_keywords
        .iter()
        .chain(rules.team_keywords.iter())
        .any(|k| haystack.contains(k.as_str()))
}

impl LeagueClassifier {
    pub fn new(rules: RulesTable) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RulesTable {
        &self.rules
    }

    pub fn is_league_match(&self, raw: &RawMatch, league: LeagueKey) -> bool {
        let Some(rules) = self.rules.get(league) else {
            return false;
        };
        accepts(rules, &raw.category().to_lowercase(), &haystack(raw))
    }

    /// First accepting league in priority order, then any other league in the table.
    pub fn identify(&self, raw: &RawMatch) -> Option<LeagueKey> {
        let category = raw.category().to_lowercase();
        let haystack = haystack(raw);
        LeagueKey::PRIORITY
            .iter()
            .copied()
            .chain(self.rules.leagues().filter(|l| !LeagueKey::PRIORITY.contains(l)))
            .find(|&league| {
                self.rules
                    .get(league)
                    .map(|rules| accepts(rules, &category, &haystack))
                    .unwrap_or(false)
            })
    }
}

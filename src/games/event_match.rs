//! Locate the scoreboard event for a matchup given loosely by team names or abbreviations.

use std::collections::HashSet;

use crate::adapters::espn::{Scoreboard, ScoreboardEvent};
use crate::domain::join_name;

/// Fuzzy matches below this score are rejected.
const MIN_SCORE: u32 = 2;

/// Either side may be missing; order does not matter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matchup {
    pub away_abbr: Option<String>,
    pub home_abbr: Option<String>,
    pub away_name: Option<String>,
    pub home_name: Option<String>,
}

impl Matchup {
    fn abbreviations(&self) -> HashSet<String> {
        [&self.away_abbr, &self.home_abbr]
            .into_iter()
            .flatten()
            .map(|a| a.trim().to_uppercase())
            .filter(|a| !a.is_empty())
            .collect()
    }

    fn names(&self) -> HashSet<String> {
        [&self.away_name, &self.home_name]
            .into_iter()
            .flatten()
            .map(|n| join_name(n))
            .filter(|n| !n.is_empty())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.abbreviations().is_empty() && self.names().is_empty()
    }
}

fn event_teams(event: &ScoreboardEvent) -> (HashSet<String>, HashSet<String>) {
    let mut abbreviations = HashSet::new();
    let mut names = HashSet::new();
    for competitor in [&event.away, &event.home].into_iter().flatten() {
        if let Some(abbr) = competitor.abbreviation.as_deref().filter(|a| !a.is_empty()) {
            abbreviations.insert(abbr.to_uppercase());
        }
        for name in std::iter::once(competitor.name.as_str()).chain(competitor.short_name.as_deref()) {
            let name = join_name(name);
            if !name.is_empty() {
                names.insert(name);
            }
        }
    }
    (abbreviations, names)
}

/// Three per shared abbreviation or equal name, two per name containing the other,
/// one per wanted name found in the event label.
fn score(
    event: &ScoreboardEvent,
    abbrs: &HashSet<String>,
    names: &HashSet<String>,
    target_abbrs: &HashSet<String>,
    target_names: &HashSet<String>,
) -> u32 {
    let mut score = 3 * target_abbrs.intersection(abbrs).count() as u32;
    for target in target_names {
        for candidate in names {
            if target == candidate {
                score += 3;
            } else if target.contains(candidate.as_str()) || candidate.contains(target.as_str()) {
                score += 2;
            }
        }
    }
    let label = if event.short_name.is_empty() { &event.name } else { &event.short_name };
    let label = join_name(label);
    if !label.is_empty() {
        score += target_names.iter().filter(|t| label.contains(t.as_str())).count() as u32;
    }
    score
}

/// First event whose teams cover every given abbreviation (or every given name) wins
/// outright. Otherwise the best-scoring event, if it reaches [`MIN_SCORE`]; ties keep the
/// earlier event.
pub fn find_event<'a>(scoreboard: &'a Scoreboard, matchup: &Matchup) -> Option<&'a ScoreboardEvent> {
    let target_abbrs = matchup.abbreviations();
    let target_names = matchup.names();
    if target_abbrs.is_empty() && target_names.is_empty() {
        return None;
    }

    let mut best: Option<(&ScoreboardEvent, u32)> = None;
    for event in &scoreboard.events {
        let (abbrs, names) = event_teams(event);
        if !target_abbrs.is_empty() && target_abbrs.is_subset(&abbrs) {
            return Some(event);
        }
        if !target_names.is_empty() && target_names.is_subset(&names) {
            return Some(event);
        }
        let score = score(event, &abbrs, &names, &target_abbrs, &target_names);
        if score > best.map_or(0, |(_, s)| s) {
            best = Some((event, score));
        }
    }
    best.filter(|(_, s)| *s >= MIN_SCORE).map(|(event, _)| event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::espn::{Competitor, EventStatus};

    fn competitor(name: &str, short: &str, abbr: &str) -> Competitor {
        Competitor {
            name: name.into(),
            short_name: Some(short.into()),
            abbreviation: Some(abbr.into()),
            ..Competitor::default()
        }
    }

    fn event(id: &str, short_name: &str, away: Competitor, home: Competitor) -> ScoreboardEvent {
        ScoreboardEvent {
            id: id.into(),
            name: String::new(),
            short_name: short_name.into(),
            start_date: None,
            week: None,
            status: EventStatus::default(),
            home: Some(home),
            away: Some(away),
        }
    }

    fn board() -> Scoreboard {
        Scoreboard {
            events: vec![
                event(
                    "401",
                    "MIA @ NE",
                    competitor("Miami Dolphins", "Dolphins", "MIA"),
                    competitor("New England Patriots", "Patriots", "NE"),
                ),
                event(
                    "402",
                    "BUF @ NYJ",
                    competitor("Buffalo Bills", "Bills", "BUF"),
                    competitor("New York Jets", "Jets", "NYJ"),
                ),
            ],
            ..Scoreboard::default()
        }
    }

    fn names(away: &str, home: &str) -> Matchup {
        Matchup {
            away_name: Some(away.into()),
            home_name: Some(home.into()),
            ..Matchup::default()
        }
    }

    #[test]
    fn test_abbreviations_match_in_either_order() {
        let board = board();
        let matchup = Matchup {
            away_abbr: Some("nyj".into()),
            home_abbr: Some("BUF".into()),
            ..Matchup::default()
        };
        assert_eq!(find_event(&board, &matchup).unwrap().id, "402");
    }

    #[test]
    fn test_short_names_match() {
        let board = board();
        assert_eq!(find_event(&board, &names("Bills", "Jets")).unwrap().id, "402");
    }

    #[test]
    fn test_partial_names_score_their_way_in() {
        let board = board();
        // "buffalo" is inside "buffalo bills" and "jets" inside "ny jets".
        let found = find_event(&board, &names("Buffalo", "NY Jets")).unwrap();
        assert_eq!(found.id, "402");
    }

    #[test]
    fn test_one_known_abbreviation_is_enough() {
        let board = board();
        let matchup = Matchup {
            away_abbr: Some("MIA".into()),
            home_abbr: Some("XYZ".into()),
            ..Matchup::default()
        };
        assert_eq!(find_event(&board, &matchup).unwrap().id, "401");
    }

    #[test]
    fn test_weak_or_empty_matchups_are_rejected() {
        let board = board();
        assert!(find_event(&board, &names("Chiefs", "Broncos")).is_none());
        assert!(find_event(&board, &Matchup::default()).is_none());
        assert!(Matchup::default().is_empty());
        assert!(find_event(&board, &names("  ", "")).is_none());
    }
}

//! Turns raw feed snapshots into normalized, deduplicated [`Game`] records.

use chrono::{SecondsFormat, TimeZone, Utc};
use std::collections::HashSet;
use std::sync::Arc;

use super::classifier::LeagueClassifier;
use super::dedupe::dedupe_games;
use super::ordering::sort_sources;
use super::{BuildStats, GameFilter};
use crate::adapters::streamed::{ImageResolver, MatchSnapshot, RawMatch, RawTeam};
use crate::config::AppConfig;
use crate::domain::{
    normalize_category, sanitize_slug, split_matchup, Game, GameSource, GameTeam, GameTeams,
    LeagueKey, LeagueScope,
};

/// Liveness flags derived from the start time alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Liveness {
    pub is_live: bool,
    pub is_upcoming: bool,
    pub is_ended: bool,
}

impl Liveness {
    /// An undated record is neither live, upcoming nor ended.
    pub fn derive(timestamp: Option<i64>, listed_live: bool, now_ms: i64, live_max_age_ms: i64, ended_grace_ms: i64) -> Self {
        let Some(ts) = timestamp else {
            return Self::default();
        };
        let is_live = listed_live && now_ms - ts <= live_max_age_ms;
        Self {
            is_live,
            is_upcoming: !is_live && ts > now_ms,
            is_ended: !is_live && ts <= now_ms - ended_grace_ms,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BuildOutcome {
    pub games: Vec<Game>,
    pub stats: BuildStats,
}

pub struct GameBuilder {
    classifier: Arc<LeagueClassifier>,
    images: ImageResolver,
    live_max_age_ms: i64,
    ended_grace_ms: i64,
}

pub(crate) fn iso_from_ms(ts: i64) -> Option<String> {
    Utc.timestamp_millis_opt(ts)
        .single()
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

impl GameBuilder {
    pub fn new(classifier: Arc<LeagueClassifier>, images: ImageResolver, live_max_age_sec: i64, ended_grace_sec: i64) -> Self {
        Self {
            classifier,
            images,
            live_max_age_ms: live_max_age_sec * 1000,
            ended_grace_ms: ended_grace_sec * 1000,
        }
    }

    pub fn from_config(classifier: Arc<LeagueClassifier>, cfg: &AppConfig) -> Self {
        Self::new(
            classifier,
            ImageResolver::new(&cfg.streamed_image_base),
            cfg.live_max_age_sec,
            cfg.ended_grace_sec,
        )
    }

    pub fn classifier(&self) -> &LeagueClassifier {
        &self.classifier
    }

    fn team(&self, raw: Option<&RawTeam>) -> Option<GameTeam> {
        let raw = raw?;
        let name = raw.name.as_deref().unwrap_or("").trim().to_string();
        let logo = self
            .images
            .badge_url(raw.badge.as_deref().or(raw.logo.as_deref()));
        if name.is_empty() && logo.is_none() {
            return None;
        }
        Some(GameTeam {
            name,
            logo,
            score: raw.score(),
            abbreviation: None,
        })
    }

    fn teams(&self, raw: &RawMatch) -> Option<GameTeams> {
        let from_feed = raw.teams.as_ref().map(|t| GameTeams {
            home: self.team(t.home.as_ref()),
            away: self.team(t.away.as_ref()),
        });
        match from_feed {
            Some(teams) if teams.home.is_some() || teams.away.is_some() => Some(teams),
            _ => split_matchup(raw.title()).map(|(away, home)| GameTeams {
                home: Some(GameTeam::named(home)),
                away: Some(GameTeam::named(away)),
            }),
        }
    }

    pub fn parse_match(&self, raw: &RawMatch, listed_live: bool, league: LeagueKey, now_ms: i64) -> Game {
        let match_id = raw.id().trim().to_string();
        let title = raw.title().trim().to_string();
        let category = raw.category().trim().to_lowercase();
        let timestamp = raw.timestamp();
        let liveness = Liveness::derive(timestamp, listed_live, now_ms, self.live_max_age_ms, self.ended_grace_ms);

        let mut sources: Vec<GameSource> = raw
            .sources
            .iter()
            .flatten()
            .filter_map(|s| {
                let name = s.source.as_deref()?.trim();
                let id = s.id.as_deref()?.trim();
                (!name.is_empty() && !id.is_empty()).then(|| GameSource::new(name, id))
            })
            .collect();
        if sources.is_empty() && !match_id.is_empty() {
            sources.push(GameSource::new("admin", match_id.clone()));
        }
        sort_sources(&mut sources);

        let slug = sources
            .first()
            .map(|s| sanitize_slug(&s.id))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| sanitize_slug(&match_id));
        let current_source = sources
            .first()
            .map(|s| s.source.clone())
            .unwrap_or_else(|| "admin".to_string());

        let id = if !match_id.is_empty() {
            format!("api_{match_id}")
        } else {
            let from_title = sanitize_slug(&title);
            if from_title.is_empty() {
                format!("api_{now_ms}")
            } else {
                format!("api_{from_title}")
            }
        };

        Game {
            id,
            slug,
            title,
            poster: self.images.poster_url(raw.poster.as_deref()),
            sport: normalize_category(&category),
            category,
            game_time: timestamp.and_then(iso_from_ms),
            timestamp,
            is_live: liveness.is_live,
            is_upcoming: liveness.is_upcoming,
            is_ended: liveness.is_ended,
            is_popular: raw.popular.unwrap_or(false),
            teams: self.teams(raw),
            sources,
            current_source,
            source: "api".to_string(),
            league,
            match_id,
        }
    }

    fn classify(&self, raw: &RawMatch, scope: LeagueScope) -> Option<LeagueKey> {
        match scope {
            LeagueScope::All => self.classifier.identify(raw),
            LeagueScope::League(league) => self.classifier.is_league_match(raw, league).then_some(league),
        }
    }

    /// Classify, drop scheduled records already listed live, parse, dedupe.
    pub fn build(&self, snapshot: &MatchSnapshot, scope: LeagueScope, now_ms: i64) -> BuildOutcome {
        let mut stats = BuildStats {
            live_raw: snapshot.live.len(),
            all_raw: snapshot.all.len(),
            ..BuildStats::default()
        };

        let live: Vec<(&RawMatch, LeagueKey)> = snapshot
            .live
            .iter()
            .filter_map(|raw| self.classify(raw, scope).map(|league| (raw, league)))
            .collect();
        let live_ids: HashSet<&str> = live.iter().map(|(raw, _)| raw.id()).filter(|id| !id.is_empty()).collect();

        let mut scheduled = Vec::new();
        for raw in &snapshot.all {
            if !raw.id().is_empty() && live_ids.contains(raw.id()) {
                stats.live_overlap += 1;
                continue;
            }
            if let Some(league) = self.classify(raw, scope) {
                scheduled.push((raw, league));
            }
        }
        stats.unmatched = stats.live_raw + stats.all_raw - stats.live_overlap - live.len() - scheduled.len();

        let games: Vec<Game> = live
            .iter()
            .map(|(raw, league)| self.parse_match(raw, true, *league, now_ms))
            .chain(
                scheduled
                    .iter()
                    .map(|(raw, league)| self.parse_match(raw, false, *league, now_ms)),
            )
            .collect();
        let parsed = games.len();
        let games = dedupe_games(games, self.classifier.rules());
        stats.matched = parsed;
        stats.duplicates = parsed - games.len();

        BuildOutcome { games, stats }
    }
}

pub fn filter_games(games: Vec<Game>, filter: GameFilter) -> Vec<Game> {
    match filter {
        GameFilter::All => games,
        GameFilter::Live => games.into_iter().filter(|g| g.is_live).collect(),
        GameFilter::Upcoming => games
            .into_iter()
            .filter(|g| g.is_upcoming && !g.is_live)
            .collect(),
    }
}

/// Match on sanitized slug or match id; otherwise on any source id, returning a copy that
/// points at that source.
pub fn find_by_slug(games: &[Game], slug: &str) -> Option<Game> {
    let wanted = sanitize_slug(slug);
    if wanted.is_empty() {
        return None;
    }
    for game in games {
        if sanitize_slug(&game.slug) == wanted || sanitize_slug(&game.match_id) == wanted {
            return Some(game.clone());
        }
        if let Some(source) = game.sources.iter().find(|s| sanitize_slug(&s.id) == wanted) {
            let mut hit = game.clone();
            hit.slug = wanted;
            hit.current_source = source.source.clone();
            return Some(hit);
        }
    }
    None
}

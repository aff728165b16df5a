//! Player stat tables: pagination, row assembly and leader ranking.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::index::{PlayerTeam, RosterPlayer};
use super::schema::{extract_stat_value, ColumnHeader, StatsMode, TableSchema, TableView};
use crate::adapters::espn::AthleteStats;
use crate::domain::LeagueKey;

pub const DEFAULT_PER_PAGE: usize = 50;
pub const MIN_PER_PAGE: usize = 10;
pub const MAX_PER_PAGE: usize = 200;
pub const DEFAULT_LEADERS_LIMIT: usize = 5;
pub const MAX_LEADERS_LIMIT: usize = 25;

/// Columns where a lower value ranks higher.
pub const ASCENDING_COLUMNS: [&str; 4] = ["era", "whip", "gaa", "ga"];

// =============================================================================
// Pagination
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: usize,
    pub per_page: usize,
    pub offset: usize,
}

impl Page {
    /// Clamp the requested page into range. A page past the end lands on the last page,
    /// zero or negative values land on the first.
    pub fn resolve(page: Option<i64>, per_page: Option<i64>, total: usize) -> Self {
        let per_page = per_page
            .map(|n| n.clamp(MIN_PER_PAGE as i64, MAX_PER_PAGE as i64) as usize)
            .unwrap_or(DEFAULT_PER_PAGE);
        let last = total.div_ceil(per_page).max(1);
        let page = page.unwrap_or(1).clamp(1, last as i64) as usize;
        Self {
            page,
            per_page,
            offset: (page - 1) * per_page,
        }
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset.min(items.len());
        let end = (start + self.per_page).min(items.len());
        &items[start..end]
    }
}

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowAthlete {
    pub id: String,
    pub display_name: Option<String>,
    pub short_name: Option<String>,
    pub headshot: Option<String>,
    pub position: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerRow {
    pub rank: usize,
    pub athlete: RowAthlete,
    pub team: PlayerTeam,
    /// Column key -> display value; `None` when the athlete has no such stat
    pub stats: BTreeMap<String, Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerTable {
    pub columns: Vec<ColumnHeader>,
    pub rows: Vec<PlayerRow>,
}

/// `stats` is `None` when the athlete's statistics could not be loaded; every cell is then null.
pub fn build_row(rank: usize, player: &RosterPlayer, schema: &TableSchema, stats: Option<&AthleteStats>) -> PlayerRow {
    let cells = schema
        .columns
        .iter()
        .map(|column| {
            let value = stats.and_then(|s| extract_stat_value(s, column, &schema.stat_categories));
            (column.key.clone(), value)
        })
        .collect();
    PlayerRow {
        rank,
        athlete: RowAthlete {
            id: player.id.clone(),
            display_name: player.display_name.clone(),
            short_name: player.short_name.clone(),
            headshot: player.headshot.clone(),
            position: player.position.clone(),
        },
        team: player.team.clone(),
        stats: cells,
    }
}

// =============================================================================
// Leaders
// =============================================================================

/// Numeric reading of a display value: `"4,183"`, `".312"`, `"-3"`.
pub fn numeric_value(display: &str) -> Option<f64> {
    let cleaned: String = display.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn sort_value(row: &PlayerRow, key: &str) -> Option<f64> {
    row.stats.get(key)?.as_deref().and_then(numeric_value)
}

/// Order rows by `sort_key`, keep the top `limit` and renumber ranks from 1.
///
/// Rows without a numeric value go last; ties keep their incoming order.
pub fn rank_leaders(mut rows: Vec<PlayerRow>, sort_key: &str, limit: usize) -> Vec<PlayerRow> {
    let ascending = ASCENDING_COLUMNS.contains(&sort_key);
    rows.sort_by(|a, b| match (sort_value(a, sort_key), sort_value(b, sort_key)) {
        (Some(x), Some(y)) => {
            let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            if ascending {
                ord
            } else {
                ord.reverse()
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    rows.truncate(limit);
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i + 1;
    }
    rows
}

/// A ranked leader board as cached per `(league, season, view, mode, position, sort, limit)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadersTable {
    pub league: LeagueKey,
    pub season: i32,
    pub view: TableView,
    pub mode: Option<StatsMode>,
    pub position: Option<String>,
    pub sort: String,
    pub limit: usize,
    /// Players considered before truncation
    pub total: usize,
    pub table: PlayerTable,
    #[serde(skip)]
    pub partial: bool,
}

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use super::{ProviderError, StatsProvider};
use crate::models::{GameLocation, Matchup, PlayerRef, ScheduledGame, StatLine};
use crate::teams::TeamDirectory;

const PER_PAGE: u32 = 100;

/// Stats provider backed by the balldontlie NBA API (v1).
/// Docs: <https://www.balldontlie.io/>
pub struct BallDontLie {
    http: Client,
    api_key: String,
    /// Base URL for overriding in tests
    base_url: String,
    teams: Arc<TeamDirectory>,
}

impl BallDontLie {
    pub fn new(api_key: &str, base_url: Option<&str>, teams: Arc<TeamDirectory>) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(BallDontLie {
            http,
            api_key: api_key.to_string(),
            base_url: base_url
                .unwrap_or("https://api.balldontlie.io/v1")
                .to_string(),
            teams,
        })
    }

    async fn get_json(&self, url: Url) -> Result<serde_json::Value, ProviderError> {
        debug!("GET {}", url);
        let resp = self
            .http
            .get(url)
            .header("Authorization", &self.api_key)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ProviderError::Status(resp.status().as_u16()));
        }

        Ok(resp.json().await?)
    }

    async fn games_page(
        &self,
        team_id: u64,
        from: NaiveDate,
        cursor: Option<u64>,
    ) -> Result<(Vec<ScheduledGame>, Option<u64>), ProviderError> {
        let mut params = vec![
            ("team_ids[]", team_id.to_string()),
            ("start_date", from.to_string()),
            ("per_page", PER_PAGE.to_string()),
        ];
        if let Some(c) = cursor {
            params.push(("cursor", c.to_string()));
        }
        let url = Url::parse_with_params(&format!("{}/games", self.base_url), &params)
            .map_err(|e| ProviderError::Malformed(format!("bad games URL: {e}")))?;

        let raw = self.get_json(url).await?;
        parse_games_page(&raw)
    }

    async fn stats_page(
        &self,
        player_id: u64,
        cursor: Option<u64>,
    ) -> Result<(Vec<StatLine>, Option<u64>), ProviderError> {
        let mut params = vec![
            ("player_ids[]", player_id.to_string()),
            ("per_page", PER_PAGE.to_string()),
        ];
        if let Some(c) = cursor {
            params.push(("cursor", c.to_string()));
        }
        let url = Url::parse_with_params(&format!("{}/stats", self.base_url), &params)
            .map_err(|e| ProviderError::Malformed(format!("bad stats URL: {e}")))?;

        let raw = self.get_json(url).await?;
        parse_stats_page(&raw, &self.teams)
    }
}

#[async_trait]
impl StatsProvider for BallDontLie {
    fn name(&self) -> &str {
        "balldontlie"
    }

    async fn resolve_player(&self, name: &str) -> Result<PlayerRef, ProviderError> {
        let (first, last) = split_name(name);
        let url = Url::parse_with_params(
            &format!("{}/players", self.base_url),
            &[
                ("first_name", first.as_str()),
                ("last_name", last.as_str()),
                ("per_page", "25"),
            ],
        )
        .map_err(|e| ProviderError::Malformed(format!("bad players URL: {e}")))?;

        let raw = self.get_json(url).await?;
        let player = parse_player_search(&raw)?.ok_or_else(|| ProviderError::PlayerNotFound {
            name: name.to_string(),
        })?;
        info!(
            "Resolved '{}' to player {} (team {})",
            name, player.player_id, player.team_id
        );
        Ok(player)
    }

    async fn next_matchup(&self, team_id: u64) -> Result<Matchup, ProviderError> {
        // The provider's dates and tip-off instants are UTC, so the "has it
        // started yet" comparison is done in UTC as well.
        let now = Utc::now().naive_utc();
        let today = now.date();

        let games = drain_cursor(|cursor| self.games_page(team_id, today, cursor)).await?;

        let game = pick_next_game(games, now).ok_or(ProviderError::NoUpcomingGames)?;

        let location = if game.home_team_id == team_id {
            GameLocation::Home
        } else {
            GameLocation::Away
        };
        let opponent_team_id = match location {
            GameLocation::Home => game.away_team_id,
            GameLocation::Away => game.home_team_id,
        };
        let opponent_team_name = self
            .teams
            .name(opponent_team_id)
            .ok_or(ProviderError::UnknownTeam(opponent_team_id))?
            .to_string();

        let matchup = Matchup {
            game_id: game.game_id,
            date: game.date,
            status: game.status,
            season: game.season,
            home_team_id: game.home_team_id,
            away_team_id: game.away_team_id,
            location,
            opponent_team_id,
            opponent_team_name,
        };
        info!(
            "Next game for team {}: {} {} on {}",
            team_id,
            matchup.game_id,
            matchup.venue_line(),
            matchup.date
        );
        Ok(matchup)
    }

    async fn game_log(&self, player_id: u64) -> Result<Vec<StatLine>, ProviderError> {
        let lines = drain_cursor(|cursor| self.stats_page(player_id, cursor)).await?;
        info!("Fetched {} stat lines for player {}", lines.len(), player_id);
        Ok(lines)
    }
}

/// Walk a cursor-paged endpoint to exhaustion. The whole result is dropped
/// if any page fails; a partial log is never returned as complete.
pub(crate) async fn drain_cursor<T, F, Fut>(mut fetch_page: F) -> Result<Vec<T>, ProviderError>
where
    F: FnMut(Option<u64>) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, Option<u64>), ProviderError>>,
{
    let mut all = Vec::new();
    let mut cursor = None;
    loop {
        let (batch, next) = fetch_page(cursor).await?;
        all.extend(batch);
        match next {
            Some(c) => cursor = Some(c),
            None => break,
        }
    }
    Ok(all)
}

/// Split a free-text name at the first whitespace boundary.
/// "LeBron James" → ("LeBron", "James"); "Shai Gilgeous Alexander" →
/// ("Shai", "Gilgeous Alexander"). Single-token input searches on the
/// token as given name with an empty family name.
pub(crate) fn split_name(name: &str) -> (String, String) {
    let mut tokens = name.split_whitespace();
    let first = tokens.next().unwrap_or_default().to_string();
    let last = tokens.collect::<Vec<_>>().join(" ");
    (first, last)
}

/// Sort the schedule ascending and pick the first game that has not started:
/// any later calendar date qualifies; a game today qualifies only when its
/// tip-off is strictly after `now` (unknown tip-off today counts as already
/// underway).
///
/// `now` and the schedule must be in the same timezone (the provider sends
/// UTC, so callers pass a UTC now). When a tip-off instant is known, its
/// calendar date wins over the `date` field, so a game cannot dodge the
/// started-already check by carrying a date ahead of its own tip-off.
pub(crate) fn pick_next_game(
    mut games: Vec<ScheduledGame>,
    now: NaiveDateTime,
) -> Option<ScheduledGame> {
    // Providers usually return the schedule in order, but the selection
    // contract requires it, so re-sort explicitly. Stable on equal keys.
    games.sort_by_key(|g| (game_date_for_selection(g), g.tip_off));

    let today = now.date();
    games.into_iter().find(|g| {
        let date = game_date_for_selection(g);
        if date > today {
            true
        } else if date == today {
            matches!(g.tip_off, Some(t) if t > now)
        } else {
            false
        }
    })
}

fn game_date_for_selection(g: &ScheduledGame) -> NaiveDate {
    g.tip_off.map(|t| t.date()).unwrap_or(g.date)
}

// ── Parsing helpers ────────────────────────────────────────────────────────────

fn parse_player_search(raw: &serde_json::Value) -> Result<Option<PlayerRef>, ProviderError> {
    let hits = raw["data"]
        .as_array()
        .ok_or_else(|| ProviderError::Malformed("player search: 'data' not an array".into()))?;

    let Some(hit) = hits.first() else {
        return Ok(None);
    };

    let player_id = hit["id"]
        .as_u64()
        .ok_or_else(|| ProviderError::Malformed("player search: missing player id".into()))?;
    let team_id = hit["team"]["id"]
        .as_u64()
        .ok_or_else(|| ProviderError::Malformed("player search: missing team id".into()))?;

    Ok(Some(PlayerRef { player_id, team_id }))
}

fn parse_games_page(
    raw: &serde_json::Value,
) -> Result<(Vec<ScheduledGame>, Option<u64>), ProviderError> {
    let rows = raw["data"]
        .as_array()
        .ok_or_else(|| ProviderError::Malformed("games: 'data' not an array".into()))?;

    let games = rows
        .iter()
        .map(|row| {
            let game_id = row["id"]
                .as_u64()
                .ok_or_else(|| ProviderError::Malformed("games: missing game id".into()))?;
            let date = parse_game_date(&row["date"])
                .ok_or_else(|| ProviderError::Malformed("games: unparseable date".into()))?;
            let status = row["status"].as_str().unwrap_or_default().to_string();
            // For unplayed games the status field carries the scheduled
            // tip-off as an ISO timestamp; for finished ones it is "Final".
            let tip_off = parse_tip_off(&status);
            let season = row["season"].as_i64().unwrap_or_default() as i32;
            let home_team_id = row["home_team"]["id"]
                .as_u64()
                .ok_or_else(|| ProviderError::Malformed("games: missing home team id".into()))?;
            let away_team_id = row["visitor_team"]["id"]
                .as_u64()
                .ok_or_else(|| ProviderError::Malformed("games: missing visitor team id".into()))?;

            Ok(ScheduledGame {
                game_id,
                date,
                tip_off,
                status,
                season,
                home_team_id,
                away_team_id,
            })
        })
        .collect::<Result<Vec<_>, ProviderError>>()?;

    // Every v1 endpoint paginates by cursor, the schedule included.
    let next_cursor = raw["meta"]["next_cursor"]
        .as_u64()
        .or_else(|| raw["meta"]["next_cursor"].as_str().and_then(|s| s.parse().ok()));
    Ok((games, next_cursor))
}

fn parse_stats_page(
    raw: &serde_json::Value,
    teams: &TeamDirectory,
) -> Result<(Vec<StatLine>, Option<u64>), ProviderError> {
    let rows = raw["data"]
        .as_array()
        .ok_or_else(|| ProviderError::Malformed("stats: 'data' not an array".into()))?;

    let lines = rows
        .iter()
        .map(|row| {
            let game = &row["game"];
            let game_id = game["id"]
                .as_u64()
                .ok_or_else(|| ProviderError::Malformed("stats: missing game id".into()))?;
            let game_date = parse_game_date(&game["date"])
                .ok_or_else(|| ProviderError::Malformed("stats: unparseable game date".into()))?;
            let player_id = row["player"]["id"]
                .as_u64()
                .ok_or_else(|| ProviderError::Malformed("stats: missing player id".into()))?;
            let player_full_name = format!(
                "{} {}",
                row["player"]["first_name"].as_str().unwrap_or_default(),
                row["player"]["last_name"].as_str().unwrap_or_default()
            );
            let player_team_id = row["team"]["id"]
                .as_u64()
                .ok_or_else(|| ProviderError::Malformed("stats: missing team id".into()))?;
            let player_team_name = row["team"]["full_name"].as_str().unwrap_or_default().to_string();

            let home_team_id = game["home_team_id"].as_u64().ok_or_else(|| {
                ProviderError::Malformed("stats: missing home team id".into())
            })?;
            let visitor_team_id = game["visitor_team_id"].as_u64().ok_or_else(|| {
                ProviderError::Malformed("stats: missing visitor team id".into())
            })?;

            let home_team = home_team_id == player_team_id;
            let opponent_team_id = if home_team { visitor_team_id } else { home_team_id };
            let opponent_team_name = teams
                .name(opponent_team_id)
                .ok_or(ProviderError::UnknownTeam(opponent_team_id))?
                .to_string();

            Ok(StatLine {
                game_id,
                game_date,
                player_id,
                player_full_name,
                player_team_id,
                player_team_name,
                home_team,
                opponent_team_id,
                opponent_team_name,
                points: metric(&row["pts"]),
                rebounds: metric(&row["reb"]),
                assists: metric(&row["ast"]),
                steals: metric(&row["stl"]),
                blocks: metric(&row["blk"]),
                fg_percentage: metric(&row["fg_pct"]),
                minutes_played: parse_minutes(&row["min"]),
            })
        })
        .collect::<Result<Vec<_>, ProviderError>>()?;

    let next_cursor = raw["meta"]["next_cursor"]
        .as_u64()
        .or_else(|| raw["meta"]["next_cursor"].as_str().and_then(|s| s.parse().ok()));
    Ok((lines, next_cursor))
}

/// The provider sends dates either bare ("2024-01-26") or as a full ISO
/// timestamp; only the calendar date matters for bucketing.
fn parse_game_date(v: &serde_json::Value) -> Option<NaiveDate> {
    let s = v.as_str()?;
    NaiveDate::parse_from_str(s.get(..10)?, "%Y-%m-%d").ok()
}

fn parse_tip_off(status: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(status, "%Y-%m-%dT%H:%M:%S%.fZ")
        .or_else(|_| NaiveDateTime::parse_from_str(status, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

/// Box-score numbers arrive as JSON numbers or numeric strings; null means
/// the metric was not recorded (e.g. fg_pct with zero attempts).
fn metric(v: &serde_json::Value) -> f64 {
    v.as_f64()
        .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
        .unwrap_or(0.0)
}

/// Minutes come as "34", "34:21", or a plain number.
fn parse_minutes(v: &serde_json::Value) -> f64 {
    if let Some(n) = v.as_f64() {
        return n;
    }
    let Some(s) = v.as_str() else { return 0.0 };
    match s.split_once(':') {
        Some((m, sec)) => {
            let m: f64 = m.parse().unwrap_or(0.0);
            let sec: f64 = sec.parse().unwrap_or(0.0);
            m + sec / 60.0
        }
        None => s.parse().unwrap_or(0.0),
    }
}

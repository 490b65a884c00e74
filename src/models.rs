use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A resolved player: stable provider id plus the team they currently play for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerRef {
    pub player_id: u64,
    pub team_id: u64,
}

/// Whether the subject team hosts the game or travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameLocation {
    Home,
    Away,
}

/// One row of the provider's schedule feed, before next-game selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledGame {
    pub game_id: u64,
    /// Calendar date as reported by the provider (UTC-derived).
    pub date: NaiveDate,
    /// Scheduled start instant in UTC; absent when the provider only knows
    /// the date.
    pub tip_off: Option<NaiveDateTime>,
    pub status: String,
    pub season: i32,
    pub home_team_id: u64,
    pub away_team_id: u64,
}

/// The next unplayed game for a team, opponent already derived.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Matchup {
    pub game_id: u64,
    pub date: NaiveDate,
    pub status: String,
    pub season: i32,
    pub home_team_id: u64,
    pub away_team_id: u64,
    /// Home/away relative to the team the lookup was made for.
    pub location: GameLocation,
    pub opponent_team_id: u64,
    pub opponent_team_name: String,
}

impl Matchup {
    /// "vs Boston Celtics" at home, "@ Boston Celtics" on the road.
    pub fn venue_line(&self) -> String {
        match self.location {
            GameLocation::Home => format!("vs {}", self.opponent_team_name),
            GameLocation::Away => format!("@ {}", self.opponent_team_name),
        }
    }
}

/// One completed game's box score for one player.
///
/// The serde field names double as the aggregation-store document schema,
/// so renaming a field here is a breaking change for stored documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatLine {
    pub game_id: u64,
    pub game_date: NaiveDate,
    pub player_id: u64,
    pub player_full_name: String,
    pub player_team_id: u64,
    pub player_team_name: String,
    pub home_team: bool,
    pub opponent_team_id: u64,
    pub opponent_team_name: String,
    pub points: f64,
    pub rebounds: f64,
    pub assists: f64,
    pub steals: f64,
    pub blocks: f64,
    /// Field-goal percentage in 0.0–1.0.
    pub fg_percentage: f64,
    pub minutes_played: f64,
}

/// Mean per-game production over some filtered set of stat lines.
/// Every metric is `0.0` over an empty set, never NaN or missing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AverageStats {
    pub points: f64,
    pub rebounds: f64,
    pub assists: f64,
    pub steals: f64,
    pub blocks: f64,
    pub fg_percentage: f64,
}

/// Both aggregation windows for one player against one opponent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlayerAverages {
    /// All meetings with the opponent, any season.
    pub historical: AverageStats,
    /// Meetings with the opponent inside the configured season window.
    pub season: AverageStats,
}

/// Inclusive date range for the active season.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Upcoming-opponent summary carried in the comparison output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NextOpponent {
    pub team_id: u64,
    pub team_name: String,
    pub game_date: NaiveDate,
    pub location: GameLocation,
}

/// One side of a finished comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerComparison {
    pub name: String,
    pub player_id: u64,
    pub team_id: u64,
    pub next_opponent: NextOpponent,
    pub season_averages: AverageStats,
    pub historical_averages: AverageStats,
    /// Combined weighted fantasy score (season-weighted, see scoring).
    pub score: f64,
}

/// The engine's output: both sides, the pick, and the rendered explanation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub player1: PlayerComparison,
    pub player2: PlayerComparison,
    /// Name of the higher-scoring player (player1 on an exact tie).
    pub recommendation: String,
    pub details: String,
}

use chrono::NaiveDate;
use clap::Parser;

use crate::engine::ScoringWeights;
use crate::models::SeasonWindow;

/// NBA fantasy matchup comparator
#[derive(Parser, Debug, Clone)]
#[command(name = "fantasy-matchup", version, about)]
pub struct Config {
    /// First player to compare (free-text name, e.g. "LeBron James")
    pub player1: String,

    /// Second player to compare
    pub player2: String,

    /// Stats provider (balldontlie) base URL
    #[arg(
        long,
        env = "NBA_STATS_API_URL",
        default_value = "https://api.balldontlie.io/v1"
    )]
    pub nba_api_url: String,

    /// Stats provider API key
    #[arg(long, env = "NBA_STATS_API_KEY")]
    pub nba_api_key: String,

    /// Elasticsearch endpoint holding the stat-line index
    #[arg(long, env = "ELASTIC_ENDPOINT")]
    pub elastic_endpoint: String,

    /// Elasticsearch API key
    #[arg(long, env = "ELASTIC_API_KEY")]
    pub elastic_api_key: String,

    /// Index name for per-game stat-line documents
    #[arg(long, env = "ELASTIC_INDEX", default_value = "career-stats")]
    pub elastic_index: String,

    /// First day of the current season window (inclusive)
    #[arg(long, env = "SEASON_START", default_value = "2024-10-01")]
    pub season_start: NaiveDate,

    /// Last day of the current season window (inclusive)
    #[arg(long, env = "SEASON_END", default_value = "2025-06-30")]
    pub season_end: NaiveDate,

    /// Weight of current-season averages in the combined score (0.0–1.0)
    #[arg(long, env = "SEASON_WEIGHT", default_value = "0.7")]
    pub season_weight: f64,

    /// Weight of career averages in the combined score (0.0–1.0)
    #[arg(long, env = "HISTORICAL_WEIGHT", default_value = "0.3")]
    pub historical_weight: f64,

    /// Overall time budget for one comparison, in seconds
    #[arg(long, env = "COMPARE_TIMEOUT_SECS", default_value = "30")]
    pub timeout_secs: u64,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.season_weight) {
            anyhow::bail!("season_weight must be between 0.0 and 1.0");
        }
        if !(0.0..=1.0).contains(&self.historical_weight) {
            anyhow::bail!("historical_weight must be between 0.0 and 1.0");
        }
        if self.season_start >= self.season_end {
            anyhow::bail!("season_start must be before season_end");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be positive");
        }
        Ok(())
    }

    pub fn season_window(&self) -> SeasonWindow {
        SeasonWindow {
            start: self.season_start,
            end: self.season_end,
        }
    }

    pub fn scoring_weights(&self) -> ScoringWeights {
        ScoringWeights {
            season: self.season_weight,
            historical: self.historical_weight,
            ..Default::default()
        }
    }
}

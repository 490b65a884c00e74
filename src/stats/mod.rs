pub mod bdl;

pub use bdl::BallDontLie;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Matchup, PlayerRef, StatLine};

/// Failures at the stats-provider boundary. Transport detail stays in here;
/// the engine maps these to its own caller-facing kinds.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no player found matching '{name}'")]
    PlayerNotFound { name: String },

    #[error("no upcoming games on the schedule")]
    NoUpcomingGames,

    /// A game referenced a team id the directory cannot resolve. The
    /// operation fails closed rather than surfacing a bare id.
    #[error("unknown team id {0}")]
    UnknownTeam(u64),

    #[error("malformed provider response: {0}")]
    Malformed(String),

    #[error("provider returned HTTP {0}")]
    Status(u16),

    #[error("provider request failed")]
    Http(#[from] reqwest::Error),
}

/// Trait every upstream stats provider must implement.
#[async_trait]
pub trait StatsProvider: Send + Sync {
    /// Resolve a free-text player name to a provider id and current team.
    ///
    /// The name is split on the first whitespace boundary: first token is the
    /// given name, the joined remainder the family name. Lossy for
    /// multi-word given names ("Karl Anthony Towns" searches for family name
    /// "Anthony Towns"); callers wanting better should pre-normalise.
    async fn resolve_player(&self, name: &str) -> Result<PlayerRef, ProviderError>;

    /// The team's next unplayed game, opponent derived home/away-aware.
    async fn next_matchup(&self, team_id: u64) -> Result<Matchup, ProviderError>;

    /// Every completed game for the player, cursor-paged to exhaustion.
    ///
    /// Discard-on-partial-failure: if any page fails mid-pagination the whole
    /// fetch fails and already-fetched pages are dropped, so a partial log is
    /// never presented as complete.
    async fn game_log(&self, player_id: u64) -> Result<Vec<StatLine>, ProviderError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

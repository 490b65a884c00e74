pub mod elastic;

pub use elastic::ElasticStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::PlayerAverages;

/// Failures at the aggregation-store boundary. Both sub-queries of an
/// averages lookup fail together as one of these.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("malformed store response: {0}")]
    Malformed(String),

    #[error("store returned HTTP {0}")]
    Status(u16),

    #[error("store request failed")]
    Http(#[from] reqwest::Error),
}

/// Trait over the indexed stat-line corpus the engine aggregates against.
#[async_trait]
pub trait AveragesStore: Send + Sync {
    /// Mean production for a player against one opponent, over all time and
    /// over the configured season window. Metrics with no matching games
    /// come back as `0.0`.
    async fn averages(
        &self,
        player_id: u64,
        opponent_team_id: u64,
    ) -> Result<PlayerAverages, QueryError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

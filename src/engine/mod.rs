pub mod report;
pub mod scoring;

pub use scoring::ScoringWeights;

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{
    ComparisonResult, Matchup, NextOpponent, PlayerAverages, PlayerComparison, PlayerRef,
};
use crate::stats::{ProviderError, StatsProvider};
use crate::store::{AveragesStore, QueryError};
use crate::teams::TeamDirectory;

/// The only error the engine ever lets out. Each variant names the failing
/// player; transport detail (HTTP statuses, URLs) never crosses this
/// boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompareError {
    #[error("player not found: {which}")]
    EntityNotFound { which: String },

    #[error("no upcoming matchup for {which}")]
    NoUpcomingMatchup { which: String },

    #[error("stats unavailable for {which}")]
    StatsUnavailable { which: String },

    #[error("stats query failed for {which}")]
    QueryFailure { which: String },

    #[error("internal failure")]
    Internal,

    #[error("comparison timed out")]
    Timeout,
}

/// Orchestrates one player-vs-player comparison: resolve both names, find
/// both next matchups, pull opponent-scoped averages, score, and assemble.
///
/// The two players' pipelines run concurrently but in lock-step stages, so a
/// resolution failure for either name stops the comparison before any
/// matchup or stats call is made. All state is request-scoped; the engine
/// itself is immutable and shareable.
pub struct ComparisonEngine {
    stats: Arc<dyn StatsProvider>,
    store: Arc<dyn AveragesStore>,
    teams: Arc<TeamDirectory>,
    weights: ScoringWeights,
    /// Overall wall-clock budget for one comparison; in-flight calls are
    /// dropped when it elapses.
    deadline: Option<Duration>,
}

impl ComparisonEngine {
    pub fn new(
        stats: Arc<dyn StatsProvider>,
        store: Arc<dyn AveragesStore>,
        teams: Arc<TeamDirectory>,
        weights: ScoringWeights,
        deadline: Option<Duration>,
    ) -> Self {
        ComparisonEngine {
            stats,
            store,
            teams,
            weights,
            deadline,
        }
    }

    /// Compare two players by name. All-or-nothing: either a fully populated
    /// result or a `CompareError`, never a partial comparison.
    pub async fn compare(
        &self,
        name1: &str,
        name2: &str,
    ) -> Result<ComparisonResult, CompareError> {
        match self.deadline {
            Some(budget) => tokio::time::timeout(budget, self.compare_inner(name1, name2))
                .await
                .unwrap_or_else(|_| {
                    warn!("Comparison of '{}' vs '{}' timed out", name1, name2);
                    Err(CompareError::Timeout)
                }),
            None => self.compare_inner(name1, name2).await,
        }
    }

    async fn compare_inner(
        &self,
        name1: &str,
        name2: &str,
    ) -> Result<ComparisonResult, CompareError> {
        // Stage 1: resolve both names. Nothing else runs until both are in.
        let (r1, r2) = join(
            self.stats.resolve_player(name1),
            self.stats.resolve_player(name2),
        )
        .await;
        let player1 = r1.map_err(|e| map_resolve_error(e, name1))?;
        let player2 = r2.map_err(|e| map_resolve_error(e, name2))?;
        self.require_known_team(player1.team_id)?;
        self.require_known_team(player2.team_id)?;

        // Stage 2: both next matchups.
        let (m1, m2) = join(
            self.stats.next_matchup(player1.team_id),
            self.stats.next_matchup(player2.team_id),
        )
        .await;
        let matchup1 = m1.map_err(|e| map_matchup_error(e, name1))?;
        let matchup2 = m2.map_err(|e| map_matchup_error(e, name2))?;

        // Stage 3: opponent-scoped averages for both.
        let (a1, a2) = join(
            self.store
                .averages(player1.player_id, matchup1.opponent_team_id),
            self.store
                .averages(player2.player_id, matchup2.opponent_team_id),
        )
        .await;
        let averages1 = a1.map_err(|e| map_query_error(e, name1))?;
        let averages2 = a2.map_err(|e| map_query_error(e, name2))?;

        let side1 = self.build_side(name1, player1, matchup1, averages1);
        let side2 = self.build_side(name2, player2, matchup2, averages2);

        let recommendation =
            pick_recommendation(&side1.name, side1.score, &side2.name, side2.score).to_string();
        let details = report::render_details(&side1, &side2, &recommendation);

        info!(
            "Comparison done: {} {:.1} vs {} {:.1} -> {}",
            side1.name, side1.score, side2.name, side2.score, recommendation
        );

        Ok(ComparisonResult {
            player1: side1,
            player2: side2,
            recommendation,
            details,
        })
    }

    /// Fail closed on a team id the directory cannot name.
    fn require_known_team(&self, team_id: u64) -> Result<(), CompareError> {
        if self.teams.name(team_id).is_none() {
            warn!("Resolved player carries unknown team id {}", team_id);
            return Err(CompareError::Internal);
        }
        Ok(())
    }

    fn build_side(
        &self,
        name: &str,
        player: PlayerRef,
        matchup: Matchup,
        averages: PlayerAverages,
    ) -> PlayerComparison {
        let score = scoring::weighted_score(&averages, &self.weights);
        PlayerComparison {
            name: name.to_string(),
            player_id: player.player_id,
            team_id: player.team_id,
            next_opponent: NextOpponent {
                team_id: matchup.opponent_team_id,
                team_name: matchup.opponent_team_name,
                game_date: matchup.date,
                location: matchup.location,
            },
            season_averages: averages.season,
            historical_averages: averages.historical,
            score,
        }
    }
}

/// Strictly greater score wins; an exact tie goes to the first player.
/// Arbitrary but stable, so callers always get a pick.
pub(crate) fn pick_recommendation<'a>(
    name1: &'a str,
    score1: f64,
    name2: &'a str,
    score2: f64,
) -> &'a str {
    if score2 > score1 {
        name2
    } else {
        name1
    }
}

fn map_resolve_error(e: ProviderError, name: &str) -> CompareError {
    match e {
        ProviderError::PlayerNotFound { .. } => CompareError::EntityNotFound {
            which: name.to_string(),
        },
        other => {
            warn!("Resolution of '{}' failed: {}", name, other);
            CompareError::Internal
        }
    }
}

fn map_matchup_error(e: ProviderError, name: &str) -> CompareError {
    match e {
        ProviderError::NoUpcomingGames => CompareError::NoUpcomingMatchup {
            which: name.to_string(),
        },
        other => {
            warn!("Matchup lookup for '{}' failed: {}", name, other);
            CompareError::Internal
        }
    }
}

fn map_query_error(e: QueryError, name: &str) -> CompareError {
    match e {
        QueryError::Malformed(msg) => {
            warn!("Malformed store response for '{}': {}", name, msg);
            CompareError::QueryFailure {
                which: name.to_string(),
            }
        }
        other => {
            warn!("Averages query for '{}' failed: {}", name, other);
            CompareError::StatsUnavailable {
                which: name.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AverageStats, GameLocation, StatLine};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn matchup_vs_warriors() -> Matchup {
        Matchup {
            game_id: 1038184,
            date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            status: "2025-01-15T02:30:00.000Z".into(),
            season: 2024,
            home_team_id: 10,
            away_team_id: 14,
            location: GameLocation::Away,
            opponent_team_id: 10,
            opponent_team_name: "Golden State Warriors".into(),
        }
    }

    fn averages_scoring(points: f64) -> PlayerAverages {
        let avg = AverageStats {
            points,
            ..Default::default()
        };
        PlayerAverages {
            historical: avg,
            season: avg,
        }
    }

    #[derive(Default)]
    struct MockStats {
        players: HashMap<String, PlayerRef>,
        /// Teams with a scheduled game; any other team id has none.
        matchups: HashMap<u64, Matchup>,
        resolve_calls: AtomicUsize,
        matchup_calls: AtomicUsize,
        resolve_delay: Option<Duration>,
    }

    #[async_trait]
    impl StatsProvider for MockStats {
        fn name(&self) -> &str {
            "mock-stats"
        }

        async fn resolve_player(&self, name: &str) -> Result<PlayerRef, ProviderError> {
            self.resolve_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.resolve_delay {
                tokio::time::sleep(delay).await;
            }
            self.players
                .get(name)
                .copied()
                .ok_or_else(|| ProviderError::PlayerNotFound {
                    name: name.to_string(),
                })
        }

        async fn next_matchup(&self, team_id: u64) -> Result<Matchup, ProviderError> {
            self.matchup_calls.fetch_add(1, Ordering::SeqCst);
            self.matchups
                .get(&team_id)
                .cloned()
                .ok_or(ProviderError::NoUpcomingGames)
        }

        async fn game_log(&self, _player_id: u64) -> Result<Vec<StatLine>, ProviderError> {
            Ok(vec![])
        }
    }

    #[derive(Default)]
    struct MockStore {
        averages: HashMap<u64, PlayerAverages>,
        fail_for: Option<u64>,
        malformed_for: Option<u64>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl AveragesStore for MockStore {
        fn name(&self) -> &str {
            "mock-store"
        }

        async fn averages(
            &self,
            player_id: u64,
            _opponent_team_id: u64,
        ) -> Result<PlayerAverages, QueryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_for == Some(player_id) {
                return Err(QueryError::Status(503));
            }
            if self.malformed_for == Some(player_id) {
                return Err(QueryError::Malformed("missing 'aggregations'".into()));
            }
            Ok(self
                .averages
                .get(&player_id)
                .copied()
                .unwrap_or(averages_scoring(0.0)))
        }
    }

    fn two_player_stats() -> MockStats {
        let mut players = HashMap::new();
        players.insert("LeBron James".to_string(), PlayerRef { player_id: 237, team_id: 14 });
        players.insert("Stephen Curry".to_string(), PlayerRef { player_id: 115, team_id: 10 });
        let mut matchups = HashMap::new();
        matchups.insert(14, matchup_vs_warriors());
        matchups.insert(
            10,
            Matchup {
                location: GameLocation::Home,
                opponent_team_id: 14,
                opponent_team_name: "Los Angeles Lakers".into(),
                ..matchup_vs_warriors()
            },
        );
        MockStats {
            players,
            matchups,
            ..Default::default()
        }
    }

    fn engine(stats: MockStats, store: MockStore, deadline: Option<Duration>) -> ComparisonEngine {
        ComparisonEngine::new(
            Arc::new(stats),
            Arc::new(store),
            Arc::new(TeamDirectory::new()),
            ScoringWeights::default(),
            deadline,
        )
    }

    #[tokio::test]
    async fn test_compare_recommends_higher_score() {
        let mut store = MockStore::default();
        store.averages.insert(237, averages_scoring(25.0));
        store.averages.insert(115, averages_scoring(30.0));

        let engine = engine(two_player_stats(), store, None);
        let result = engine.compare("LeBron James", "Stephen Curry").await.unwrap();

        assert_eq!(result.recommendation, "Stephen Curry");
        assert!(result.player2.score > result.player1.score);
        assert!(result.details.contains("Recommendation: start Stephen Curry"));
        assert_eq!(result.player1.next_opponent.team_id, 10);
        assert_eq!(result.player1.next_opponent.location, GameLocation::Away);
    }

    #[tokio::test]
    async fn test_compare_tie_goes_to_first_player() {
        let mut store = MockStore::default();
        store.averages.insert(237, averages_scoring(25.0));
        store.averages.insert(115, averages_scoring(25.0));

        let engine = engine(two_player_stats(), store, None);
        let result = engine.compare("LeBron James", "Stephen Curry").await.unwrap();
        assert_eq!(result.recommendation, "LeBron James");
    }

    #[tokio::test]
    async fn test_resolution_failure_short_circuits_everything() {
        let stats = Arc::new(two_player_stats());
        let store = Arc::new(MockStore::default());
        let engine = ComparisonEngine::new(
            stats.clone(),
            store.clone(),
            Arc::new(TeamDirectory::new()),
            ScoringWeights::default(),
            None,
        );

        let err = engine
            .compare("LeBron James", "Nosuch Player")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CompareError::EntityNotFound {
                which: "Nosuch Player".to_string()
            }
        );

        // Resolution for both names was attempted, but nothing past stage 1.
        assert_eq!(stats.resolve_calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            stats.matchup_calls.load(Ordering::SeqCst),
            0,
            "no matchup call may follow a failed resolution"
        );
        assert_eq!(
            store.calls.load(Ordering::SeqCst),
            0,
            "no averages call may follow a failed resolution"
        );
    }

    #[tokio::test]
    async fn test_no_upcoming_matchup() {
        let mut stats = two_player_stats();
        stats.matchups.remove(&10);
        let mut store = MockStore::default();
        store.averages.insert(237, averages_scoring(25.0));

        let engine = engine(stats, store, None);
        let err = engine
            .compare("LeBron James", "Stephen Curry")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CompareError::NoUpcomingMatchup {
                which: "Stephen Curry".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_store_failure_for_second_player() {
        let mut store = MockStore::default();
        store.averages.insert(237, averages_scoring(25.0));
        store.fail_for = Some(115);

        let engine = engine(two_player_stats(), store, None);
        let err = engine
            .compare("LeBron James", "Stephen Curry")
            .await
            .unwrap_err();
        // Player 1's query succeeded; the comparison still fails whole.
        assert_eq!(
            err,
            CompareError::StatsUnavailable {
                which: "Stephen Curry".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_malformed_store_payload_is_query_failure() {
        let mut store = MockStore::default();
        store.averages.insert(115, averages_scoring(25.0));
        store.malformed_for = Some(237);

        let engine = engine(two_player_stats(), store, None);
        let err = engine
            .compare("LeBron James", "Stephen Curry")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            CompareError::QueryFailure {
                which: "LeBron James".to_string()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_maps_to_timeout() {
        let mut stats = two_player_stats();
        stats.resolve_delay = Some(Duration::from_secs(60));
        let engine = engine(stats, MockStore::default(), Some(Duration::from_secs(1)));

        let err = engine
            .compare("LeBron James", "Stephen Curry")
            .await
            .unwrap_err();
        assert_eq!(err, CompareError::Timeout);
    }

    #[test]
    fn test_pick_recommendation_law() {
        assert_eq!(pick_recommendation("a", 2.0, "b", 1.0), "a");
        assert_eq!(pick_recommendation("a", 1.0, "b", 2.0), "b");
        assert_eq!(pick_recommendation("a", 1.0, "b", 1.0), "a");
    }
}

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use super::{AveragesStore, QueryError};
use crate::models::{AverageStats, PlayerAverages, SeasonWindow};

/// Averages store backed by an Elasticsearch index of stat-line documents
/// (one document per player per game, snake_case fields as serialised by
/// `StatLine`).
pub struct ElasticStore {
    http: Client,
    endpoint: String,
    api_key: String,
    index: String,
    season: SeasonWindow,
}

impl ElasticStore {
    pub fn new(
        endpoint: &str,
        api_key: &str,
        index: &str,
        season: SeasonWindow,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ElasticStore {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            index: index.to_string(),
            season,
        })
    }

    async fn search_averages(
        &self,
        player_id: u64,
        opponent_team_id: u64,
        season_only: bool,
    ) -> Result<AverageStats, QueryError> {
        let mut must = vec![
            json!({ "term": { "player_id": player_id } }),
            json!({ "term": { "opponent_team_id": opponent_team_id } }),
        ];
        if season_only {
            must.push(json!({
                "range": {
                    "game_date": {
                        "gte": self.season.start.to_string(),
                        "lte": self.season.end.to_string(),
                    }
                }
            }));
        }

        let body = json!({
            "size": 0,
            "query": { "bool": { "must": must } },
            "aggs": {
                "avg_points":        { "avg": { "field": "points" } },
                "avg_rebounds":      { "avg": { "field": "rebounds" } },
                "avg_assists":       { "avg": { "field": "assists" } },
                "avg_steals":        { "avg": { "field": "steals" } },
                "avg_blocks":        { "avg": { "field": "blocks" } },
                "avg_fg_percentage": { "avg": { "field": "fg_percentage" } },
            }
        });

        let url = format!("{}/{}/_search", self.endpoint, self.index);
        debug!(
            "Aggregating {} averages for player {} vs team {}",
            if season_only { "season" } else { "historical" },
            player_id,
            opponent_team_id
        );

        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("ApiKey {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(QueryError::Status(resp.status().as_u16()));
        }

        let raw: serde_json::Value = resp.json().await?;
        parse_aggregations(&raw)
    }
}

#[async_trait]
impl AveragesStore for ElasticStore {
    fn name(&self) -> &str {
        "elasticsearch"
    }

    async fn averages(
        &self,
        player_id: u64,
        opponent_team_id: u64,
    ) -> Result<PlayerAverages, QueryError> {
        // Both windows are queried together and fail together.
        let (historical, season) = tokio::try_join!(
            self.search_averages(player_id, opponent_team_id, false),
            self.search_averages(player_id, opponent_team_id, true),
        )?;
        Ok(PlayerAverages { historical, season })
    }
}

// ── Parsing helpers ────────────────────────────────────────────────────────────

fn parse_aggregations(raw: &serde_json::Value) -> Result<AverageStats, QueryError> {
    let aggs = raw
        .get("aggregations")
        .ok_or_else(|| QueryError::Malformed("missing 'aggregations'".into()))?;

    Ok(AverageStats {
        points: agg_value(aggs, "avg_points")?,
        rebounds: agg_value(aggs, "avg_rebounds")?,
        assists: agg_value(aggs, "avg_assists")?,
        steals: agg_value(aggs, "avg_steals")?,
        blocks: agg_value(aggs, "avg_blocks")?,
        fg_percentage: agg_value(aggs, "avg_fg_percentage")?,
    })
}

/// An avg aggregation over zero matching documents reports `"value": null`;
/// that maps to 0.0 so downstream scoring is always defined.
fn agg_value(aggs: &serde_json::Value, name: &str) -> Result<f64, QueryError> {
    let agg = aggs
        .get(name)
        .ok_or_else(|| QueryError::Malformed(format!("missing aggregation '{name}'")))?;
    Ok(agg["value"].as_f64().unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    #[test]
    fn test_parse_aggregations() {
        let raw = json!({
            "took": 3,
            "hits": { "total": { "value": 12 } },
            "aggregations": {
                "avg_points":        { "value": 25.0 },
                "avg_rebounds":      { "value": 7.0 },
                "avg_assists":       { "value": 8.0 },
                "avg_steals":        { "value": 1.0 },
                "avg_blocks":        { "value": 0.5 },
                "avg_fg_percentage": { "value": 0.52 }
            }
        });
        let avg = parse_aggregations(&raw).unwrap();
        assert_relative_eq!(avg.points, 25.0);
        assert_relative_eq!(avg.fg_percentage, 0.52);
    }

    #[test]
    fn test_parse_aggregations_null_values_become_zero() {
        let raw = json!({
            "aggregations": {
                "avg_points":        { "value": null },
                "avg_rebounds":      { "value": null },
                "avg_assists":       { "value": null },
                "avg_steals":        { "value": null },
                "avg_blocks":        { "value": null },
                "avg_fg_percentage": { "value": null }
            }
        });
        let avg = parse_aggregations(&raw).unwrap();
        assert_eq!(avg, AverageStats::default());
        assert!(avg.points.is_finite());
    }

    #[test]
    fn test_parse_aggregations_missing_block_is_malformed() {
        let raw = json!({ "hits": {} });
        assert!(matches!(
            parse_aggregations(&raw),
            Err(QueryError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_aggregations_missing_metric_is_malformed() {
        let raw = json!({ "aggregations": { "avg_points": { "value": 10.0 } } });
        assert!(matches!(
            parse_aggregations(&raw),
            Err(QueryError::Malformed(_))
        ));
    }
}

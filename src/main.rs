use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

mod config;
mod engine;
mod models;
mod stats;
mod store;
mod teams;

use config::Config;
use engine::ComparisonEngine;
use stats::{BallDontLie, StatsProvider};
use store::{AveragesStore, ElasticStore};
use teams::TeamDirectory;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let teams = Arc::new(TeamDirectory::new());

    let stats = BallDontLie::new(
        &config.nba_api_key,
        Some(&config.nba_api_url),
        Arc::clone(&teams),
    )?;

    let store = ElasticStore::new(
        &config.elastic_endpoint,
        &config.elastic_api_key,
        &config.elastic_index,
        config.season_window(),
    )?;

    info!(
        "Comparing '{}' vs '{}' (stats: {}, store: {})",
        config.player1,
        config.player2,
        stats.name(),
        store.name()
    );

    let engine = ComparisonEngine::new(
        Arc::new(stats),
        Arc::new(store),
        teams,
        config.scoring_weights(),
        Some(Duration::from_secs(config.timeout_secs)),
    );

    match engine.compare(&config.player1, &config.player2).await {
        Ok(result) => {
            println!("{}", result.details);
            info!("Recommendation: {}", result.recommendation);
            Ok(())
        }
        Err(e) => {
            error!("Comparison failed: {}", e);
            std::process::exit(1);
        }
    }
}

use crate::models::{AverageStats, PlayerAverages};

/// Per-metric fantasy multipliers. An opinionated points-league model:
/// defensive plays and efficiency are scarce, so they pay a premium.
pub const POINTS_WEIGHT: f64 = 1.0;
pub const REBOUNDS_WEIGHT: f64 = 1.2;
pub const ASSISTS_WEIGHT: f64 = 1.5;
pub const STEALS_WEIGHT: f64 = 3.0;
pub const BLOCKS_WEIGHT: f64 = 3.0;
pub const FG_PCT_WEIGHT: f64 = 10.0;

/// Blend between current-season form and career history vs the opponent.
pub const SEASON_WEIGHT: f64 = 0.7;
pub const HISTORICAL_WEIGHT: f64 = 0.3;

/// Scoring configuration. Defaults to the constants above; every multiplier
/// can be overridden without touching the formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub points: f64,
    pub rebounds: f64,
    pub assists: f64,
    pub steals: f64,
    pub blocks: f64,
    pub fg_pct: f64,
    pub season: f64,
    pub historical: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        ScoringWeights {
            points: POINTS_WEIGHT,
            rebounds: REBOUNDS_WEIGHT,
            assists: ASSISTS_WEIGHT,
            steals: STEALS_WEIGHT,
            blocks: BLOCKS_WEIGHT,
            fg_pct: FG_PCT_WEIGHT,
            season: SEASON_WEIGHT,
            historical: HISTORICAL_WEIGHT,
        }
    }
}

/// Fantasy value of one averages window.
pub fn fantasy_value(avg: &AverageStats, weights: &ScoringWeights) -> f64 {
    avg.points * weights.points
        + avg.rebounds * weights.rebounds
        + avg.assists * weights.assists
        + avg.steals * weights.steals
        + avg.blocks * weights.blocks
        + avg.fg_percentage * weights.fg_pct
}

/// Combined score: season form weighted over career history.
pub fn weighted_score(averages: &PlayerAverages, weights: &ScoringWeights) -> f64 {
    fantasy_value(&averages.season, weights) * weights.season
        + fantasy_value(&averages.historical, weights) * weights.historical
}

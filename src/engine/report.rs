use crate::models::{AverageStats, GameLocation, PlayerComparison};

/// Render the explanation block for a finished comparison. Pure and
/// deterministic: identical inputs produce byte-identical text.
pub fn render_details(
    player1: &PlayerComparison,
    player2: &PlayerComparison,
    recommendation: &str,
) -> String {
    format!(
        "Fantasy Basketball Comparison:\n\n{}\n{}\nRecommendation: start {} ({:.1} vs {:.1})\n",
        player_block(player1),
        player_block(player2),
        recommendation,
        player1.score,
        player2.score,
    )
}

fn player_block(p: &PlayerComparison) -> String {
    let venue = match p.next_opponent.location {
        GameLocation::Home => format!("vs {}", p.next_opponent.team_name),
        GameLocation::Away => format!("@ {}", p.next_opponent.team_name),
    };
    format!(
        "{}\n- Next Game: {} on {}\n- Season Averages vs {}: {}\n- Historical Averages: {}\n",
        p.name,
        venue,
        p.next_opponent.game_date,
        p.next_opponent.team_name,
        stat_summary(&p.season_averages),
        stat_summary(&p.historical_averages),
    )
}

/// Counting stats to one decimal; field-goal percentage ×100, one decimal.
fn stat_summary(avg: &AverageStats) -> String {
    format!(
        "{:.1} pts, {:.1} reb, {:.1} ast, {:.1} stl, {:.1} blk, {:.1}% FG",
        avg.points,
        avg.rebounds,
        avg.assists,
        avg.steals,
        avg.blocks,
        avg.fg_percentage * 100.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NextOpponent;
    use chrono::NaiveDate;

    fn comparison(name: &str, score: f64, location: GameLocation) -> PlayerComparison {
        let avg = AverageStats {
            points: 25.0,
            rebounds: 7.0,
            assists: 8.0,
            steals: 1.0,
            blocks: 0.5,
            fg_percentage: 0.523,
        };
        PlayerComparison {
            name: name.to_string(),
            player_id: 237,
            team_id: 14,
            next_opponent: NextOpponent {
                team_id: 10,
                team_name: "Golden State Warriors".to_string(),
                game_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
                location,
            },
            season_averages: avg,
            historical_averages: avg,
            score,
        }
    }

    #[test]
    fn test_render_is_deterministic() {
        let p1 = comparison("LeBron James", 55.1, GameLocation::Away);
        let p2 = comparison("Stephen Curry", 48.3, GameLocation::Home);
        let a = render_details(&p1, &p2, "LeBron James");
        let b = render_details(&p1, &p2, "LeBron James");
        assert_eq!(a, b);
    }

    #[test]
    fn test_stat_summary_fixed_precision() {
        let avg = AverageStats {
            points: 25.04,
            rebounds: 7.0,
            assists: 8.15,
            steals: 1.0,
            blocks: 0.5,
            fg_percentage: 0.523,
        };
        assert_eq!(
            stat_summary(&avg),
            "25.0 pts, 7.0 reb, 8.2 ast, 1.0 stl, 0.5 blk, 52.3% FG"
        );
    }

    #[test]
    fn test_render_contains_venue_and_recommendation() {
        let p1 = comparison("LeBron James", 55.1, GameLocation::Away);
        let p2 = comparison("Stephen Curry", 48.3, GameLocation::Home);
        let text = render_details(&p1, &p2, "LeBron James");
        assert!(text.contains("- Next Game: @ Golden State Warriors on 2025-01-15"));
        assert!(text.contains("- Next Game: vs Golden State Warriors on 2025-01-15"));
        assert!(text.contains("Recommendation: start LeBron James (55.1 vs 48.3)"));
    }
}

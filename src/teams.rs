use std::collections::HashMap;

/// Provider team ids and full names, including the defunct franchises the
/// stats provider still references in historical game data.
const TEAMS: &[(u64, &str)] = &[
    (1, "Atlanta Hawks"),
    (2, "Boston Celtics"),
    (3, "Brooklyn Nets"),
    (4, "Charlotte Hornets"),
    (5, "Chicago Bulls"),
    (6, "Cleveland Cavaliers"),
    (7, "Dallas Mavericks"),
    (8, "Denver Nuggets"),
    (9, "Detroit Pistons"),
    (10, "Golden State Warriors"),
    (11, "Houston Rockets"),
    (12, "Indiana Pacers"),
    (13, "LA Clippers"),
    (14, "Los Angeles Lakers"),
    (15, "Memphis Grizzlies"),
    (16, "Miami Heat"),
    (17, "Milwaukee Bucks"),
    (18, "Minnesota Timberwolves"),
    (19, "New Orleans Pelicans"),
    (20, "New York Knicks"),
    (21, "Oklahoma City Thunder"),
    (22, "Orlando Magic"),
    (23, "Philadelphia 76ers"),
    (24, "Phoenix Suns"),
    (25, "Portland Trail Blazers"),
    (26, "Sacramento Kings"),
    (27, "San Antonio Spurs"),
    (28, "Toronto Raptors"),
    (29, "Utah Jazz"),
    (30, "Washington Wizards"),
    (37, "Chicago Stags"),
    (38, "St. Louis Bombers"),
    (39, "Cleveland Rebels"),
    (40, "Detroit Falcons"),
    (41, "Toronto Huskies"),
    (42, "Washington Capitols"),
    (43, "Providence Steamrollers"),
    (44, "Pittsburgh Ironmen"),
    (45, "Baltimore Bullets"),
    (46, "Indianapolis Jets"),
    (47, "Anderson Packers"),
    (48, "Waterloo Hawks"),
    (49, "Indianapolis Olympians"),
    (50, "Denver Nuggets"),
    (51, "Sheboygan Redskins"),
];

/// Immutable team id ⇄ name lookup, built once at startup and shared by `Arc`.
#[derive(Debug)]
pub struct TeamDirectory {
    by_id: HashMap<u64, &'static str>,
    by_name: HashMap<&'static str, u64>,
}

impl TeamDirectory {
    pub fn new() -> Self {
        let by_id = TEAMS.iter().copied().collect();
        // Duplicate names (the two Denver Nuggets entries) keep the lowest id,
        // which is the active franchise.
        let mut by_name: HashMap<&'static str, u64> = HashMap::new();
        for &(id, name) in TEAMS {
            by_name.entry(name).or_insert(id);
        }
        TeamDirectory { by_id, by_name }
    }

    pub fn name(&self, team_id: u64) -> Option<&'static str> {
        self.by_id.get(&team_id).copied()
    }

    pub fn id_by_name(&self, name: &str) -> Option<u64> {
        self.by_name.get(name).copied()
    }
}

impl Default for TeamDirectory {
    fn default() -> Self {
        Self::new()
    }
}

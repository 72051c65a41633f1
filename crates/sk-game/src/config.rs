/// Configuration for a match.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// RNG seed for deterministic spawn placement.
    pub seed: u64,
    /// Frame cap. 0 = run until the driver exits or the match is decided.
    pub max_frames: u64,
    /// Turns between two enemy spawns.
    pub spawn_interval: i64,
    /// Regular enemies in the first level. Each later level adds one.
    pub enemy_count: i64,
    /// Number of levels to clear.
    pub levels: i64,
    /// Starting hit points of the player.
    pub player_health: i64,
    /// Starting hit points of each enemy.
    pub enemy_health: i64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_frames: 0,
            spawn_interval: 5,
            enemy_count: 5,
            levels: 3,
            player_health: 30,
            enemy_health: 5,
        }
    }
}

impl MatchConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the frame cap (0 = unlimited).
    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = frames;
        self
    }

    /// Set the number of turns between spawns.
    pub fn with_spawn_interval(mut self, turns: i64) -> Self {
        self.spawn_interval = turns;
        self
    }

    /// Set how many regular enemies the first level has.
    pub fn with_enemy_count(mut self, count: i64) -> Self {
        self.enemy_count = count;
        self
    }

    /// Set the number of levels.
    pub fn with_levels(mut self, levels: i64) -> Self {
        self.levels = levels;
        self
    }

    /// Set the player's starting hit points.
    pub fn with_player_health(mut self, health: i64) -> Self {
        self.player_health = health;
        self
    }

    /// Set each enemy's starting hit points.
    pub fn with_enemy_health(mut self, health: i64) -> Self {
        self.enemy_health = health;
        self
    }
}

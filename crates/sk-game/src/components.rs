use serde::{Deserialize, Serialize};
use serde_json::json;
use sk_core::{Component, ComponentKind};

/// Hit points of a combatant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    /// Current hit points.
    pub health: i64,
    /// Hit points as of the previous frame.
    pub previous_health: i64,
    /// False once health has dropped to zero or below.
    pub is_alive: bool,
}

impl Health {
    /// A living combatant with the given hit points.
    pub fn new(health: i64) -> Self {
        Self {
            health,
            previous_health: health,
            is_alive: true,
        }
    }
}

impl Component for Health {
    const TAG: &'static str = "health";

    fn kind() -> ComponentKind {
        ComponentKind::new(Self::TAG)
            .required("health")
            .field("previous_health", 0)
            .field("is_alive", true)
    }
}

/// Position on the tile grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    /// Grid position, x then y.
    pub position: [f64; 2],
}

impl Motion {
    /// Distance between two positions.
    pub fn distance_to(&self, other: &Motion) -> f64 {
        let dx = self.position[0] - other.position[0];
        let dy = self.position[1] - other.position[1];
        (dx * dx + dy * dy).sqrt()
    }
}

impl Component for Motion {
    const TAG: &'static str = "motion";

    fn kind() -> ComponentKind {
        ComponentKind::new(Self::TAG).factory("position", || json!([0.0, 0.0]))
    }
}

/// A positional sound emitter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sound {
    /// Asset path of the clip.
    pub sound_file: String,
    /// Base volume, 0.0..=1.0.
    pub volume: f64,
    /// One of the `STATE_*` constants.
    pub state: i64,
    /// Remove the emitter once it has been triggered.
    pub destroy_after_play: bool,
}

impl Sound {
    /// Not yet triggered.
    pub const STATE_IDLE: i64 = -1;
    /// Triggered; will be handled next time the sound system runs.
    pub const STATE_PLAY: i64 = 0;
    /// Handled but out of earshot.
    pub const STATE_PLAYING: i64 = 1;
    /// Handed to the mixer.
    pub const STATE_STOPPED: i64 = 2;
}

impl Component for Sound {
    const TAG: &'static str = "sound";

    fn kind() -> ComponentKind {
        ComponentKind::new(Self::TAG)
            .required("sound_file")
            .field("volume", 1.0)
            .field("state", Self::STATE_IDLE)
            .field("destroy_after_play", false)
    }
}

/// The turn counter singleton.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Turns elapsed since the match started.
    pub number: i64,
}

impl Component for Turn {
    const TAG: &'static str = "turn";

    fn kind() -> ComponentKind {
        ComponentKind::new(Self::TAG).field("number", 0)
    }
}

/// Decoded player input for the current frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Controls {
    /// Movement direction, each axis in -1..=1.
    pub direction: [i64; 2],
    /// Named actions triggered this frame.
    pub actions: Vec<String>,
}

impl Component for Controls {
    const TAG: &'static str = "controls";

    fn kind() -> ComponentKind {
        ComponentKind::new(Self::TAG)
            .factory("direction", || json!([0, 0]))
            .factory("actions", || json!([]))
    }
}

/// An enemy spawner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spawn {
    /// Prototype name of the enemies produced.
    pub enemy_type: String,
    /// Enemies left to produce.
    pub count: i64,
    /// Turns between two spawns.
    pub interval: i64,
    /// Turn of the most recent spawn.
    pub last_spawned_turn: i64,
    /// Spawn area: x, y, width, height.
    pub area: [f64; 4],
}

impl Component for Spawn {
    const TAG: &'static str = "spawn";

    fn kind() -> ComponentKind {
        ComponentKind::new(Self::TAG)
            .required("enemy_type")
            .field("count", 0)
            .field("interval", 5)
            .field("last_spawned_turn", 0)
            .factory("area", || json!([0.0, 0.0, 1.0, 1.0]))
    }
}

/// Marks a hostile unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    /// Prototype name, e.g. `mook` or `boss`.
    pub kind: String,
    /// Damage dealt per attack.
    pub damage: i64,
    /// Turns between two attacks.
    pub attack_interval: i64,
}

impl Component for Enemy {
    const TAG: &'static str = "enemy";

    fn kind() -> ComponentKind {
        ComponentKind::new(Self::TAG)
            .required("kind")
            .field("damage", 1)
            .field("attack_interval", 4)
    }
}

/// Marks the player unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Damage dealt to the first enemy found each turn.
    pub damage: i64,
}

impl Component for Player {
    const TAG: &'static str = "player";

    fn kind() -> ComponentKind {
        ComponentKind::new(Self::TAG).field("damage", 3)
    }
}

/// Overall match state singleton.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Game {
    /// One of the `STATE_*` constants.
    pub state: i64,
}

impl Game {
    /// Waiting for the first input.
    pub const STATE_START_SCREEN: i64 = 0;
    /// Match in progress.
    pub const STATE_PLAYING: i64 = 1;
    /// The player died.
    pub const STATE_GAME_OVER: i64 = 2;
    /// The last level was cleared.
    pub const STATE_WIN: i64 = 3;

    /// Returns true once the match has been decided.
    pub fn is_over(&self) -> bool {
        matches!(self.state, Self::STATE_GAME_OVER | Self::STATE_WIN)
    }
}

impl Component for Game {
    const TAG: &'static str = "game";

    fn kind() -> ComponentKind {
        ComponentKind::new(Self::TAG).field("state", Self::STATE_START_SCREEN)
    }
}

/// One group of identical enemies in a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyWave {
    /// Prototype name.
    pub enemy_type: String,
    /// How many to spawn.
    pub count: i64,
}

impl EnemyWave {
    /// A wave of `count` enemies of the named prototype.
    pub fn new(enemy_type: impl Into<String>, count: i64) -> Self {
        Self {
            enemy_type: enemy_type.into(),
            count,
        }
    }
}

/// The spawners a level starts with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Spawn area shared by every wave: x, y, width, height.
    pub spawn_area: [f64; 4],
    /// One spawner per wave, in order.
    pub enemies: Vec<EnemyWave>,
    /// Turns between two spawns. Falls back to [`LevelConfig::DEFAULT_SPAWN_INTERVAL`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spawn_interval: Option<i64>,
}

impl LevelConfig {
    /// Spawn interval used when a level does not set one.
    pub const DEFAULT_SPAWN_INTERVAL: i64 = 5;

    /// The effective spawn interval.
    pub fn interval(&self) -> i64 {
        self.spawn_interval.unwrap_or(Self::DEFAULT_SPAWN_INTERVAL)
    }

    /// Enemies this level produces in total.
    pub fn total_enemies(&self) -> i64 {
        self.enemies.iter().map(|w| w.count).sum()
    }
}

/// Level progression singleton.
///
/// Level `n` is `levels[n - 1]`. Level 0 means no level has started yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Level {
    /// The level being played, 0 before the first one.
    pub current_level: i64,
    /// Level table, first level first.
    pub levels: Vec<LevelConfig>,
}

impl Level {
    /// A table starting before its first level.
    pub fn new(levels: Vec<LevelConfig>) -> Self {
        Self {
            current_level: 0,
            levels,
        }
    }

    /// The level after the current one, if the table has one.
    pub fn next(&self) -> Option<&LevelConfig> {
        usize::try_from(self.current_level)
            .ok()
            .and_then(|index| self.levels.get(index))
    }

    /// True once the current level is the last in the table.
    pub fn is_final(&self) -> bool {
        self.next().is_none()
    }
}

impl Component for Level {
    const TAG: &'static str = "level";

    fn kind() -> ComponentKind {
        ComponentKind::new(Self::TAG)
            .field("current_level", 0)
            .factory("levels", || {
                json!([
                    {
                        "spawn_area": [67.0, 56.0, 5.0, 5.0],
                        "enemies": [
                            { "enemy_type": "mook", "count": 5 },
                            { "enemy_type": "boss", "count": 1 }
                        ]
                    },
                    {
                        "spawn_area": [53.0, 53.0, 5.0, 5.0],
                        "enemies": [
                            { "enemy_type": "mook", "count": 10 },
                            { "enemy_type": "boss", "count": 4 }
                        ]
                    },
                    {
                        "spawn_area": [51.0, 51.0, 4.0, 4.0],
                        "enemies": [
                            { "enemy_type": "mook", "count": 20 },
                            { "enemy_type": "boss", "count": 8 }
                        ]
                    }
                ])
            })
    }
}

/// A clip handed to the audio backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedClip {
    /// Asset path of the clip.
    pub sound_file: String,
    /// Volume after distance attenuation.
    pub volume: f64,
}

/// Clips waiting for the audio backend, drained outside the core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mixer {
    /// Clips in trigger order.
    pub queue: Vec<QueuedClip>,
}

impl Component for Mixer {
    const TAG: &'static str = "mixer";

    fn kind() -> ComponentKind {
        ComponentKind::new(Self::TAG).factory("queue", || json!([]))
    }
}

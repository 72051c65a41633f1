use std::collections::HashMap;

use sk_core::{ComponentRegistry, EcsResult, Entity, EntityGroup};
use tracing::info;

use crate::components::{
    Controls, Enemy, EnemyWave, Game, Health, Level, LevelConfig, Mixer, Motion, Player, Sound,
    Spawn, Turn,
};
use crate::config::MatchConfig;
use crate::systems;

/// Where the player starts.
const PLAYER_START: [f64; 2] = [64.0, 64.0];

/// Spawn areas, reused in turn when there are more levels than areas.
const SPAWN_AREAS: [[f64; 4]; 3] = [
    [67.0, 56.0, 5.0, 5.0],
    [53.0, 53.0, 5.0, 5.0],
    [51.0, 51.0, 4.0, 4.0],
];

/// Declare every component schema the game uses.
pub fn declare_components(registry: &mut ComponentRegistry) -> EcsResult<()> {
    registry.register::<Health>()?;
    registry.register::<Motion>()?;
    registry.register::<Sound>()?;
    registry.register::<Turn>()?;
    registry.register::<Controls>()?;
    registry.register::<Spawn>()?;
    registry.register::<Enemy>()?;
    registry.register::<Player>()?;
    registry.register::<Game>()?;
    registry.register::<Level>()?;
    registry.register::<Mixer>()?;
    Ok(())
}

/// Enemy prototypes by name. Spawners duplicate these.
pub fn enemy_prototypes(config: &MatchConfig) -> EcsResult<HashMap<String, Entity>> {
    let mook = Entity::named("mook")
        .with(&Enemy {
            kind: "mook".to_string(),
            damage: 1,
            attack_interval: 4,
        })?
        .with(&Health::new(config.enemy_health))?;
    let boss = Entity::named("boss")
        .with(&Enemy {
            kind: "boss".to_string(),
            damage: 3,
            attack_interval: 6,
        })?
        .with(&Health::new(config.enemy_health * 3))?;
    Ok(HashMap::from([
        ("mook".to_string(), mook),
        ("boss".to_string(), boss),
    ]))
}

/// The level table for a match.
///
/// Level `n` has `enemy_count + n - 1` regular enemies and one boss per five
/// of them, all spawning every `spawn_interval` turns.
pub fn level_table(config: &MatchConfig) -> Vec<LevelConfig> {
    (0..config.levels.max(0))
        .map(|n| {
            let mooks = config.enemy_count + n;
            LevelConfig {
                spawn_area: SPAWN_AREAS[n as usize % SPAWN_AREAS.len()],
                enemies: vec![EnemyWave::new("mook", mooks), EnemyWave::new("boss", mooks / 5)],
                spawn_interval: Some(config.spawn_interval),
            }
        })
        .collect()
}

/// Build a ready-to-run match.
///
/// The group starts on the start screen with the bookkeeping singletons, the
/// player, the level table from [`level_table`], and every gameplay system
/// mounted. No spawner exists yet: the first level starts on the first
/// frame of play.
pub fn build_match(config: &MatchConfig) -> EcsResult<EntityGroup> {
    let mut registry = ComponentRegistry::new();
    declare_components(&mut registry)?;
    let mut group = EntityGroup::new(registry);

    let entities = [
        group.create_named("game").with(&Game::default())?,
        group.create_named("turn").with(&Turn::default())?,
        group.create_named("controls").with(&Controls::default())?,
        group.create_named("mixer").with(&Mixer::default())?,
        group
            .create_named("levels")
            .with(&Level::new(level_table(config)))?,
        group
            .create_named("player")
            .with(&Player { damage: 3 })?
            .with(&Health::new(config.player_health))?
            .with(&Motion {
                position: PLAYER_START,
            })?,
    ];
    group.add_all(entities)?;

    systems::mount_all(&mut group, enemy_prototypes(config)?, config.seed);
    info!(
        seed = config.seed,
        enemies = config.enemy_count,
        levels = config.levels,
        systems = group.system_names().len(),
        "match ready"
    );
    Ok(group)
}

use sk_core::{Component, EcsResult, Entity, EntityGroup};
use tracing::info;

use super::is_playing;
use crate::components::{Enemy, Level, LevelConfig, Motion, Spawn};

/// Enemies still waiting inside spawners.
pub fn unspawned_enemies(group: &EntityGroup) -> EcsResult<i64> {
    group
        .query(&[Spawn::TAG])
        .into_iter()
        .map(|id| Ok(group.get(id)?.get::<Spawn>()?.count))
        .sum()
}

/// True when no enemy is alive and no spawner has anything left to produce.
pub fn field_cleared(group: &EntityGroup) -> EcsResult<bool> {
    Ok(group.query(&[Enemy::TAG]).is_empty() && unspawned_enemies(group)? <= 0)
}

/// Start the next level once the current one is cleared.
///
/// One spawner per wave of the next level is added, anchored at the corner of
/// the level's spawn area. The spawner system mounted after this one picks
/// them up in the same frame. Past the last level nothing is added and the
/// game state system declares the win.
pub fn advance_level(group: &mut EntityGroup) -> EcsResult<()> {
    if !is_playing(group)? || !field_cleared(group)? {
        return Ok(());
    }
    let level: Level = group.singleton(&[Level::TAG])?.get()?;
    let Some(config) = level.next().cloned() else {
        return Ok(());
    };

    let current = group
        .singleton_mut(&[Level::TAG])?
        .modify(|level: &mut Level| {
            level.current_level += 1;
            level.current_level
        })?;
    let mut spawners = Vec::with_capacity(config.enemies.len());
    for wave in &config.enemies {
        spawners.push(spawner(group, &config, &wave.enemy_type, wave.count)?);
    }
    group.add_all(spawners)?;

    info!(
        level = current,
        enemies = config.total_enemies(),
        "level started"
    );
    Ok(())
}

fn spawner(group: &EntityGroup, config: &LevelConfig, enemy_type: &str, count: i64) -> EcsResult<Entity> {
    let area = config.spawn_area;
    group
        .create_named(format!("{enemy_type} spawner"))
        .with(&Spawn {
            enemy_type: enemy_type.to_string(),
            count,
            interval: config.interval(),
            last_spawned_turn: 0,
            area,
        })?
        .with(&Motion {
            position: [area[0], area[1]],
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::components::{EnemyWave, Game, Health};
    use crate::systems::game_state::update_game_state;
    use crate::systems::spawner::SpawnerSystem;
    use crate::systems::testing::playing_group;

    fn level(area: f64, waves: &[(&str, i64)]) -> LevelConfig {
        LevelConfig {
            spawn_area: [area, area, 2.0, 2.0],
            enemies: waves.iter().map(|(t, c)| EnemyWave::new(*t, *c)).collect(),
            spawn_interval: Some(1),
        }
    }

    fn with_levels(levels: Vec<LevelConfig>) -> EntityGroup {
        let mut group = playing_group();
        group
            .singleton_mut(&[Level::TAG])
            .unwrap()
            .insert(&Level::new(levels))
            .unwrap();
        group
    }

    fn current(group: &EntityGroup) -> i64 {
        group.singleton(&[Level::TAG]).unwrap().get::<Level>().unwrap().current_level
    }

    fn spawns(group: &EntityGroup) -> Vec<Spawn> {
        group
            .query(&[Spawn::TAG, Motion::TAG])
            .into_iter()
            .map(|id| group.get(id).unwrap().get().unwrap())
            .collect()
    }

    fn kill_enemies(group: &mut EntityGroup) {
        for id in group.query(&[Enemy::TAG]) {
            group.remove(id).unwrap();
        }
    }

    #[test]
    fn cleared_field_starts_the_next_level() {
        let mut group = with_levels(vec![
            level(10.0, &[("mook", 2), ("boss", 1)]),
            level(30.0, &[("mook", 4)]),
        ]);
        group.mount_system("level_progression", advance_level);

        group.run_systems().unwrap();
        assert_eq!(current(&group), 1);
        let first = spawns(&group);
        assert_eq!(first.len(), 2);
        assert_eq!((first[0].enemy_type.as_str(), first[0].count), ("mook", 2));
        assert_eq!((first[1].enemy_type.as_str(), first[1].count), ("boss", 1));
        assert_eq!(first[0].area, [10.0, 10.0, 2.0, 2.0]);
        assert_eq!(first[0].interval, 1);

        // Spawners with enemies left hold the level.
        group.run_systems().unwrap();
        assert_eq!(current(&group), 1);

        for id in group.query(&[Spawn::TAG]) {
            group.remove(id).unwrap();
        }
        group.run_systems().unwrap();
        assert_eq!(current(&group), 2);
        let second = spawns(&group);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].count, 4);
        assert_eq!(second[0].area[0], 30.0);
    }

    #[test]
    fn living_enemy_holds_the_level() {
        let mut group = with_levels(vec![level(0.0, &[("mook", 1)]), level(0.0, &[("mook", 1)])]);
        group
            .singleton_mut(&[Level::TAG])
            .unwrap()
            .set_field(Level::TAG, "current_level", 1)
            .unwrap();
        let straggler = group
            .create_named("mook")
            .with(&Enemy {
                kind: "mook".to_string(),
                damage: 1,
                attack_interval: 4,
            })
            .unwrap()
            .with(&Health::new(5))
            .unwrap();
        group.add(straggler).unwrap();
        group.mount_system("level_progression", advance_level);

        group.run_systems().unwrap();
        assert_eq!(current(&group), 1);
        assert!(spawns(&group).is_empty());

        kill_enemies(&mut group);
        group.run_systems().unwrap();
        assert_eq!(current(&group), 2);
    }

    #[test]
    fn new_level_spawns_in_the_same_frame() {
        let mut group = with_levels(vec![level(5.0, &[("mook", 1)])]);
        let mook = Entity::named("mook")
            .with(&Enemy {
                kind: "mook".to_string(),
                damage: 1,
                attack_interval: 4,
            })
            .unwrap()
            .with(&Health::new(5))
            .unwrap();
        group.mount_system("level_progression", advance_level);
        group.mount_system("turn", crate::systems::turn::advance_turn);
        group.mount(SpawnerSystem::new(HashMap::from([("mook".to_string(), mook)]), 3));

        group.run_systems().unwrap();
        assert_eq!(group.query(&[Enemy::TAG]).len(), 1);
    }

    #[test]
    fn match_is_won_only_after_the_last_level() {
        let mut group = with_levels(vec![level(0.0, &[("mook", 1)]), level(0.0, &[("boss", 1)])]);
        group.mount_system("game_state", update_game_state);
        group.mount_system("level_progression", advance_level);
        let state = |g: &EntityGroup| g.singleton(&[Game::TAG]).unwrap().get::<Game>().unwrap().state;
        let player = group
            .create_named("player")
            .with(&crate::components::Player::default())
            .unwrap()
            .with(&Health::new(10))
            .unwrap();
        group.add(player).unwrap();

        group.run_systems().unwrap();
        assert_eq!(current(&group), 1);

        for id in group.query(&[Spawn::TAG]) {
            group.remove(id).unwrap();
        }
        group.run_systems().unwrap();
        assert_eq!(state(&group), Game::STATE_PLAYING);
        assert_eq!(current(&group), 2);

        for id in group.query(&[Spawn::TAG]) {
            group.remove(id).unwrap();
        }
        group.run_systems().unwrap();
        assert_eq!(state(&group), Game::STATE_WIN);
        assert_eq!(current(&group), 2);
        assert!(spawns(&group).is_empty());
    }

    #[test]
    fn paused_outside_play() {
        let mut group = with_levels(vec![level(0.0, &[("mook", 1)])]);
        group
            .singleton_mut(&[Game::TAG])
            .unwrap()
            .insert(&Game {
                state: Game::STATE_START_SCREEN,
            })
            .unwrap();
        group.mount_system("level_progression", advance_level);
        group.run_systems().unwrap();
        assert_eq!(current(&group), 0);
        assert!(spawns(&group).is_empty());
    }

    #[test]
    fn unspawned_counts_sum_over_spawners() {
        let mut group = with_levels(vec![level(0.0, &[("mook", 3), ("boss", 2)])]);
        assert!(field_cleared(&group).unwrap());
        group.mount_system("level_progression", advance_level);
        group.run_systems().unwrap();
        assert_eq!(unspawned_enemies(&group).unwrap(), 5);
        assert!(!field_cleared(&group).unwrap());
    }
}

use std::collections::HashMap;

use sk_core::{Component, EcsResult, Entity, EntityGroup};

use crate::components::Game;

/// Removes dead enemies.
pub mod cleanup;
/// Player and enemy attacks.
pub mod combat;
/// Match state transitions.
pub mod game_state;
/// Health bookkeeping and hurt feedback.
pub mod health;
/// Level progression.
pub mod level;
/// Positional sound triggering.
pub mod sounds;
/// Enemy spawning from prototypes.
pub mod spawner;
/// The turn counter.
pub mod turn;

pub use spawner::SpawnerSystem;

/// Mount every gameplay system in the order they must run each frame.
pub fn mount_all(group: &mut EntityGroup, prototypes: HashMap<String, Entity>, seed: u64) {
    group.mount_system("game_state", game_state::update_game_state);
    group.mount_system("level_progression", level::advance_level);
    group.mount_system("turn", turn::advance_turn);
    group.mount(SpawnerSystem::new(prototypes, seed));
    group.mount_system("combat", combat::resolve_combat);
    group.mount_system("health", health::update_health);
    group.mount_system("cleanup", cleanup::remove_dead_enemies);
    group.mount_system("sounds", sounds::play_sounds);
}

/// Returns true while the match is in progress.
pub(crate) fn is_playing(group: &EntityGroup) -> EcsResult<bool> {
    let game: Game = group.singleton(&[Game::TAG])?.get()?;
    Ok(game.state == Game::STATE_PLAYING)
}

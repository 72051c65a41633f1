use sk_core::{Component, EcsResult, EntityGroup};
use tracing::trace;

use super::is_playing;
use crate::components::{Enemy, Health, Player, Turn};

/// Exchange blows between the player and the enemies.
///
/// The player strikes the first enemy found for its `damage`. Every enemy
/// strikes the player on turns that are a multiple of its `attack_interval`.
/// Health is only lowered here; deaths are settled by the health system.
pub fn resolve_combat(group: &mut EntityGroup) -> EcsResult<()> {
    if !is_playing(group)? {
        return Ok(());
    }
    let turn = group.singleton(&[Turn::TAG])?.get::<Turn>()?.number;
    let player_id = group.query_singleton(&[Player::TAG, Health::TAG])?;
    let player: Player = group.get(player_id)?.get()?;

    if let Some(target) = group.query(&[Enemy::TAG, Health::TAG]).first().copied() {
        group
            .get_mut(target)?
            .modify(|health: &mut Health| health.health -= player.damage)?;
        trace!(target = %target, damage = player.damage, "player attacks");
    }

    let mut incoming = 0;
    for id in group.query(&[Enemy::TAG]) {
        let enemy: Enemy = group.get(id)?.get()?;
        if enemy.attack_interval > 0 && turn % enemy.attack_interval == 0 {
            incoming += enemy.damage;
        }
    }
    if incoming > 0 {
        group
            .get_mut(player_id)?
            .modify(|health: &mut Health| health.health -= incoming)?;
        trace!(damage = incoming, "enemies attack");
    }
    Ok(())
}

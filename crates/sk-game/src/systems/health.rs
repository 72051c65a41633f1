use sk_core::{Component, EcsResult, Entity, EntityGroup};
use tracing::debug;

use crate::components::{Health, Motion, Player, Sound};

/// Clip played when the player takes damage.
pub const HURT_SOUND: &str = "assets/sounds/hurt.wav";

/// Base volume of the hurt clip.
pub const HURT_VOLUME: f64 = 0.5;

/// Settle health changes made earlier in the frame.
///
/// Records `previous_health`, marks combatants at zero or below as dead and
/// emits a one-shot hurt sound at the player's position whenever the player
/// lost health since the last frame.
pub fn update_health(group: &mut EntityGroup) -> EcsResult<()> {
    for id in group.query(&[Health::TAG]) {
        let entity = group.get(id)?;
        let health: Health = entity.get()?;

        if health.health < health.previous_health && entity.contains(Player::TAG) {
            let motion: Motion = entity.get()?;
            let hurt = hurt_sound(group, motion)?;
            group.add(hurt)?;
        }

        let died = group.get_mut(id)?.modify(|health: &mut Health| {
            health.previous_health = health.health;
            let died = health.is_alive && health.health <= 0;
            if health.health <= 0 {
                health.is_alive = false;
            }
            died
        })?;
        if died {
            debug!(entity = %id, "died");
        }
    }
    Ok(())
}

fn hurt_sound(group: &EntityGroup, motion: Motion) -> EcsResult<Entity> {
    group
        .create_named("hurt")
        .with(&Sound {
            sound_file: HURT_SOUND.to_string(),
            volume: HURT_VOLUME,
            state: Sound::STATE_PLAY,
            destroy_after_play: true,
        })?
        .with(&motion)
}

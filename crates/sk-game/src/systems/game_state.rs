use sk_core::{Component, EcsResult, EntityGroup};
use tracing::info;

use super::level::field_cleared;
use crate::components::{Controls, Game, Health, Level, Player};

/// Move the match between its states.
///
/// The start screen is left on the first input action. A match in progress
/// is lost once the player is dead and won once the last level is cleared.
pub fn update_game_state(group: &mut EntityGroup) -> EcsResult<()> {
    let game: Game = group.singleton(&[Game::TAG])?.get()?;
    let next = match game.state {
        Game::STATE_START_SCREEN => {
            let controls: Controls = group.singleton(&[Controls::TAG])?.get()?;
            if controls.actions.is_empty() {
                return Ok(());
            }
            Game::STATE_PLAYING
        }
        Game::STATE_PLAYING => {
            let player: Health = group.singleton(&[Player::TAG, Health::TAG])?.get()?;
            if !player.is_alive {
                Game::STATE_GAME_OVER
            } else if field_cleared(group)? && group.singleton(&[Level::TAG])?.get::<Level>()?.is_final() {
                Game::STATE_WIN
            } else {
                return Ok(());
            }
        }
        _ => return Ok(()),
    };

    info!(from = game.state, to = next, "game state changed");
    group.singleton_mut(&[Game::TAG])?.insert(&Game { state: next })?;
    Ok(())
}

use sk_core::{Component, EcsResult, EntityGroup};

use super::is_playing;
use crate::components::Turn;

/// Advance the turn counter by one while the match is in progress.
pub fn advance_turn(group: &mut EntityGroup) -> EcsResult<()> {
    if !is_playing(group)? {
        return Ok(());
    }
    group
        .singleton_mut(&[Turn::TAG])?
        .modify(|turn: &mut Turn| turn.number += 1)
}

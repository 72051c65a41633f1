use sk_core::{Component, EcsResult, EntityGroup};
use tracing::trace;

use crate::components::{Mixer, Motion, Player, QueuedClip, Sound};

/// Sounds farther than this from the player are not heard.
pub const AUDIBLE_DISTANCE: f64 = 80.0;

/// Trigger sounds that were set to play.
///
/// A triggered sound within earshot of the player is queued on the mixer
/// singleton with its volume attenuated linearly by distance, then marked
/// stopped. Out of earshot it is only marked playing. One-shot emitters are
/// removed once handled.
pub fn play_sounds(group: &mut EntityGroup) -> EcsResult<()> {
    let listener: Motion = group.singleton(&[Player::TAG, Motion::TAG])?.get()?;
    let mut queued = Vec::new();

    for id in group.query(&[Sound::TAG, Motion::TAG]) {
        let mut emitter = group.get_mut(id)?;
        let mut sound: Sound = emitter.get()?;
        if sound.state != Sound::STATE_PLAY {
            continue;
        }

        sound.state = Sound::STATE_PLAYING;
        let distance = listener.distance_to(&emitter.get::<Motion>()?);
        if distance < AUDIBLE_DISTANCE {
            sound.state = Sound::STATE_STOPPED;
            queued.push(QueuedClip {
                sound_file: sound.sound_file.clone(),
                volume: sound.volume * (1.0 - distance / AUDIBLE_DISTANCE),
            });
        }
        emitter.insert(&sound)?;

        if sound.destroy_after_play {
            group.remove(id)?;
        }
    }

    if !queued.is_empty() {
        trace!(clips = queued.len(), "queueing sounds");
        group
            .singleton_mut(&[Mixer::TAG])?
            .modify(|mixer: &mut Mixer| mixer.queue.extend(queued))?;
    }
    Ok(())
}

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sk_core::{Component, EcsError, EcsResult, Entity, EntityGroup, System};
use tracing::debug;

use super::is_playing;
use crate::components::{Motion, Spawn, Turn};

/// Produces enemies from named prototypes.
///
/// Each spawner entity emits one duplicate of its prototype every `interval`
/// turns until its `count` runs out, then removes itself. Placement inside
/// the spawn area is jittered by an RNG derived from the seed, the turn and
/// the remaining count, so a replay with the same seed is identical.
#[derive(Debug)]
pub struct SpawnerSystem {
    prototypes: HashMap<String, Entity>,
    seed: u64,
}

impl SpawnerSystem {
    /// Create a spawner over the given prototypes.
    pub fn new(prototypes: HashMap<String, Entity>, seed: u64) -> Self {
        Self { prototypes, seed }
    }

    fn prototype(&self, enemy_type: &str) -> EcsResult<&Entity> {
        self.prototypes
            .get(enemy_type)
            .ok_or_else(|| EcsError::SystemError(format!("no prototype named '{enemy_type}'")))
    }

    fn placement(&self, spawn: &Spawn, turn: i64) -> [f64; 2] {
        let mix = (turn as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ spawn.count as u64;
        let mut rng = StdRng::seed_from_u64(self.seed ^ mix);
        let [x, y, width, height] = spawn.area;
        [
            (x + width * rng.random::<f64>()).floor(),
            (y + height * rng.random::<f64>()).floor(),
        ]
    }
}

impl System for SpawnerSystem {
    fn name(&self) -> &str {
        "spawner"
    }

    fn run(&self, group: &mut EntityGroup) -> EcsResult<()> {
        if !is_playing(group)? {
            return Ok(());
        }
        let turn = group.singleton(&[Turn::TAG])?.get::<Turn>()?.number;

        for id in group.query(&[Spawn::TAG]) {
            let mut spawn: Spawn = group.get(id)?.get()?;
            if spawn.count <= 0 {
                debug!(spawner = %id, "spawner depleted");
                group.remove(id)?;
                continue;
            }
            if turn - spawn.last_spawned_turn < spawn.interval {
                continue;
            }

            let mut enemy = self.prototype(&spawn.enemy_type)?.duplicate();
            let position = self.placement(&spawn, turn);
            enemy.insert(&Motion { position })?;

            spawn.last_spawned_turn = turn;
            spawn.count -= 1;
            group.get_mut(id)?.insert(&spawn)?;

            let enemy_id = group.add(enemy)?;
            debug!(enemy = %enemy_id, kind = %spawn.enemy_type, turn, "enemy spawned");
        }
        Ok(())
    }
}

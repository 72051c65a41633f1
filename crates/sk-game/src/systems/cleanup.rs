use sk_core::{Component, EcsResult, EntityGroup};
use tracing::debug;

use crate::components::{Enemy, Health};

/// Remove enemies whose health system marked them dead.
pub fn remove_dead_enemies(group: &mut EntityGroup) -> EcsResult<()> {
    for id in group.query(&[Enemy::TAG, Health::TAG]) {
        if !group.get(id)?.get::<Health>()?.is_alive {
            let enemy = group.remove(id)?;
            debug!(enemy = %enemy.label(), "removed dead enemy");
        }
    }
    Ok(())
}

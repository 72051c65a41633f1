use std::fmt;

use crate::error::EcsResult;
use crate::group::EntityGroup;

/// A per-frame behaviour mounted on an [`EntityGroup`].
///
/// Systems are run in mount order, once per frame. They hold no state of
/// their own: everything they read or write lives in components on entities
/// reachable through the group. A failing system aborts the rest of the frame.
pub trait System: fmt::Debug {
    /// Human-readable name, reported when the system fails.
    fn name(&self) -> &str;

    /// Called once per frame.
    fn run(&self, group: &mut EntityGroup) -> EcsResult<()>;
}

/// A [`System`] backed by a plain function or closure.
pub struct FnSystem<F> {
    name: String,
    f: F,
}

impl<F> FnSystem<F>
where
    F: Fn(&mut EntityGroup) -> EcsResult<()>,
{
    /// Wrap a function under the given name.
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> fmt::Debug for FnSystem<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSystem").field("name", &self.name).finish()
    }
}

impl<F> System for FnSystem<F>
where
    F: Fn(&mut EntityGroup) -> EcsResult<()>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, group: &mut EntityGroup) -> EcsResult<()> {
        (self.f)(group)
    }
}

use crate::entity::{Entity, EntityId};
use crate::group::EntityGroup;

/// A builder for filtering the live entities of a group.
///
/// Results always come back in insertion order, because spawn order is
/// observable in gameplay ("the first enemy found").
pub struct QueryBuilder<'g> {
    group: &'g EntityGroup,
    with: Vec<String>,
    without: Vec<String>,
    name: Option<String>,
    limit: Option<usize>,
}

impl<'g> QueryBuilder<'g> {
    /// Start an unfiltered query over the group.
    pub fn new(group: &'g EntityGroup) -> Self {
        Self {
            group,
            with: Vec::new(),
            without: Vec::new(),
            name: None,
            limit: None,
        }
    }

    /// Require a component.
    pub fn with(mut self, tag: impl Into<String>) -> Self {
        self.with.push(tag.into());
        self
    }

    /// Require every one of the given components.
    pub fn with_all(mut self, tags: &[&str]) -> Self {
        self.with.extend(tags.iter().map(|t| t.to_string()));
        self
    }

    /// Exclude entities holding a component.
    pub fn without(mut self, tag: impl Into<String>) -> Self {
        self.without.push(tag.into());
        self
    }

    /// Filter to entities with exactly this name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Limit the number of results.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Lazily iterate matching entities.
    ///
    /// The iterator borrows the group, so the group cannot be mutated until it
    /// is dropped. Use [`QueryBuilder::ids`] when the caller needs to add or
    /// remove entities while walking the results.
    pub fn iter(self) -> impl Iterator<Item = &'g Entity> {
        let limit = self.limit.unwrap_or(usize::MAX);
        let group = self.group;
        group
            .entities()
            .filter(move |e| self.matches(e))
            .take(limit)
    }

    /// Materialize the handles of matching entities.
    pub fn ids(self) -> Vec<EntityId> {
        self.iter().map(Entity::id).collect()
    }

    /// The earliest-added matching entity.
    pub fn first(self) -> Option<&'g Entity> {
        self.iter().next()
    }

    /// Count matching entities without collecting them.
    pub fn count(self) -> usize {
        self.iter().count()
    }

    fn matches(&self, entity: &Entity) -> bool {
        if !self.with.iter().all(|t| entity.contains(t)) {
            return false;
        }

        if self.without.iter().any(|t| entity.contains(t)) {
            return false;
        }

        if let Some(ref name) = self.name
            && entity.name != *name
        {
            return false;
        }

        true
    }
}

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;
use tracing::{debug, debug_span, trace};

use crate::component::ComponentInstance;
use crate::entity::{Entity, EntityId, EntityMut};
use crate::error::{EcsError, EcsResult};
use crate::query::QueryBuilder;
use crate::registry::ComponentRegistry;
use crate::system::{FnSystem, System};

/// The world: live entities, the component registry, and mounted systems.
///
/// Entities are visible to queries from the moment they are added until they
/// are removed. Iteration order is insertion order. Systems run once per
/// [`EntityGroup::run_systems`] call, in mount order.
pub struct EntityGroup {
    registry: ComponentRegistry,
    entities: HashMap<EntityId, Entity>,
    // Insertion order of live entities.
    order: Vec<EntityId>,
    systems: Vec<Box<dyn System>>,
    frame: u64,
}

impl fmt::Debug for EntityGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityGroup")
            .field("frame", &self.frame)
            .field("entities", &self.order.len())
            .field("components", &self.registry.len())
            .field("systems", &self.system_names())
            .finish()
    }
}

impl EntityGroup {
    /// Create an empty group that owns the given registry.
    pub fn new(registry: ComponentRegistry) -> Self {
        Self {
            registry,
            entities: HashMap::new(),
            order: Vec::new(),
            systems: Vec::new(),
            frame: 0,
        }
    }

    /// The component registry.
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Build an instance of a declared component kind.
    pub fn instantiate<I, K>(&self, tag: &str, overrides: I) -> EcsResult<ComponentInstance>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.registry.instantiate(tag, overrides)
    }

    /// Build an instance of a declared component kind from its defaults.
    pub fn instantiate_defaults(&self, tag: &str) -> EcsResult<ComponentInstance> {
        self.registry.instantiate_defaults(tag)
    }

    // -----------------------------------------------------------------------
    // Entity lifecycle
    // -----------------------------------------------------------------------

    /// Create a new detached entity. It is not visible to queries until added.
    pub fn create(&self) -> Entity {
        Entity::new()
    }

    /// Create a new detached, named entity.
    pub fn create_named(&self, name: impl Into<String>) -> Entity {
        Entity::named(name)
    }

    /// Publish an entity, appending it to the live set.
    ///
    /// Every attached component is checked against the registry first.
    pub fn add(&mut self, entity: Entity) -> EcsResult<EntityId> {
        self.registry.validate_entity(&entity)?;
        Ok(self.insert_validated(entity))
    }

    /// Publish several entities in order.
    ///
    /// All entities are validated before any is added, so a malformed entity
    /// leaves the group untouched.
    pub fn add_all(&mut self, entities: impl IntoIterator<Item = Entity>) -> EcsResult<Vec<EntityId>> {
        let entities: Vec<Entity> = entities.into_iter().collect();
        for entity in &entities {
            self.registry.validate_entity(entity)?;
        }
        Ok(entities
            .into_iter()
            .map(|e| self.insert_validated(e))
            .collect())
    }

    fn insert_validated(&mut self, entity: Entity) -> EntityId {
        let id = entity.id();
        debug!(entity = %entity, components = entity.len(), "added entity");
        self.order.push(id);
        self.entities.insert(id, entity);
        id
    }

    /// Unpublish an entity and hand it back.
    ///
    /// Safe to call while walking a snapshot returned by
    /// [`EntityGroup::query`]; later queries never return the entity again.
    pub fn remove(&mut self, id: EntityId) -> EcsResult<Entity> {
        let entity = self
            .entities
            .remove(&id)
            .ok_or(EcsError::EntityNotFound(id))?;
        self.order.retain(|eid| *eid != id);
        debug!(entity = %entity, "removed entity");
        Ok(entity)
    }

    /// Returns true if the entity is live in this group.
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Get a live entity by handle.
    pub fn get(&self, id: EntityId) -> EcsResult<&Entity> {
        self.entities.get(&id).ok_or(EcsError::EntityNotFound(id))
    }

    /// Get a live entity mutably by handle.
    ///
    /// The handle only allows changes the registry accepts.
    pub fn get_mut(&mut self, id: EntityId) -> EcsResult<EntityMut<'_>> {
        let Self {
            registry, entities, ..
        } = self;
        entities
            .get_mut(&id)
            .map(|entity| EntityMut::new(entity, registry))
            .ok_or(EcsError::EntityNotFound(id))
    }

    /// Attach or replace a component on a live entity, checked against the registry.
    pub fn attach(&mut self, id: EntityId, instance: ComponentInstance) -> EcsResult<Option<ComponentInstance>> {
        self.get_mut(id)?.set_component(instance)
    }

    /// All live entities in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.order.iter().filter_map(|id| self.entities.get(id))
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if no entity is live.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Handles of every live entity holding all of `tags`, in insertion order.
    ///
    /// The result is a snapshot taken at call time: adding or removing
    /// entities afterwards never disturbs it, and the next call sees the
    /// change.
    pub fn query(&self, tags: &[&str]) -> Vec<EntityId> {
        self.select().with_all(tags).ids()
    }

    /// Start building a filtered query.
    pub fn select(&self) -> QueryBuilder<'_> {
        QueryBuilder::new(self)
    }

    /// The earliest-added live entity holding all of `tags`.
    ///
    /// Duplicates are tolerated: the first match wins. Zero matches means a
    /// required always-present entity was never mounted, reported as
    /// [`EcsError::SingletonNotFound`].
    pub fn query_singleton(&self, tags: &[&str]) -> EcsResult<EntityId> {
        self.select()
            .with_all(tags)
            .first()
            .map(Entity::id)
            .ok_or_else(|| EcsError::singleton_not_found(tags))
    }

    /// Like [`EntityGroup::query_singleton`] but fails with
    /// [`EcsError::SingletonNotUnique`] when more than one entity matches.
    pub fn query_unique(&self, tags: &[&str]) -> EcsResult<EntityId> {
        let matches = self.query(tags);
        match matches.as_slice() {
            [] => Err(EcsError::singleton_not_found(tags)),
            [id] => Ok(*id),
            _ => Err(EcsError::SingletonNotUnique {
                tags: tags.iter().map(|t| t.to_string()).collect(),
                count: matches.len(),
            }),
        }
    }

    /// Borrow the singleton entity holding all of `tags`.
    pub fn singleton(&self, tags: &[&str]) -> EcsResult<&Entity> {
        let id = self.query_singleton(tags)?;
        self.get(id)
    }

    /// Mutably borrow the singleton entity holding all of `tags`.
    pub fn singleton_mut(&mut self, tags: &[&str]) -> EcsResult<EntityMut<'_>> {
        let id = self.query_singleton(tags)?;
        self.get_mut(id)
    }

    // -----------------------------------------------------------------------
    // Systems
    // -----------------------------------------------------------------------

    /// Mount a function as a system. Mount order is execution order.
    pub fn mount_system<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&mut EntityGroup) -> EcsResult<()> + 'static,
    {
        self.mount(FnSystem::new(name, f));
    }

    /// Mount any [`System`] implementation.
    pub fn mount<S: System + 'static>(&mut self, system: S) {
        debug!(system = system.name(), position = self.systems.len(), "mounted system");
        self.systems.push(Box::new(system));
    }

    /// Names of mounted systems in execution order.
    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.name()).collect()
    }

    /// Number of frames started so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Run every mounted system once, in mount order.
    ///
    /// Each system sees the writes of the systems before it. The first failure
    /// aborts the rest of the frame and is returned wrapped in
    /// [`EcsError::SystemFailed`]. Systems mounted while the frame runs are
    /// queued behind the existing ones and first run next frame.
    pub fn run_systems(&mut self) -> EcsResult<()> {
        self.frame += 1;
        let frame = self.frame;
        let span = debug_span!("frame", frame);
        let _enter = span.enter();

        let systems = std::mem::take(&mut self.systems);
        let result = systems.iter().try_for_each(|system| {
            trace!(system = system.name(), "running system");
            system.run(self).map_err(|source| EcsError::SystemFailed {
                system: system.name().to_string(),
                frame,
                source: Box::new(source),
            })
        });

        let mounted_mid_frame = std::mem::replace(&mut self.systems, systems);
        self.systems.extend(mounted_mid_frame);

        if let Err(ref err) = result {
            debug!(error = %err, "frame aborted");
        }
        result
    }
}

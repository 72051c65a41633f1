use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::component::{Component, ComponentInstance};
use crate::error::{EcsError, EcsResult};
use crate::registry::ComponentRegistry;

/// Opaque unique handle for an entity.
///
/// Identity never depends on the entity's name; two entities may share a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Generate a new random entity ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// An identity-bearing bag of component instances keyed by tag.
///
/// Entities are built detached (via [`Entity::new`], [`Entity::named`], or
/// [`EntityGroup::create`](crate::EntityGroup::create)) and only become visible
/// to queries once added to a group.
///
/// `Entity` does not implement [`Clone`]: copying must go through
/// [`Entity::duplicate`], which always assigns a fresh identity.
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    /// Display label. Not an identity key; duplicates are allowed.
    pub name: String,
    components: HashMap<String, ComponentInstance>,
    // Attachment order, so tag listings and duplicates are deterministic.
    order: Vec<String>,
}

impl Entity {
    /// Create an unnamed entity with a fresh identity and no components.
    pub fn new() -> Self {
        Self::named(String::new())
    }

    /// Create an entity with a fresh identity, a display name, and no components.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            components: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// The entity's identity.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Name and short id, used in diagnostics.
    pub fn label(&self) -> String {
        label_for(&self.name, self.id)
    }

    // -----------------------------------------------------------------------
    // Dynamic components
    // -----------------------------------------------------------------------

    /// Attach a component, replacing any existing instance with the same tag.
    ///
    /// Returns the replaced instance, if any.
    pub fn set_component(&mut self, instance: ComponentInstance) -> Option<ComponentInstance> {
        let tag = instance.tag().to_string();
        let previous = self.components.insert(tag.clone(), instance);
        if previous.is_none() {
            self.order.push(tag);
        }
        previous
    }

    /// Builder-style [`Entity::set_component`].
    pub fn with_component(mut self, instance: ComponentInstance) -> Self {
        self.set_component(instance);
        self
    }

    /// Detach a component and return it.
    pub fn remove_component(&mut self, tag: &str) -> EcsResult<ComponentInstance> {
        let instance = self
            .components
            .remove(tag)
            .ok_or_else(|| self.not_found(tag))?;
        self.order.retain(|t| t != tag);
        Ok(instance)
    }

    /// Returns true if the entity currently holds a component with this tag.
    pub fn contains(&self, tag: &str) -> bool {
        self.components.contains_key(tag)
    }

    /// Returns true if the entity holds every one of the given tags.
    pub fn contains_all(&self, tags: &[&str]) -> bool {
        tags.iter().all(|t| self.contains(t))
    }

    /// Read a component. Absence is an error, never a default.
    pub fn component(&self, tag: &str) -> EcsResult<&ComponentInstance> {
        self.components.get(tag).ok_or_else(|| self.not_found(tag))
    }

    /// Mutable access to a component.
    pub fn component_mut(&mut self, tag: &str) -> EcsResult<&mut ComponentInstance> {
        let Self {
            id,
            name,
            components,
            ..
        } = self;
        components
            .get_mut(tag)
            .ok_or_else(|| EcsError::ComponentNotFound {
                tag: tag.to_string(),
                entity: label_for(name, *id),
            })
    }

    /// Component tags in attachment order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Attached components in attachment order.
    pub fn components(&self) -> impl Iterator<Item = &ComponentInstance> {
        self.order.iter().filter_map(|t| self.components.get(t))
    }

    /// Number of attached components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if no component is attached.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    // -----------------------------------------------------------------------
    // Typed components
    // -----------------------------------------------------------------------

    /// Attach a typed component under its tag.
    pub fn insert<T: Component>(&mut self, value: &T) -> EcsResult<Option<ComponentInstance>> {
        Ok(self.set_component(ComponentInstance::from_typed(value)?))
    }

    /// Builder-style [`Entity::insert`].
    pub fn with<T: Component>(mut self, value: &T) -> EcsResult<Self> {
        self.insert(value)?;
        Ok(self)
    }

    /// Read a typed copy of a component.
    pub fn get<T: Component>(&self) -> EcsResult<T> {
        self.component(T::TAG)?.to_typed()
    }

    /// Read a typed component, let `f` mutate it, and write it back.
    pub fn modify<T, R>(&mut self, f: impl FnOnce(&mut T) -> R) -> EcsResult<R>
    where
        T: Component,
    {
        let mut value: T = self.get()?;
        let out = f(&mut value);
        let updated = ComponentInstance::from_typed(&value)?;
        *self.component_mut(T::TAG)? = updated;
        Ok(out)
    }

    // -----------------------------------------------------------------------
    // Prototypes
    // -----------------------------------------------------------------------

    /// Copy this entity under a fresh identity.
    ///
    /// Every component is deep-copied with its current (possibly mutated)
    /// values; later changes to either entity never affect the other.
    pub fn duplicate(&self) -> Self {
        Self {
            id: EntityId::new(),
            name: self.name.clone(),
            components: self.components.clone(),
            order: self.order.clone(),
        }
    }

    fn not_found(&self, tag: &str) -> EcsError {
        EcsError::ComponentNotFound {
            tag: tag.to_string(),
            entity: self.label(),
        }
    }
}

fn label_for(name: &str, id: EntityId) -> String {
    if name.is_empty() {
        format!("<{id}>")
    } else {
        format!("\"{name}\" <{id}>")
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Mutable access to an entity that is live in a group.
///
/// Handed out by [`EntityGroup::get_mut`](crate::EntityGroup::get_mut) and
/// [`EntityGroup::singleton_mut`](crate::EntityGroup::singleton_mut). Reads go
/// through [`Deref`] to the [`Entity`]. Writes either edit existing fields in
/// place or attach instances that the registry has checked, so a live entity
/// always matches its declared schemas.
pub struct EntityMut<'g> {
    entity: &'g mut Entity,
    registry: &'g ComponentRegistry,
}

impl<'g> EntityMut<'g> {
    pub(crate) fn new(entity: &'g mut Entity, registry: &'g ComponentRegistry) -> Self {
        Self { entity, registry }
    }

    /// Attach or replace a component after checking it against the registry.
    pub fn set_component(&mut self, instance: ComponentInstance) -> EcsResult<Option<ComponentInstance>> {
        self.registry.validate(&instance)?;
        Ok(self.entity.set_component(instance))
    }

    /// Attach or replace a typed component after checking it against the registry.
    pub fn insert<T: Component>(&mut self, value: &T) -> EcsResult<Option<ComponentInstance>> {
        self.set_component(ComponentInstance::from_typed(value)?)
    }

    /// Detach a component and return it.
    pub fn remove_component(&mut self, tag: &str) -> EcsResult<ComponentInstance> {
        self.entity.remove_component(tag)
    }

    /// Mutable access to one field of an attached component.
    pub fn field_mut(&mut self, tag: &str, field: &str) -> EcsResult<&mut Value> {
        self.entity.component_mut(tag)?.get_mut(field)
    }

    /// Assign one field of an attached component.
    pub fn set_field(&mut self, tag: &str, field: &str, value: impl Into<Value>) -> EcsResult<()> {
        self.entity.component_mut(tag)?.set(field, value)
    }

    /// Read a typed component, let `f` mutate it, and write it back.
    ///
    /// The written-back instance is checked against the registry first.
    pub fn modify<T, R>(&mut self, f: impl FnOnce(&mut T) -> R) -> EcsResult<R>
    where
        T: Component,
    {
        let mut value: T = self.entity.get()?;
        let out = f(&mut value);
        let updated = ComponentInstance::from_typed(&value)?;
        self.registry.validate(&updated)?;
        *self.entity.component_mut(T::TAG)? = updated;
        Ok(out)
    }

    /// Change the display name.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.entity.name = name.into();
    }
}

impl Deref for EntityMut<'_> {
    type Target = Entity;

    fn deref(&self) -> &Entity {
        self.entity
    }
}

impl fmt::Debug for EntityMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityMut").field(&self.entity).finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::component::ComponentKind;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Motion {
        position: [f64; 2],
    }

    impl Component for Motion {
        const TAG: &'static str = "motion";

        fn kind() -> ComponentKind {
            ComponentKind::new("motion").field("position", json!([0.0, 0.0]))
        }
    }

    fn sound(file: &str) -> ComponentInstance {
        ComponentKind::new("sound")
            .required("sound_file")
            .field("volume", 1.0)
            .instantiate([("sound_file", json!(file))])
            .unwrap()
    }

    #[test]
    fn entity_id_display_shows_short_form() {
        let id = EntityId(Uuid::parse_str("a3f2b1c8-1234-5678-9abc-def012345678").unwrap());
        assert_eq!(id.to_string(), "a3f2b1c8");
    }

    #[test]
    fn new_entity_is_empty() {
        let entity = Entity::named("player");
        assert!(entity.is_empty());
        assert_eq!(entity.name, "player");
        assert!(!entity.contains("motion"));
    }

    #[test]
    fn names_do_not_determine_identity() {
        let a = Entity::named("sound");
        let b = Entity::named("sound");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn absent_component_is_an_error() {
        let entity = Entity::named("spawn");
        let err = entity.component("motion").unwrap_err();
        assert!(matches!(err, EcsError::ComponentNotFound { ref tag, .. } if tag == "motion"));
        assert!(err.to_string().contains("spawn"));
    }

    #[test]
    fn set_component_replaces_in_place() {
        let mut entity = Entity::new();
        assert!(entity.set_component(sound("a.mp3")).is_none());
        let replaced = entity.set_component(sound("b.mp3")).unwrap();
        assert_eq!(replaced.get_str("sound_file").unwrap(), "a.mp3");
        assert_eq!(entity.len(), 1);
        assert_eq!(
            entity.component("sound").unwrap().get_str("sound_file").unwrap(),
            "b.mp3"
        );
    }

    #[test]
    fn remove_component_detaches() {
        let mut entity = Entity::new().with_component(sound("a.mp3"));
        entity.remove_component("sound").unwrap();
        assert!(!entity.contains("sound"));
        assert!(entity.remove_component("sound").is_err());
    }

    #[test]
    fn tags_follow_attachment_order() {
        let entity = Entity::new()
            .with_component(sound("a.mp3"))
            .with(&Motion {
                position: [1.0, 2.0],
            })
            .unwrap();
        assert_eq!(entity.tags().collect::<Vec<_>>(), vec!["sound", "motion"]);
        assert!(entity.contains_all(&["motion", "sound"]));
        assert!(!entity.contains_all(&["motion", "health"]));
    }

    #[test]
    fn modify_writes_typed_changes_back() {
        let mut entity = Entity::new()
            .with(&Motion {
                position: [0.0, 0.0],
            })
            .unwrap();
        entity
            .modify::<Motion, _>(|m| m.position[0] += 3.0)
            .unwrap();
        assert_eq!(entity.get::<Motion>().unwrap().position, [3.0, 0.0]);
    }

    // Same tag as `Motion` but serializes an extra field.
    #[derive(Debug, Serialize, Deserialize)]
    struct WideMotion {
        position: [f64; 2],
        #[serde(default)]
        velocity: f64,
    }

    impl Component for WideMotion {
        const TAG: &'static str = "motion";

        fn kind() -> ComponentKind {
            Motion::kind()
        }
    }

    fn motion_registry() -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        registry.register::<Motion>().unwrap();
        registry
    }

    #[test]
    fn live_modify_checks_the_written_back_shape() {
        let registry = motion_registry();
        let mut entity = Entity::new()
            .with(&Motion {
                position: [1.0, 1.0],
            })
            .unwrap();
        let mut live = EntityMut::new(&mut entity, &registry);

        live.modify::<Motion, _>(|m| m.position[1] = 5.0).unwrap();
        let err = live
            .modify::<WideMotion, _>(|m| m.velocity = 2.0)
            .unwrap_err();
        assert!(matches!(err, EcsError::UnknownField { ref field, .. } if field == "velocity"));

        assert_eq!(live.get::<Motion>().unwrap().position, [1.0, 5.0]);
        registry.validate_entity(&entity).unwrap();
    }

    #[test]
    fn live_insert_rejects_undeclared_kinds() {
        let registry = motion_registry();
        let mut entity = Entity::new();
        let mut live = EntityMut::new(&mut entity, &registry);

        assert!(matches!(
            live.set_component(sound("hit.mp3")),
            Err(EcsError::UnknownComponent(ref t)) if t == "sound"
        ));
        assert!(matches!(
            live.insert(&WideMotion {
                position: [0.0, 0.0],
                velocity: 1.0,
            }),
            Err(EcsError::UnknownField { .. })
        ));
        live.insert(&Motion {
            position: [2.0, 0.0],
        })
        .unwrap();
        live.rename("runner");
        assert_eq!(entity.name, "runner");
        assert_eq!(entity.tags().collect::<Vec<_>>(), vec!["motion"]);
    }

    #[test]
    fn duplicate_has_new_identity_and_current_values() {
        let mut template = Entity::named("enemy").with_component(sound("hit.mp3"));
        template
            .component_mut("sound")
            .unwrap()
            .set("volume", 0.25)
            .unwrap();

        let copy = template.duplicate();
        assert_ne!(copy.id(), template.id());
        assert_eq!(copy.name, "enemy");
        assert_eq!(
            copy.component("sound").unwrap().get_f64("volume").unwrap(),
            0.25
        );
    }

    #[test]
    fn duplicate_is_deep() {
        let mut template = Entity::named("enemy").with_component(sound("hit.mp3"));
        let mut copy = template.duplicate();

        copy.component_mut("sound")
            .unwrap()
            .set("sound_file", "other.mp3")
            .unwrap();
        template
            .component_mut("sound")
            .unwrap()
            .set("volume", 0.0)
            .unwrap();

        assert_eq!(
            template.component("sound").unwrap().get_str("sound_file").unwrap(),
            "hit.mp3"
        );
        assert_eq!(
            copy.component("sound").unwrap().get_f64("volume").unwrap(),
            1.0
        );
    }
}

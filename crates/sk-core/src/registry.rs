use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::component::{Component, ComponentInstance, ComponentKind};
use crate::entity::Entity;
use crate::error::{EcsError, EcsResult};

/// Registry of declared component kinds, keyed by tag.
///
/// Built once at startup and handed to the [`EntityGroup`](crate::EntityGroup)
/// that owns it. Gameplay code refers to components by tag only, so the
/// registry is the single place that knows each tag's shape.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    kinds: HashMap<String, ComponentKind>,
    // Declaration order, for deterministic listings.
    order: Vec<String>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component kind under its tag.
    ///
    /// Declaring the same tag twice fails with
    /// [`EcsError::DuplicateDeclaration`].
    pub fn declare(&mut self, kind: ComponentKind) -> EcsResult<&ComponentKind> {
        let tag = kind.tag().to_string();
        if self.kinds.contains_key(&tag) {
            return Err(EcsError::DuplicateDeclaration(tag));
        }
        debug!(component = %tag, fields = kind.fields().len(), "declared component");
        self.order.push(tag.clone());
        Ok(self.kinds.entry(tag).or_insert(kind))
    }

    /// Register the schema of a typed component.
    pub fn register<T: Component>(&mut self) -> EcsResult<&ComponentKind> {
        self.declare(T::kind())
    }

    /// Look up a declared kind.
    pub fn get(&self, tag: &str) -> EcsResult<&ComponentKind> {
        self.kinds
            .get(tag)
            .ok_or_else(|| EcsError::UnknownComponent(tag.to_string()))
    }

    /// Returns true if the tag has been declared.
    pub fn contains(&self, tag: &str) -> bool {
        self.kinds.contains_key(tag)
    }

    /// Declared kinds in declaration order.
    pub fn kinds(&self) -> impl Iterator<Item = &ComponentKind> {
        self.order.iter().filter_map(|t| self.kinds.get(t))
    }

    /// Declared tags in declaration order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Number of declared kinds.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Returns true if nothing has been declared.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Build an instance of a declared kind, see [`ComponentKind::instantiate`].
    pub fn instantiate<I, K>(&self, tag: &str, overrides: I) -> EcsResult<ComponentInstance>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        self.get(tag)?.instantiate(overrides)
    }

    /// Build an instance of a declared kind with no overrides.
    pub fn instantiate_defaults(&self, tag: &str) -> EcsResult<ComponentInstance> {
        self.get(tag)?.instantiate_defaults()
    }

    /// Check an instance against the schema declared for its tag.
    pub fn validate(&self, instance: &ComponentInstance) -> EcsResult<()> {
        self.get(instance.tag())?.validate(instance)
    }

    /// Check every component attached to an entity.
    pub fn validate_entity(&self, entity: &Entity) -> EcsResult<()> {
        entity.components().try_for_each(|c| self.validate(c))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn registry() -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        registry
            .declare(
                ComponentKind::new("health")
                    .required("health")
                    .field("previous_health", 0)
                    .field("is_alive", true),
            )
            .unwrap();
        registry
            .declare(ComponentKind::new("turn").field("number", 0))
            .unwrap();
        registry
    }

    #[test]
    fn redeclaring_a_tag_fails() {
        let mut registry = registry();
        let err = registry
            .declare(ComponentKind::new("turn"))
            .unwrap_err();
        assert!(matches!(err, EcsError::DuplicateDeclaration(ref t) if t == "turn"));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn tags_keep_declaration_order() {
        let registry = registry();
        assert_eq!(registry.tags().collect::<Vec<_>>(), vec!["health", "turn"]);
    }

    #[test]
    fn instantiate_by_tag() {
        let registry = registry();
        let turn = registry.instantiate_defaults("turn").unwrap();
        assert_eq!(turn.get_i64("number").unwrap(), 0);

        let health = registry
            .instantiate("health", [("health", json!(12))])
            .unwrap();
        assert_eq!(health.get_i64("health").unwrap(), 12);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let registry = registry();
        assert!(matches!(
            registry.instantiate_defaults("camera"),
            Err(EcsError::UnknownComponent(ref t)) if t == "camera"
        ));
    }

    #[test]
    fn validate_entity_checks_every_component() {
        let registry = registry();
        let ok = Entity::new().with_component(registry.instantiate_defaults("turn").unwrap());
        registry.validate_entity(&ok).unwrap();

        let stray = ComponentKind::new("turn")
            .field("round", 1)
            .instantiate_defaults()
            .unwrap();
        let bad = Entity::new().with_component(stray);
        assert!(registry.validate_entity(&bad).is_err());
    }
}

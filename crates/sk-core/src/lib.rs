//! Core ECS runtime for Skirmish.
//!
//! Gameplay is expressed as data attached to entities plus systems that query
//! that data once per frame. This crate owns the pieces every system relies
//! on: the component schema registry, entities and their component instances,
//! the [`EntityGroup`] that stores live entities and answers queries, and the
//! ordered system scheduler mounted on the group.
//!
//! Nothing here knows about rendering, input, or timing. A driver calls
//! [`EntityGroup::run_systems`] once per frame.

/// Component kinds, component instances, and the typed [`Component`] layer.
pub mod component;
/// Entity identifiers and the entity component bag.
pub mod entity;
/// Error types used throughout the crate.
pub mod error;
/// The entity group: live entity storage, queries, and mounted systems.
pub mod group;
/// Query builder for filtering live entities by component tags.
pub mod query;
/// The component schema registry.
pub mod registry;
/// The system trait and function-backed systems.
pub mod system;

/// Re-export component types.
pub use component::{Component, ComponentInstance, ComponentKind, FieldDefault, FieldSpec};
/// Re-export entity types.
pub use entity::{Entity, EntityId, EntityMut};
/// Re-export error types.
pub use error::{EcsError, EcsResult};
/// Re-export the entity group.
pub use group::EntityGroup;
/// Re-export the query builder.
pub use query::QueryBuilder;
/// Re-export the schema registry.
pub use registry::ComponentRegistry;
/// Re-export system types.
pub use system::{FnSystem, System};

/// Re-export of the dynamic field value type.
pub use serde_json::Value;

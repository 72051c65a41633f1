use crate::entity::EntityId;

/// Alias for `Result<T, EcsError>`.
pub type EcsResult<T> = Result<T, EcsError>;

/// Errors raised by the ECS runtime.
///
/// Every variant signals a programming error: the runtime never retries or
/// recovers locally, it reports enough context to find the defect.
#[derive(Debug, thiserror::Error)]
pub enum EcsError {
    /// A component tag was declared twice.
    #[error("component \"{0}\" is already declared")]
    DuplicateDeclaration(String),

    /// A component tag was used that the registry does not know.
    #[error("component \"{0}\" is not declared")]
    UnknownComponent(String),

    /// A required field was not supplied when instantiating a component.
    #[error("component \"{tag}\" requires field \"{field}\"")]
    MissingField {
        /// The component tag being instantiated.
        tag: String,
        /// The required field that was omitted.
        field: String,
    },

    /// A field name that the component kind does not declare.
    #[error("component \"{tag}\" has no field \"{field}\"")]
    UnknownField {
        /// The component tag.
        tag: String,
        /// The undeclared field name.
        field: String,
    },

    /// A field value could not be read as the requested type.
    #[error("field \"{tag}.{field}\" is not a {expected}")]
    FieldType {
        /// The component tag.
        tag: String,
        /// The field name.
        field: String,
        /// Human-readable name of the expected type.
        expected: &'static str,
    },

    /// An entity does not hold the requested component.
    #[error("entity {entity} has no component \"{tag}\"")]
    ComponentNotFound {
        /// The missing component tag.
        tag: String,
        /// Display label of the entity (name and short id).
        entity: String,
    },

    /// The entity is not live in the group.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// A singleton query matched no entity.
    #[error("no singleton entity has components [{}]", .tags.join(", "))]
    SingletonNotFound {
        /// The requested tags.
        tags: Vec<String>,
    },

    /// A strict singleton query matched more than one entity.
    #[error("{count} entities have components [{}], expected exactly one", .tags.join(", "))]
    SingletonNotUnique {
        /// The requested tags.
        tags: Vec<String>,
        /// How many live entities matched.
        count: usize,
    },

    /// A mounted system failed; the rest of the frame was aborted.
    #[error("system \"{system}\" failed in frame {frame}: {source}")]
    SystemFailed {
        /// Name of the failing system.
        system: String,
        /// Frame number in which the failure happened.
        frame: u64,
        /// The underlying failure.
        #[source]
        source: Box<EcsError>,
    },

    /// A system hit a condition it cannot continue from.
    #[error("system error: {0}")]
    SystemError(String),

    /// A typed component could not be converted to or from its fields.
    #[error("component conversion failed: {0}")]
    Serde(#[from] serde_json::Error),
}

impl EcsError {
    /// Builds a [`EcsError::SingletonNotFound`] from a tag list.
    pub fn singleton_not_found(tags: &[&str]) -> Self {
        Self::SingletonNotFound {
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Strips any [`EcsError::SystemFailed`] wrappers and returns the root cause.
    pub fn root_cause(&self) -> &EcsError {
        match self {
            Self::SystemFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton_not_found_lists_tags() {
        let err = EcsError::singleton_not_found(&["player", "motion"]);
        assert_eq!(
            err.to_string(),
            "no singleton entity has components [player, motion]"
        );
    }

    #[test]
    fn root_cause_unwraps_nested_system_failures() {
        let inner = EcsError::singleton_not_found(&["turn"]);
        let err = EcsError::SystemFailed {
            system: "turn".to_string(),
            frame: 3,
            source: Box::new(inner),
        };
        assert!(matches!(
            err.root_cause(),
            EcsError::SingletonNotFound { .. }
        ));
        assert!(err.to_string().contains("frame 3"));
    }
}

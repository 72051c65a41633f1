use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{EcsError, EcsResult};

/// How a field obtains its value when it is not overridden at instantiation.
pub enum FieldDefault {
    /// No default: the field must be supplied.
    Required,
    /// A static default, cloned into every instance.
    Value(Value),
    /// A zero-argument producer invoked once per instance.
    Factory(Box<dyn Fn() -> Value>),
}

impl FieldDefault {
    /// Returns true if the field has neither a default nor a factory.
    pub fn is_required(&self) -> bool {
        matches!(self, Self::Required)
    }

    fn produce(&self) -> Option<Value> {
        match self {
            Self::Required => None,
            Self::Value(v) => Some(v.clone()),
            Self::Factory(f) => Some(f()),
        }
    }
}

impl fmt::Debug for FieldDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "Required"),
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Factory(_) => write!(f, "Factory(..)"),
        }
    }
}

impl fmt::Display for FieldDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => write!(f, "required"),
            Self::Value(v) => write!(f, "{v}"),
            Self::Factory(_) => write!(f, "<factory>"),
        }
    }
}

/// A single field declaration of a component kind.
#[derive(Debug)]
pub struct FieldSpec {
    /// The field name.
    pub name: String,
    /// Where the field's value comes from when not overridden.
    pub default: FieldDefault,
}

/// A declared component shape: a unique tag plus ordered field declarations.
///
/// Built with a small builder and handed to
/// [`ComponentRegistry::declare`](crate::ComponentRegistry::declare):
///
/// ```
/// use sk_core::{ComponentKind, Value};
///
/// let health = ComponentKind::new("health")
///     .required("health")
///     .field("previous_health", 0)
///     .field("is_alive", true);
/// let log = ComponentKind::new("log").factory("lines", || Value::Array(Vec::new()));
/// assert_eq!(health.fields().len(), 3);
/// assert_eq!(log.tag(), "log");
/// ```
#[derive(Debug)]
pub struct ComponentKind {
    tag: String,
    fields: Vec<FieldSpec>,
}

impl ComponentKind {
    /// Start declaring a component kind with the given tag and no fields.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            fields: Vec::new(),
        }
    }

    /// Declare a field that must be supplied at instantiation.
    pub fn required(self, name: impl Into<String>) -> Self {
        self.with_field(name.into(), FieldDefault::Required)
    }

    /// Declare a field with a static default value.
    pub fn field(self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.with_field(name.into(), FieldDefault::Value(default.into()))
    }

    /// Declare a field whose default is produced fresh for every instance.
    pub fn factory(self, name: impl Into<String>, producer: impl Fn() -> Value + 'static) -> Self {
        self.with_field(name.into(), FieldDefault::Factory(Box::new(producer)))
    }

    // A repeated field name replaces the earlier declaration in place.
    fn with_field(mut self, name: String, default: FieldDefault) -> Self {
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.default = default,
            None => self.fields.push(FieldSpec { name, default }),
        }
        self
    }

    /// The component tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Field declarations in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Look up a single field declaration.
    pub fn field_spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Build an instance of this kind.
    ///
    /// Overridden fields take the supplied value. Every other field takes its
    /// static default or a fresh call of its factory. Omitting a required
    /// field fails with [`EcsError::MissingField`]; overriding an undeclared
    /// field fails with [`EcsError::UnknownField`].
    pub fn instantiate<I, K>(&self, overrides: I) -> EcsResult<ComponentInstance>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut overrides: Map<String, Value> = overrides
            .into_iter()
            .map(|(k, v)| (k.into(), v))
            .collect();

        if let Some(unknown) = overrides.keys().find(|k| self.field_spec(k).is_none()) {
            return Err(EcsError::UnknownField {
                tag: self.tag.clone(),
                field: unknown.clone(),
            });
        }

        let mut fields = Map::new();
        for spec in &self.fields {
            let value = match overrides.remove(&spec.name) {
                Some(v) => v,
                None => spec.default.produce().ok_or_else(|| EcsError::MissingField {
                    tag: self.tag.clone(),
                    field: spec.name.clone(),
                })?,
            };
            fields.insert(spec.name.clone(), value);
        }

        Ok(ComponentInstance {
            tag: self.tag.clone(),
            fields,
        })
    }

    /// Build an instance using only declared defaults and factories.
    pub fn instantiate_defaults(&self) -> EcsResult<ComponentInstance> {
        self.instantiate(std::iter::empty::<(String, Value)>())
    }

    /// Check that an instance has exactly the fields this kind declares.
    pub fn validate(&self, instance: &ComponentInstance) -> EcsResult<()> {
        if let Some(unknown) = instance
            .fields
            .keys()
            .find(|k| self.field_spec(k).is_none())
        {
            return Err(EcsError::UnknownField {
                tag: self.tag.clone(),
                field: unknown.clone(),
            });
        }
        if let Some(missing) = self
            .fields
            .iter()
            .find(|spec| !instance.fields.contains_key(&spec.name))
        {
            return Err(EcsError::MissingField {
                tag: self.tag.clone(),
                field: missing.name.clone(),
            });
        }
        Ok(())
    }
}

/// A concrete component value attached to one entity.
///
/// The field set is fixed when the instance is built; values are mutable.
/// Cloning an instance deep-copies every field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentInstance {
    tag: String,
    fields: Map<String, Value>,
}

impl ComponentInstance {
    /// The tag of the component kind this instance belongs to.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// All fields and their current values.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Returns true if the instance has a field with this name.
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Read a field's raw value.
    pub fn get(&self, field: &str) -> EcsResult<&Value> {
        self.fields
            .get(field)
            .ok_or_else(|| self.unknown_field(field))
    }

    /// Mutable access to a field's raw value.
    pub fn get_mut(&mut self, field: &str) -> EcsResult<&mut Value> {
        let tag = &self.tag;
        self.fields
            .get_mut(field)
            .ok_or_else(|| EcsError::UnknownField {
                tag: tag.clone(),
                field: field.to_string(),
            })
    }

    /// Assign a field. The field must already exist on the instance.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> EcsResult<()> {
        *self.get_mut(field)? = value.into();
        Ok(())
    }

    /// Read a field as a signed integer.
    pub fn get_i64(&self, field: &str) -> EcsResult<i64> {
        self.get(field)?
            .as_i64()
            .ok_or_else(|| self.type_error(field, "integer"))
    }

    /// Read a field as a float. Integers are widened.
    pub fn get_f64(&self, field: &str) -> EcsResult<f64> {
        self.get(field)?
            .as_f64()
            .ok_or_else(|| self.type_error(field, "number"))
    }

    /// Read a field as a boolean.
    pub fn get_bool(&self, field: &str) -> EcsResult<bool> {
        self.get(field)?
            .as_bool()
            .ok_or_else(|| self.type_error(field, "boolean"))
    }

    /// Read a field as a string slice.
    pub fn get_str(&self, field: &str) -> EcsResult<&str> {
        self.get(field)?
            .as_str()
            .ok_or_else(|| self.type_error(field, "string"))
    }

    /// Deserialize a single field into any serde type.
    pub fn read<T: DeserializeOwned>(&self, field: &str) -> EcsResult<T> {
        Ok(serde_json::from_value(self.get(field)?.clone())?)
    }

    /// Build an instance from a typed component.
    pub fn from_typed<T: Component>(value: &T) -> EcsResult<Self> {
        match serde_json::to_value(value)? {
            Value::Object(fields) => Ok(Self {
                tag: T::TAG.to_string(),
                fields,
            }),
            _ => Err(EcsError::FieldType {
                tag: T::TAG.to_string(),
                field: "*".to_string(),
                expected: "struct with named fields",
            }),
        }
    }

    /// Convert the instance back into a typed component.
    pub fn to_typed<T: Component>(&self) -> EcsResult<T> {
        Ok(serde_json::from_value(Value::Object(self.fields.clone()))?)
    }

    fn unknown_field(&self, field: &str) -> EcsError {
        EcsError::UnknownField {
            tag: self.tag.clone(),
            field: field.to_string(),
        }
    }

    fn type_error(&self, field: &str, expected: &'static str) -> EcsError {
        EcsError::FieldType {
            tag: self.tag.clone(),
            field: field.to_string(),
            expected,
        }
    }
}

/// A statically typed component.
///
/// Implemented by plain serde structs with named fields. The struct gives call
/// sites type safety; [`Component::kind`] gives the registry the matching
/// dynamic schema so the two views stay interchangeable.
pub trait Component: Serialize + DeserializeOwned {
    /// The tag this component is stored under.
    const TAG: &'static str;

    /// The schema declared for this component.
    fn kind() -> ComponentKind;
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    fn health_kind() -> ComponentKind {
        ComponentKind::new("health")
            .required("health")
            .field("previous_health", 0)
            .field("is_alive", true)
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Health {
        health: i64,
        previous_health: i64,
        is_alive: bool,
    }

    impl Component for Health {
        const TAG: &'static str = "health";

        fn kind() -> ComponentKind {
            health_kind()
        }
    }

    #[test]
    fn instantiate_applies_defaults_and_overrides() {
        let h = health_kind()
            .instantiate([("health", json!(10))])
            .unwrap();
        assert_eq!(h.tag(), "health");
        assert_eq!(h.get_i64("health").unwrap(), 10);
        assert_eq!(h.get_i64("previous_health").unwrap(), 0);
        assert!(h.get_bool("is_alive").unwrap());
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let err = health_kind()
            .instantiate_defaults()
            .unwrap_err();
        assert!(matches!(
            err,
            EcsError::MissingField { ref tag, ref field } if tag == "health" && field == "health"
        ));
    }

    #[test]
    fn undeclared_override_is_rejected() {
        let err = health_kind()
            .instantiate([("health", json!(1)), ("mana", json!(3))])
            .unwrap_err();
        assert!(matches!(err, EcsError::UnknownField { ref field, .. } if field == "mana"));
    }

    #[test]
    fn factory_runs_once_per_instance() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let kind = ComponentKind::new("tile_area").factory("tiles", move || {
            counter.set(counter.get() + 1);
            json!([])
        });

        let mut a = kind.instantiate_defaults().unwrap();
        let b = kind.instantiate_defaults().unwrap();
        assert_eq!(calls.get(), 2);

        a.get_mut("tiles")
            .unwrap()
            .as_array_mut()
            .unwrap()
            .push(json!([1, 2]));
        assert_eq!(a.get("tiles").unwrap(), &json!([[1, 2]]));
        assert_eq!(b.get("tiles").unwrap(), &json!([]));
    }

    #[test]
    fn static_defaults_are_not_shared() {
        let kind = ComponentKind::new("controls").field("actions", json!([]));
        let mut a = kind.instantiate_defaults().unwrap();
        let b = kind.instantiate_defaults().unwrap();
        a.set("actions", json!(["cast"])).unwrap();
        assert_eq!(b.get("actions").unwrap(), &json!([]));
    }

    #[test]
    fn set_rejects_undeclared_field() {
        let mut h = health_kind().instantiate([("health", json!(3))]).unwrap();
        assert!(h.set("armor", 2).is_err());
        h.set("health", -5).unwrap();
        assert_eq!(h.get_i64("health").unwrap(), -5);
    }

    #[test]
    fn typed_read_reports_type_mismatch() {
        let h = health_kind().instantiate([("health", json!("lots"))]).unwrap();
        let err = h.get_i64("health").unwrap_err();
        assert!(matches!(err, EcsError::FieldType { expected: "integer", .. }));
    }

    #[test]
    fn repeated_field_declaration_replaces_default() {
        let kind = ComponentKind::new("sound")
            .field("volume", 1.0)
            .field("volume", 0.5);
        assert_eq!(kind.fields().len(), 1);
        let s = kind.instantiate_defaults().unwrap();
        assert_eq!(s.get_f64("volume").unwrap(), 0.5);
    }

    #[test]
    fn typed_component_converts_both_ways() {
        let typed = Health {
            health: 4,
            previous_health: 7,
            is_alive: true,
        };
        let instance = ComponentInstance::from_typed(&typed).unwrap();
        assert_eq!(instance.tag(), "health");
        Health::kind().validate(&instance).unwrap();
        assert_eq!(instance.to_typed::<Health>().unwrap(), typed);
    }

    #[test]
    fn validate_detects_shape_mismatch() {
        let other = ComponentKind::new("health").field("hp", 1);
        let instance = other.instantiate_defaults().unwrap();
        assert!(health_kind().validate(&instance).is_err());
    }
}

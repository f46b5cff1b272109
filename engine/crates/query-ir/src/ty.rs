use serde::{Deserialize, Serialize};

/// Structural type tag carried by the tree nodes that need one.
///
/// This is deliberately not a full type system: property accesses are left
/// untyped (entity schemas are the registry's business), but the distinction
/// the compiler actually branches on — context vs. named type vs. sequence —
/// is explicit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    /// The data context a query executes against.
    Context,
    /// A named entity, scalar or argument-object type.
    Named(String),
    /// A deferred sequence of elements.
    Sequence(Box<TypeRef>),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn sequence(element: TypeRef) -> Self {
        TypeRef::Sequence(Box::new(element))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, TypeRef::Sequence(_))
    }

    /// The element type, if this is a sequence.
    pub fn element(&self) -> Option<&TypeRef> {
        match self {
            TypeRef::Sequence(element) => Some(element),
            _ => None,
        }
    }

    /// The type tag to use for a JSON value embedded as a constant.
    pub fn of_value(value: &serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => TypeRef::named("Null"),
            Value::Bool(_) => TypeRef::named("Boolean"),
            Value::Number(number) if number.is_f64() => TypeRef::named("Float"),
            Value::Number(_) => TypeRef::named("Int"),
            Value::String(_) => TypeRef::named("String"),
            Value::Array(_) | Value::Object(_) => TypeRef::named("Json"),
        }
    }
}

use indexmap::IndexMap;

use crate::{FieldDescriptor, Resolution};

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("a field named `{name}` is already registered")]
    DuplicateField { name: String },
    #[error("field `{name}` is tagged `{resolution}` but its compiled query returns `{result}`")]
    ResolutionMismatch {
        name: String,
        resolution: Resolution,
        result: String,
    },
}

/// Names a registered field for follow-up configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldHandle {
    name: String,
}

impl FieldHandle {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The two registration points the field compiler hands its output to.
///
/// Sequence-resolution fields (`First`, `FirstOrDefault`, `ToList`) go through
/// [`add_field`](FieldRegistrar::add_field); scalar-resolution fields through
/// [`add_unmodified_field`](FieldRegistrar::add_unmodified_field).
pub trait FieldRegistrar {
    fn add_field(&mut self, field: FieldDescriptor) -> Result<FieldHandle, RegistryError>;

    fn add_unmodified_field(&mut self, field: FieldDescriptor) -> Result<FieldHandle, RegistryError>;
}

/// The schema registry: an insertion-ordered, name-unique collection of
/// compiled fields. Built once, before any request is served; read-only
/// afterwards.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    fields: IndexMap<String, FieldDescriptor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Checks the descriptor's invariants, then inserts. A failed registration
    /// leaves the registry exactly as it was.
    fn insert(&mut self, field: FieldDescriptor, expect_sequence: bool) -> Result<FieldHandle, RegistryError> {
        if self.fields.contains_key(&field.name) {
            return Err(RegistryError::DuplicateField { name: field.name });
        }

        let sequence_agrees = field.resolution.requires_sequence() == expect_sequence;
        let result_agrees = field.query.result_type().is_sequence() == expect_sequence;
        if !sequence_agrees || !result_agrees {
            return Err(RegistryError::ResolutionMismatch {
                name: field.name.clone(),
                resolution: field.resolution,
                result: field.query.result_type().to_string(),
            });
        }

        let handle = FieldHandle {
            name: field.name.clone(),
        };
        self.fields.insert(field.name.clone(), field);
        Ok(handle)
    }
}

impl FieldRegistrar for Registry {
    fn add_field(&mut self, field: FieldDescriptor) -> Result<FieldHandle, RegistryError> {
        self.insert(field, true)
    }

    fn add_unmodified_field(&mut self, field: FieldDescriptor) -> Result<FieldHandle, RegistryError> {
        self.insert(field, false)
    }
}

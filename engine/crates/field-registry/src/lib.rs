//! Data structures for schema query fields.
//!
//! Actual compilation logic should not be implemented in this crate; it lives
//! in `field-compiler`, which produces the [`FieldDescriptor`]s stored here.
//! The execution engine consumes the registry read-only: it looks up a field,
//! invokes its [`CompiledFieldQuery`] with the request's argument values, has
//! a provider run the resulting tree, then applies the field's [`Resolution`]
//! to the fetched sequence.

mod descriptor;
mod registry;
mod resolution;
mod selection;

pub use descriptor::{CompiledFieldQuery, FieldDescriptor, MutationCallback};
pub use registry::{FieldHandle, FieldRegistrar, Registry, RegistryError};
pub use resolution::Resolution;
pub use selection::SelectionNode;

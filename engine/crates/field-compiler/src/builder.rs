use field_registry::{
    FieldDescriptor, FieldHandle, FieldRegistrar, MutationCallback, RegistryError, Resolution,
};
use query_ir::{CompileError, Parameter, QueryLambda};

use crate::{bind, canonicalize, classify};

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("field `{name}` expects a query with {expected} parameter(s), got {found}")]
    ParameterCount {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("list field `{name}` must declare a sequence-typed result, got `{found}`")]
    NotASequence { name: String, found: String },
    #[error("query declares no context parameter")]
    MissingContextParameter,
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Declares query fields against a registry.
///
/// Each entry point takes the declared query and an optional mutation
/// callback, runs classification, canonicalization and binding, and registers
/// the compiled descriptor. A failure anywhere aborts that field's
/// registration and registers nothing.
pub struct FieldBuilder<'r, R> {
    registry: &'r mut R,
}

impl<'r, R: FieldRegistrar> FieldBuilder<'r, R> {
    pub fn new(registry: &'r mut R) -> Self {
        FieldBuilder { registry }
    }

    /// Declares a single-result field from a `(Context) -> R` query.
    pub fn field(
        &mut self,
        name: &str,
        declared: QueryLambda,
        mutation: Option<MutationCallback>,
    ) -> Result<FieldHandle, BuildError> {
        expect_params(name, &declared, 1)?;
        self.add_single(name, declared, None, mutation)
    }

    /// Declares a single-result field from a `(Context, Args) -> R` query.
    /// The second parameter is the argument object; its declared type is all
    /// the builder needs to know about the arguments.
    pub fn field_with_args(
        &mut self,
        name: &str,
        declared: QueryLambda,
        mutation: Option<MutationCallback>,
    ) -> Result<FieldHandle, BuildError> {
        expect_params(name, &declared, 2)?;
        let args = declared.params[1].clone();
        self.add_single(name, declared, Some(args), mutation)
    }

    /// Declares a list field from a `(Context) -> [R]` query. List fields are
    /// definitionally sequence-returning, so classification is skipped.
    pub fn list_field(
        &mut self,
        name: &str,
        declared: QueryLambda,
        mutation: Option<MutationCallback>,
    ) -> Result<FieldHandle, BuildError> {
        expect_params(name, &declared, 1)?;
        self.add_list(name, declared, None, mutation)
    }

    /// Declares a list field from a `(Context, Args) -> [R]` query.
    pub fn list_field_with_args(
        &mut self,
        name: &str,
        declared: QueryLambda,
        mutation: Option<MutationCallback>,
    ) -> Result<FieldHandle, BuildError> {
        expect_params(name, &declared, 2)?;
        let args = declared.params[1].clone();
        self.add_list(name, declared, Some(args), mutation)
    }

    fn add_single(
        &mut self,
        name: &str,
        declared: QueryLambda,
        args: Option<Parameter>,
        mutation: Option<MutationCallback>,
    ) -> Result<FieldHandle, BuildError> {
        let info = classify(&declared);

        let handle = match &info.base_sequence {
            None => {
                let canonical = canonicalize(&info.original)?;
                let query = bind(&canonical, args.as_ref())?;
                let descriptor =
                    FieldDescriptor::new(name, Resolution::Unmodified, query).with_mutation(mutation);
                self.registry.add_unmodified_field(descriptor)?
            }
            Some(base) => {
                let canonical = canonicalize(base)?;
                let query = bind(&canonical, args.as_ref())?;
                let descriptor =
                    FieldDescriptor::new(name, info.resolution, query).with_mutation(mutation);
                self.registry.add_field(descriptor)?
            }
        };

        tracing::debug!(field = name, resolution = %info.resolution, "registered query field");
        Ok(handle)
    }

    fn add_list(
        &mut self,
        name: &str,
        declared: QueryLambda,
        args: Option<Parameter>,
        mutation: Option<MutationCallback>,
    ) -> Result<FieldHandle, BuildError> {
        if !declared.result.is_sequence() {
            return Err(BuildError::NotASequence {
                name: name.into(),
                found: declared.result.to_string(),
            });
        }

        let canonical = canonicalize(&declared)?;
        let query = bind(&canonical, args.as_ref())?;
        let descriptor = FieldDescriptor::new(name, Resolution::ToList, query).with_mutation(mutation);
        let handle = self.registry.add_field(descriptor)?;

        tracing::debug!(field = name, resolution = %Resolution::ToList, "registered query field");
        Ok(handle)
    }
}

fn expect_params(name: &str, declared: &QueryLambda, expected: usize) -> Result<(), BuildError> {
    if declared.params.len() == expected {
        Ok(())
    } else {
        Err(BuildError::ParameterCount {
            name: name.into(),
            expected,
            found: declared.params.len(),
        })
    }
}

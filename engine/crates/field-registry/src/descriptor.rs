use std::sync::Arc;

use query_ir::{QueryLambda, QueryTemplate, SpecializeError, TypeRef};

use crate::Resolution;

/// Side-effect hook a mutation field runs alongside its query, over the live
/// data context and the request's argument value. Stored opaque; this crate
/// never invokes it.
pub type MutationCallback = Arc<dyn Fn(&mut serde_json::Value, &serde_json::Value) + Send + Sync>;

/// The reusable, argument-parameterized form of a field's query.
///
/// Owns the compiled template; [`invoke`](CompiledFieldQuery::invoke) stamps
/// out a fresh `(ctx, root)` tree per request with the argument value embedded
/// as constants. Immutable after construction and cheap to clone, so it is
/// shared freely across concurrent request handlers.
#[derive(Debug, Clone)]
pub struct CompiledFieldQuery {
    template: Arc<QueryTemplate>,
}

impl CompiledFieldQuery {
    pub fn new(template: QueryTemplate) -> Self {
        CompiledFieldQuery {
            template: Arc::new(template),
        }
    }

    /// Produces the query tree for one request. Argument-less fields ignore
    /// `args` entirely; pass `Value::Null`.
    pub fn invoke(&self, args: &serde_json::Value) -> Result<QueryLambda, SpecializeError> {
        self.template.specialize(args)
    }

    pub fn result_type(&self) -> &TypeRef {
        self.template.result_type()
    }

    pub fn args_type(&self) -> Option<&TypeRef> {
        self.template.args_type()
    }
}

/// A compiled field, the unit handed to the registry.
#[derive(Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub resolution: Resolution,
    pub query: CompiledFieldQuery,
    pub mutation: Option<MutationCallback>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, resolution: Resolution, query: CompiledFieldQuery) -> Self {
        FieldDescriptor {
            name: name.into(),
            resolution,
            query,
            mutation: None,
        }
    }

    pub fn with_mutation(mut self, mutation: Option<MutationCallback>) -> Self {
        self.mutation = mutation;
        self
    }
}

impl std::fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("resolution", &self.resolution)
            .field("query", &self.query)
            .field("mutation", &self.mutation.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

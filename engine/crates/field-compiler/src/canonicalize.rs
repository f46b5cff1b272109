use std::collections::HashMap;

use query_ir::{substitute, Expr, Parameter, QueryLambda, TypeRef};

use crate::BuildError;

/// Normalizes a fetching query to a single, fresh `Context` parameter.
///
/// The declaration's context parameter is rebound by identity; the rest of
/// the tree is carried over structurally unchanged, so a provider sees a tree
/// indistinguishable from one written directly against the context. When the
/// declaration also had an argument parameter, it is dropped from the
/// parameter list and its references stay free in the body, to be resolved by
/// specialization.
///
/// Canonicalization never changes which entities are fetched or which
/// predicates apply; only parameter arity and identity.
pub fn canonicalize(query: &QueryLambda) -> Result<QueryLambda, BuildError> {
    let Some(declared_context) = query.params.first() else {
        return Err(BuildError::MissingContextParameter);
    };

    let context = Parameter::fresh("ctx", TypeRef::Context);
    let mapping = HashMap::from([(declared_context.id, Expr::param(&context))]);

    Ok(QueryLambda::new(
        vec![context],
        substitute(&query.body, &mapping),
        query.result.clone(),
    ))
}

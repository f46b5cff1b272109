use field_registry::Resolution;
use query_ir::{methods, Dispatch, Expr, QueryLambda, SequenceApi, TypeRef};

/// What classification found out about one declared query. Built once per
/// field declaration and consumed immediately by canonicalization/binding.
///
/// `base_sequence` is present exactly when `resolution` is a reduction; it is
/// the pure context-to-sequence query the reduction applies to.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryInfo {
    pub original: QueryLambda,
    pub base_sequence: Option<QueryLambda>,
    pub resolution: Resolution,
}

impl QueryInfo {
    fn unmodified(original: &QueryLambda) -> Self {
        QueryInfo {
            original: original.clone(),
            base_sequence: None,
            resolution: Resolution::Unmodified,
        }
    }
}

/// Classifies a declared single-result query.
///
/// Recognized shape: a static extension-style `first` / `first_or_default`
/// call on the provider-facing queryable surface, optionally with a predicate.
/// Everything else — a non-call body, an instance call, a call on the
/// in-memory enumerable surface, an unrecognized method — passes through as
/// `Unmodified`: the query is treated as an opaque scalar expression and no
/// post-fetch reduction will be applied. Total and pure; never fails.
pub fn classify(declared: &QueryLambda) -> QueryInfo {
    let Expr::Call {
        api,
        method,
        dispatch,
        args,
    } = &declared.body
    else {
        return QueryInfo::unmodified(declared);
    };

    if *api != SequenceApi::Queryable || *dispatch != Dispatch::Static {
        // An enumerable-surface reduction silently loses its resolution
        // semantics here; see DESIGN.md.
        tracing::debug!(method = method.as_str(), "unrecognized call surface, field resolves unmodified");
        return QueryInfo::unmodified(declared);
    }

    let resolution = match method.as_str() {
        methods::FIRST => Resolution::First,
        methods::FIRST_OR_DEFAULT => Resolution::FirstOrDefault,
        _ => return QueryInfo::unmodified(declared),
    };

    let base_body = match args.as_slice() {
        // Reduction over the bare source: the source passes through verbatim.
        [source] => source.clone(),
        // Predicated reduction: fold the predicate into a `where` so the
        // filter stays composable and the reduction happens post-fetch.
        [source, predicate] => source
            .clone()
            .queryable_call(methods::WHERE, vec![predicate.clone()]),
        _ => return QueryInfo::unmodified(declared),
    };

    QueryInfo {
        original: declared.clone(),
        base_sequence: Some(QueryLambda::new(
            declared.params.clone(),
            base_body,
            TypeRef::sequence(declared.result.clone()),
        )),
        resolution,
    }
}

use field_registry::CompiledFieldQuery;
use query_ir::{Parameter, QueryLambda, QueryTemplate, TypeRef};

use crate::BuildError;

/// Binds a canonical single-parameter query into its compiled, reusable form.
///
/// The canonical body is wrapped into a `(ctx, root)` template: `ctx` is the
/// parameter the body already references, `root` is a second context
/// parameter the execution engine may point merged sub-expressions at later.
/// `args`, when present, is declared as the template's free parameter so that
/// specialization can embed each request's value.
///
/// Template compilation — the expensive, validating step — happens here,
/// exactly once per field. A body referencing anything outside the template's
/// scope fails now, at declaration time.
pub fn bind(canonical: &QueryLambda, args: Option<&Parameter>) -> Result<CompiledFieldQuery, BuildError> {
    let Some(context) = canonical.params.first() else {
        return Err(BuildError::MissingContextParameter);
    };

    let root = Parameter::fresh("root", TypeRef::Context);
    let template = QueryTemplate::compile(
        context.clone(),
        root,
        args.cloned(),
        canonical.body.clone(),
        canonical.result.clone(),
    )?;

    Ok(CompiledFieldQuery::new(template))
}

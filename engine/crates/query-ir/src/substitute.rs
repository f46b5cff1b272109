use std::collections::{HashMap, HashSet};

use crate::{Expr, ParamId, QueryLambda};

/// A tree was rejected at compile time.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("query body references parameter `{id}` which is not in scope")]
    UnboundParameter { id: ParamId },
}

/// Replaces parameter references according to `mapping`, by identity.
///
/// Nodes outside the rewritten spine are carried over structurally unchanged,
/// including the parameters of nested lambdas: ids are unique per declaration
/// site, so a same-named parameter of an inner lambda is never touched.
pub fn substitute(expr: &Expr, mapping: &HashMap<ParamId, Expr>) -> Expr {
    match expr {
        Expr::Param(id) => match mapping.get(id) {
            Some(replacement) => replacement.clone(),
            None => expr.clone(),
        },
        Expr::Constant { .. } => expr.clone(),
        Expr::Property { base, name } => Expr::Property {
            base: Box::new(substitute(base, mapping)),
            name: name.clone(),
        },
        Expr::Call {
            api,
            method,
            dispatch,
            args,
        } => Expr::Call {
            api: *api,
            method: method.clone(),
            dispatch: *dispatch,
            args: args.iter().map(|arg| substitute(arg, mapping)).collect(),
        },
        Expr::Lambda(lambda) => Expr::Lambda(Box::new(QueryLambda {
            params: lambda.params.clone(),
            body: substitute(&lambda.body, mapping),
            result: lambda.result.clone(),
        })),
        Expr::Binary { op, lhs, rhs } => Expr::Binary {
            op: *op,
            lhs: Box::new(substitute(lhs, mapping)),
            rhs: Box::new(substitute(rhs, mapping)),
        },
        Expr::Unary { op, expr } => Expr::Unary {
            op: *op,
            expr: Box::new(substitute(expr, mapping)),
        },
    }
}

/// Verifies that every parameter reference in `lambda` resolves to one of the
/// lambda's own parameters, an enclosing nested lambda's parameters, or one of
/// the declared `free` parameters.
///
/// Runs eagerly when a template is compiled so that a malformed tree fails at
/// schema-build time, never during a request.
pub fn validate_scopes(lambda: &QueryLambda, free: &[ParamId]) -> Result<(), CompileError> {
    let mut scope: HashSet<ParamId> = free.iter().copied().collect();
    scope.extend(lambda.params.iter().map(|param| param.id));
    validate_expr(&lambda.body, &mut scope)
}

fn validate_expr(expr: &Expr, scope: &mut HashSet<ParamId>) -> Result<(), CompileError> {
    match expr {
        Expr::Param(id) => {
            if scope.contains(id) {
                Ok(())
            } else {
                Err(CompileError::UnboundParameter { id: *id })
            }
        }
        Expr::Constant { .. } => Ok(()),
        Expr::Property { base, .. } => validate_expr(base, scope),
        Expr::Call { args, .. } => {
            for arg in args {
                validate_expr(arg, scope)?;
            }
            Ok(())
        }
        Expr::Lambda(lambda) => {
            let introduced: Vec<ParamId> = lambda
                .params
                .iter()
                .map(|param| param.id)
                .filter(|id| scope.insert(*id))
                .collect();
            let result = validate_expr(&lambda.body, scope);
            for id in introduced {
                scope.remove(&id);
            }
            result
        }
        Expr::Binary { lhs, rhs, .. } => {
            validate_expr(lhs, scope)?;
            validate_expr(rhs, scope)
        }
        Expr::Unary { expr, .. } => validate_expr(expr, scope),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Parameter, TypeRef};

    #[test]
    fn substitution_goes_by_identity_not_name() {
        let outer = Parameter::fresh("x", TypeRef::Context);
        let inner = Parameter::fresh("x", TypeRef::named("Item"));

        // x -> x.items.where((x) -> x.flag), with the predicate parameter
        // shadowing the outer name.
        let body = Expr::param(&outer).property("items").queryable_call(
            crate::methods::WHERE,
            vec![Expr::lambda(
                vec![inner.clone()],
                Expr::param(&inner).property("flag"),
                TypeRef::named("Boolean"),
            )],
        );

        let fresh = Parameter::fresh("ctx", TypeRef::Context);
        let mapping = HashMap::from([(outer.id, Expr::param(&fresh))]);
        let rewritten = substitute(&body, &mapping);

        let Expr::Call { args, .. } = &rewritten else {
            unreachable!("substitution must preserve the call spine")
        };
        assert_eq!(args[0], Expr::param(&fresh).property("items"));

        // The inner lambda still references its own parameter.
        let Expr::Lambda(lambda) = &args[1] else {
            unreachable!("predicate must survive substitution")
        };
        assert_eq!(lambda.body, Expr::param(&inner).property("flag"));
    }

    #[test]
    fn unbound_reference_is_rejected() {
        let ctx = Parameter::fresh("ctx", TypeRef::Context);
        let stray = Parameter::fresh("stray", TypeRef::named("Args"));
        let lambda = QueryLambda::new(
            vec![ctx],
            Expr::param(&stray).property("id"),
            TypeRef::named("Int"),
        );

        assert_eq!(
            validate_scopes(&lambda, &[]),
            Err(CompileError::UnboundParameter { id: stray.id })
        );
        // Declaring the parameter as free makes the same tree valid.
        assert_eq!(validate_scopes(&lambda, &[stray.id]), Ok(()));
    }

    #[test]
    fn nested_lambda_parameters_do_not_leak_out() {
        let ctx = Parameter::fresh("ctx", TypeRef::Context);
        let item = Parameter::fresh("item", TypeRef::named("Item"));

        // The predicate parameter is referenced outside its lambda.
        let body = Expr::param(&ctx)
            .property("items")
            .queryable_call(
                crate::methods::WHERE,
                vec![Expr::lambda(
                    vec![item.clone()],
                    Expr::param(&item).property("flag"),
                    TypeRef::named("Boolean"),
                )],
            )
            .queryable_call(crate::methods::WHERE, vec![Expr::param(&item)]);

        let lambda = QueryLambda::new(vec![ctx], body, TypeRef::named("Item"));

        assert_eq!(
            validate_scopes(&lambda, &[]),
            Err(CompileError::UnboundParameter { id: item.id })
        );
    }
}

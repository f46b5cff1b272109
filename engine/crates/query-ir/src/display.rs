//! Compact single-line rendering of query trees.
//!
//! This is the stable textual surface snapshot tests assert against, and what
//! shows up in error reports. Parameters print under their declared names;
//! a reference that resolves to no visible declaration falls back to the raw
//! identity (`p3`), which in practice only happens for deliberately malformed
//! trees in tests.

use std::collections::HashMap;
use std::fmt;

use crate::{BinaryOp, Dispatch, Expr, ParamId, QueryLambda, TypeRef, UnaryOp};

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Context => f.write_str("Context"),
            TypeRef::Named(name) => f.write_str(name),
            TypeRef::Sequence(element) => write!(f, "[{element}]"),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        })
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Not => f.write_str("!"),
        }
    }
}

impl fmt::Display for QueryLambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = HashMap::new();
        collect_names(self, &mut names);
        write_lambda(f, self, &names)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = HashMap::new();
        collect_expr_names(self, &mut names);
        write_expr(f, self, &names)
    }
}

fn collect_names(lambda: &QueryLambda, names: &mut HashMap<ParamId, String>) {
    for param in &lambda.params {
        names.insert(param.id, param.name.clone());
    }
    collect_expr_names(&lambda.body, names);
}

fn collect_expr_names(expr: &Expr, names: &mut HashMap<ParamId, String>) {
    match expr {
        Expr::Param(_) | Expr::Constant { .. } => {}
        Expr::Property { base, .. } => collect_expr_names(base, names),
        Expr::Call { args, .. } => {
            for arg in args {
                collect_expr_names(arg, names);
            }
        }
        Expr::Lambda(lambda) => collect_names(lambda, names),
        Expr::Binary { lhs, rhs, .. } => {
            collect_expr_names(lhs, names);
            collect_expr_names(rhs, names);
        }
        Expr::Unary { expr, .. } => collect_expr_names(expr, names),
    }
}

fn write_lambda(
    f: &mut fmt::Formatter<'_>,
    lambda: &QueryLambda,
    names: &HashMap<ParamId, String>,
) -> fmt::Result {
    f.write_str("(")?;
    for (i, param) in lambda.params.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        f.write_str(&param.name)?;
    }
    f.write_str(") -> ")?;
    write_expr(f, &lambda.body, names)
}

fn write_expr(f: &mut fmt::Formatter<'_>, expr: &Expr, names: &HashMap<ParamId, String>) -> fmt::Result {
    match expr {
        Expr::Param(id) => match names.get(id) {
            Some(name) => f.write_str(name),
            None => write!(f, "{id}"),
        },
        Expr::Constant { value, .. } => write!(f, "{value}"),
        Expr::Property { base, name } => {
            write_expr(f, base, names)?;
            write!(f, ".{name}")
        }
        Expr::Call {
            method,
            dispatch,
            args,
            ..
        } => {
            let (receiver, rest) = match (dispatch, args.as_slice()) {
                (Dispatch::Static, [receiver, rest @ ..]) => (Some(receiver), rest),
                _ => (None, args.as_slice()),
            };
            if let Some(receiver) = receiver {
                write_expr(f, receiver, names)?;
                f.write_str(".")?;
            }
            write!(f, "{method}(")?;
            for (i, arg) in rest.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_expr(f, arg, names)?;
            }
            f.write_str(")")
        }
        Expr::Lambda(lambda) => write_lambda(f, lambda, names),
        Expr::Binary { op, lhs, rhs } => {
            write_expr(f, lhs, names)?;
            write!(f, " {op} ")?;
            write_expr(f, rhs, names)
        }
        Expr::Unary { op, expr } => {
            write!(f, "{op}")?;
            write_expr(f, expr, names)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{methods, Expr, Parameter, QueryLambda, TypeRef};

    #[test]
    fn renders_a_filtered_reduction() {
        let ctx = Parameter::fresh("ctx", TypeRef::Context);
        let item = Parameter::fresh("i", TypeRef::named("Item"));

        let query = QueryLambda::new(
            vec![ctx.clone()],
            Expr::param(&ctx).property("items").queryable_call(
                methods::FIRST,
                vec![Expr::lambda(
                    vec![item.clone()],
                    Expr::param(&item).property("id").eq(Expr::constant(5)),
                    TypeRef::named("Boolean"),
                )],
            ),
            TypeRef::named("Item"),
        );

        assert_eq!(query.to_string(), "(ctx) -> ctx.items.first((i) -> i.id == 5)");
    }

    #[test]
    fn sequence_types_render_bracketed() {
        assert_eq!(
            TypeRef::sequence(TypeRef::named("Item")).to_string(),
            "[Item]"
        );
    }
}

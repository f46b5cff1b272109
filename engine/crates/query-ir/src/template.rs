use serde::{Deserialize, Serialize};

use crate::{
    substitute::validate_scopes, CompileError, Expr, Parameter, QueryLambda, TypeRef,
};

/// Specializing a template against an argument value failed.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SpecializeError {
    #[error("argument value has no property `{path}` referenced by the compiled query")]
    MissingArgument { path: String },
}

/// A quoted, reusable query: a two-parameter tree plus its free argument
/// parameter, held as data rather than as anything invocable.
///
/// The two context parameters are `(ctx, root)`. Bodies produced by the field
/// compiler reference only `ctx`; `root` exists so the execution engine can
/// later point merged sub-expressions at the enclosing request's own context
/// without recompiling anything.
///
/// Compiling — [`QueryTemplate::compile`] — validates parameter scoping once,
/// at field-declaration time. [`specialize`](QueryTemplate::specialize) then
/// stamps out an independent [`QueryLambda`] per invocation, with every
/// reference to the argument parameter replaced by an embedded constant. The
/// result is closure-free by construction: serializing it and handing it to a
/// provider in another process loses nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryTemplate {
    context: Parameter,
    root: Parameter,
    args: Option<Parameter>,
    body: Expr,
    result: TypeRef,
}

impl QueryTemplate {
    /// Builds and validates the template. This is the expensive, once-per-field
    /// step; a tree referencing a parameter that is neither `context`, `root`,
    /// the argument parameter nor a nested lambda's own fails here, never at
    /// request time.
    pub fn compile(
        context: Parameter,
        root: Parameter,
        args: Option<Parameter>,
        body: Expr,
        result: TypeRef,
    ) -> Result<Self, CompileError> {
        let template = QueryTemplate {
            context,
            root,
            args,
            body,
            result,
        };

        let free: Vec<_> = template.args.iter().map(|param| param.id).collect();
        validate_scopes(&template.as_lambda(), &free)?;

        Ok(template)
    }

    pub fn result_type(&self) -> &TypeRef {
        &self.result
    }

    pub fn args_type(&self) -> Option<&TypeRef> {
        self.args.as_ref().map(|param| &param.ty)
    }

    /// Produces a fresh two-parameter query with `args_value` baked in.
    ///
    /// References to the argument parameter — both bare references and
    /// property chains rooted at it, like `args.id` — become [`Expr::Constant`]
    /// nodes holding the corresponding piece of `args_value`. Two calls with
    /// different values yield trees sharing no structure.
    pub fn specialize(&self, args_value: &serde_json::Value) -> Result<QueryLambda, SpecializeError> {
        let body = match &self.args {
            Some(args) => embed(&self.body, args, args_value)?,
            None => self.body.clone(),
        };

        Ok(QueryLambda::new(
            vec![self.context.clone(), self.root.clone()],
            body,
            self.result.clone(),
        ))
    }

    fn as_lambda(&self) -> QueryLambda {
        QueryLambda::new(
            vec![self.context.clone(), self.root.clone()],
            self.body.clone(),
            self.result.clone(),
        )
    }
}

/// Rewrites `expr`, replacing references to the argument parameter with
/// constants drawn from `args_value`.
fn embed(expr: &Expr, args: &Parameter, args_value: &serde_json::Value) -> Result<Expr, SpecializeError> {
    // A property chain rooted at the argument parameter collapses into a
    // single constant, so the specialized tree never accesses members of an
    // embedded object at execution time.
    if let Some(path) = argument_path(expr, args.id) {
        let mut value = args_value;
        for segment in &path {
            value = value
                .get(segment)
                .ok_or_else(|| SpecializeError::MissingArgument { path: path.join(".") })?;
        }
        return Ok(Expr::Constant {
            value: value.clone(),
            ty: if path.is_empty() {
                args.ty.clone()
            } else {
                TypeRef::of_value(value)
            },
        });
    }

    Ok(match expr {
        Expr::Param(_) | Expr::Constant { .. } => expr.clone(),
        Expr::Property { base, name } => Expr::Property {
            base: Box::new(embed(base, args, args_value)?),
            name: name.clone(),
        },
        Expr::Call {
            api,
            method,
            dispatch,
            args: call_args,
        } => Expr::Call {
            api: *api,
            method: method.clone(),
            dispatch: *dispatch,
            args: call_args
                .iter()
                .map(|arg| embed(arg, args, args_value))
                .collect::<Result<_, _>>()?,
        },
        Expr::Lambda(lambda) => Expr::Lambda(Box::new(QueryLambda {
            params: lambda.params.clone(),
            body: embed(&lambda.body, args, args_value)?,
            result: lambda.result.clone(),
        })),
        Expr::Binary { op, lhs, rhs } => Expr::Binary {
            op: *op,
            lhs: Box::new(embed(lhs, args, args_value)?),
            rhs: Box::new(embed(rhs, args, args_value)?),
        },
        Expr::Unary { op, expr } => Expr::Unary {
            op: *op,
            expr: Box::new(embed(expr, args, args_value)?),
        },
    })
}

/// If `expr` is the argument parameter or a property chain rooted at it,
/// returns the access path (empty for a bare reference).
fn argument_path(expr: &Expr, args: crate::ParamId) -> Option<Vec<String>> {
    match expr {
        Expr::Param(id) if *id == args => Some(Vec::new()),
        Expr::Property { base, name } => {
            let mut path = argument_path(base, args)?;
            path.push(name.clone());
            Some(path)
        }
        _ => None,
    }
}

//! In-memory reference provider.
//!
//! Evaluates a query tree against a JSON data context: the context is an
//! object, sequences are arrays, entities are objects. Real providers
//! translate trees into native queries instead of interpreting them, but the
//! semantics they must honor — what `where`, `first`, `first_or_default` and
//! `to_list` mean, and that a tree evaluates from its embedded constants
//! alone — are defined by this module and pinned down by its tests.

use std::collections::HashMap;

use serde_json::Value;

use crate::{methods, BinaryOp, Expr, ParamId, QueryLambda, UnaryOp};

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("query expects {expected} value(s) but {found} were supplied")]
    ArityMismatch { expected: usize, found: usize },
    #[error("parameter `{id}` has no bound value")]
    UnboundParameter { id: ParamId },
    #[error("property `{name}` accessed on a non-object value")]
    NotAnObject { name: String },
    #[error("object has no property `{name}`")]
    MissingProperty { name: String },
    #[error("`{method}` applied to a non-sequence value")]
    NotASequence { method: String },
    #[error("`{method}` expects a predicate lambda argument")]
    PredicateExpected { method: String },
    #[error("predicate returned a non-boolean value")]
    NonBooleanPredicate,
    #[error("`first` found no matching element")]
    EmptySequence,
    #[error("operator `{op}` applied to incomparable values")]
    Incomparable { op: String },
    #[error("method `{method}` is not part of the sequence surface")]
    UnsupportedMethod { method: String },
}

/// Evaluates a query lambda with one value bound per parameter.
pub fn eval_query(query: &QueryLambda, values: &[Value]) -> Result<Value, EvalError> {
    if query.params.len() != values.len() {
        return Err(EvalError::ArityMismatch {
            expected: query.params.len(),
            found: values.len(),
        });
    }

    let env: Env = query
        .params
        .iter()
        .zip(values)
        .map(|(param, value)| (param.id, value.clone()))
        .collect();

    eval_expr(&query.body, &env)
}

type Env = HashMap<ParamId, Value>;

fn eval_expr(expr: &Expr, env: &Env) -> Result<Value, EvalError> {
    match expr {
        Expr::Param(id) => env
            .get(id)
            .cloned()
            .ok_or(EvalError::UnboundParameter { id: *id }),
        Expr::Constant { value, .. } => Ok(value.clone()),
        Expr::Property { base, name } => {
            let base = eval_expr(base, env)?;
            match base {
                Value::Object(mut fields) => fields
                    .remove(name)
                    .ok_or_else(|| EvalError::MissingProperty { name: name.clone() }),
                _ => Err(EvalError::NotAnObject { name: name.clone() }),
            }
        }
        Expr::Call { method, args, .. } => eval_call(method, args, env),
        // A lambda in value position has no meaning to the provider.
        Expr::Lambda(_) => Err(EvalError::PredicateExpected {
            method: "<value>".into(),
        }),
        Expr::Binary { op, lhs, rhs } => {
            let lhs = eval_expr(lhs, env)?;
            let rhs = eval_expr(rhs, env)?;
            eval_binary(*op, &lhs, &rhs)
        }
        Expr::Unary { op, expr } => {
            let value = eval_expr(expr, env)?;
            match (op, value) {
                (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
                (UnaryOp::Not, _) => Err(EvalError::NonBooleanPredicate),
            }
        }
    }
}

fn eval_call(method: &str, args: &[Expr], env: &Env) -> Result<Value, EvalError> {
    let Some((receiver, rest)) = args.split_first() else {
        return Err(EvalError::NotASequence { method: method.into() });
    };

    let source = eval_expr(receiver, env)?;
    let Value::Array(elements) = source else {
        return Err(EvalError::NotASequence { method: method.into() });
    };

    match method {
        methods::WHERE => {
            let predicate = predicate_arg(method, rest)?;
            let mut kept = Vec::new();
            for element in elements {
                if matches_predicate(predicate, &element, env)? {
                    kept.push(element);
                }
            }
            Ok(Value::Array(kept))
        }
        methods::FIRST | methods::FIRST_OR_DEFAULT => {
            let predicate = match rest {
                [] => None,
                _ => Some(predicate_arg(method, rest)?),
            };
            for element in elements {
                let keep = match predicate {
                    Some(predicate) => matches_predicate(predicate, &element, env)?,
                    None => true,
                };
                if keep {
                    return Ok(element);
                }
            }
            if method == methods::FIRST {
                Err(EvalError::EmptySequence)
            } else {
                Ok(Value::Null)
            }
        }
        methods::TO_LIST => Ok(Value::Array(elements)),
        _ => Err(EvalError::UnsupportedMethod { method: method.into() }),
    }
}

fn predicate_arg<'a>(method: &str, rest: &'a [Expr]) -> Result<&'a QueryLambda, EvalError> {
    match rest {
        [Expr::Lambda(lambda)] => Ok(lambda),
        _ => Err(EvalError::PredicateExpected { method: method.into() }),
    }
}

/// Applies a single-parameter predicate to an element. The predicate body may
/// also reference enclosing parameters (the context), so the outer environment
/// stays visible.
fn matches_predicate(predicate: &QueryLambda, element: &Value, env: &Env) -> Result<bool, EvalError> {
    let mut scoped = env.clone();
    for param in &predicate.params {
        scoped.insert(param.id, element.clone());
    }
    match eval_expr(&predicate.body, &scoped)? {
        Value::Bool(keep) => Ok(keep),
        _ => Err(EvalError::NonBooleanPredicate),
    }
}

fn eval_binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value, EvalError> {
    use BinaryOp::*;

    let result = match op {
        Eq => Value::Bool(lhs == rhs),
        Ne => Value::Bool(lhs != rhs),
        Lt | Le | Gt | Ge => {
            let ordering = compare(lhs, rhs).ok_or_else(|| EvalError::Incomparable { op: op.to_string() })?;
            Value::Bool(match op {
                Lt => ordering.is_lt(),
                Le => ordering.is_le(),
                Gt => ordering.is_gt(),
                _ => ordering.is_ge(),
            })
        }
        And | Or => match (lhs, rhs) {
            (Value::Bool(lhs), Value::Bool(rhs)) => {
                Value::Bool(if matches!(op, And) { *lhs && *rhs } else { *lhs || *rhs })
            }
            _ => return Err(EvalError::NonBooleanPredicate),
        },
    };

    Ok(result)
}

fn compare(lhs: &Value, rhs: &Value) -> Option<std::cmp::Ordering> {
    match (lhs, rhs) {
        (Value::Number(lhs), Value::Number(rhs)) => lhs.as_f64()?.partial_cmp(&rhs.as_f64()?),
        (Value::String(lhs), Value::String(rhs)) => Some(lhs.cmp(rhs)),
        _ => None,
    }
}

use serde::{Deserialize, Serialize};

use crate::{ParamId, Parameter, TypeRef};

/// The API surface a method call was declared against.
///
/// Only the provider-facing [`Queryable`](SequenceApi::Queryable) surface
/// produces deferred, translatable sequence operations; the in-memory
/// [`Enumerable`](SequenceApi::Enumerable) surface is carried through opaquely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequenceApi {
    Queryable,
    Enumerable,
}

/// Whether a call is an extension-style static call or an instance method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dispatch {
    Static,
    Instance,
}

/// The recognized queryable method names.
pub mod methods {
    pub const FIRST: &str = "first";
    pub const FIRST_OR_DEFAULT: &str = "first_or_default";
    pub const WHERE: &str = "where";
    pub const TO_LIST: &str = "to_list";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Not,
}

/// A node of a declared query tree.
///
/// Trees are owned, immutable once built, and contain no host-language state:
/// every leaf is a parameter reference (by identity) or an embedded constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Reference to an enclosing lambda parameter.
    Param(ParamId),
    /// A value embedded in the tree as data.
    Constant { value: serde_json::Value, ty: TypeRef },
    /// Member access, `base.name`.
    Property { base: Box<Expr>, name: String },
    /// A method invocation. For static extension-style calls the receiver is
    /// the first element of `args`.
    Call {
        api: SequenceApi,
        method: String,
        dispatch: Dispatch,
        args: Vec<Expr>,
    },
    /// A nested lambda used as a call argument (predicates).
    Lambda(Box<QueryLambda>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary { op: UnaryOp, expr: Box<Expr> },
}

impl Expr {
    pub fn param(parameter: &Parameter) -> Self {
        Expr::Param(parameter.id)
    }

    pub fn constant(value: impl Into<serde_json::Value>) -> Self {
        let value = value.into();
        let ty = TypeRef::of_value(&value);
        Expr::Constant { value, ty }
    }

    /// Member access on this expression.
    pub fn property(self, name: impl Into<String>) -> Self {
        Expr::Property {
            base: Box::new(self),
            name: name.into(),
        }
    }

    /// A static extension-style call on the provider-facing queryable surface,
    /// with this expression as the receiver.
    pub fn queryable_call(self, method: impl Into<String>, mut rest: Vec<Expr>) -> Self {
        let mut args = Vec::with_capacity(rest.len() + 1);
        args.push(self);
        args.append(&mut rest);
        Expr::Call {
            api: SequenceApi::Queryable,
            method: method.into(),
            dispatch: Dispatch::Static,
            args,
        }
    }

    /// Like [`queryable_call`](Expr::queryable_call), but on the in-memory
    /// enumerable surface.
    pub fn enumerable_call(self, method: impl Into<String>, mut rest: Vec<Expr>) -> Self {
        let mut args = Vec::with_capacity(rest.len() + 1);
        args.push(self);
        args.append(&mut rest);
        Expr::Call {
            api: SequenceApi::Enumerable,
            method: method.into(),
            dispatch: Dispatch::Static,
            args,
        }
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    // Builder methods, not the std operator traits: they consume and box.
    #[allow(clippy::should_implement_trait)]
    pub fn eq(self, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Eq, self, rhs)
    }

    pub fn and(self, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::And, self, rhs)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Expr::Unary {
            op: UnaryOp::Not,
            expr: Box::new(self),
        }
    }

    pub fn lambda(params: Vec<Parameter>, body: Expr, result: TypeRef) -> Self {
        Expr::Lambda(Box::new(QueryLambda::new(params, body, result)))
    }
}

/// A declared query: a parameter list and a body.
///
/// Both `(Context) -> R` and `(Context, Args) -> R` declarations use this
/// shape; the compiler tells them apart by parameter count. Never mutated
/// after construction — every rewrite produces a new tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryLambda {
    pub params: Vec<Parameter>,
    pub body: Expr,
    pub result: TypeRef,
}

impl QueryLambda {
    pub fn new(params: Vec<Parameter>, body: Expr, result: TypeRef) -> Self {
        QueryLambda { params, body, result }
    }
}

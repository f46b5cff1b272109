//! The typed query-tree representation declared fields are written in.
//!
//! A declared query is an immutable [`QueryLambda`]: a parameter list plus an
//! [`Expr`] body. Trees are plain data — every node serializes with serde, and
//! argument values only ever enter a tree as embedded [`Expr::Constant`]
//! nodes, never as captured closure state. That is what lets a downstream
//! provider translate a tree into a native query without access to the
//! environment that produced it.
//!
//! Actual field compilation (classification, canonicalization, binding) lives
//! in the `field-compiler` crate. This crate only knows how to represent,
//! rewrite, print and evaluate trees:
//!
//! - [`substitute`] replaces parameter references by identity,
//! - [`QueryTemplate`] is the quoted, reusable form of a bound query and
//!   [`QueryTemplate::specialize`] stamps out a fresh tree per argument value,
//! - [`eval`] is the in-memory reference provider the property tests run
//!   queries against.

mod display;
mod expr;
mod param;
mod substitute;
mod template;
mod ty;

pub mod eval;

pub use expr::{methods, BinaryOp, Dispatch, Expr, QueryLambda, SequenceApi, UnaryOp};
pub use param::{ParamId, Parameter};
pub use substitute::{substitute, validate_scopes, CompileError};
pub use template::{QueryTemplate, SpecializeError};
pub use ty::TypeRef;

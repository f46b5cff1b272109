use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

use crate::TypeRef;

static NEXT_PARAM_ID: AtomicU32 = AtomicU32::new(0);

/// Identity of a lambda parameter.
///
/// Substitution and scope checks go through this id, never through the display
/// name, so two parameters that happen to share a name can never capture each
/// other's references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParamId(u32);

impl ParamId {
    pub fn new() -> Self {
        ParamId(NEXT_PARAM_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ParamId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ParamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// A lambda parameter declaration site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub id: ParamId,
    pub name: String,
    pub ty: TypeRef,
}

impl Parameter {
    /// Declares a new parameter with a freshly allocated identity.
    pub fn fresh(name: impl Into<String>, ty: TypeRef) -> Self {
        Parameter {
            id: ParamId::new(),
            name: name.into(),
            ty,
        }
    }
}

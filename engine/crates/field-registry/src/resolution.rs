use serde::{Deserialize, Serialize};

/// The post-fetch reduction the execution engine applies to a field's result.
///
/// Exactly one per field. Every kind except [`Unmodified`](Resolution::Unmodified)
/// expects the compiled query to produce a sequence, which the engine then
/// reduces once the provider has run it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// No reduction; the compiled query's result is the field's value.
    #[default]
    Unmodified,
    /// Take the first element; no element is an execution error.
    First,
    /// Take the first element, or null when there is none.
    FirstOrDefault,
    /// Materialize the whole sequence.
    ToList,
}

impl Resolution {
    /// Whether this kind requires a sequence-typed compiled query.
    pub fn requires_sequence(self) -> bool {
        !matches!(self, Resolution::Unmodified)
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Resolution::Unmodified => "unmodified",
            Resolution::First => "first",
            Resolution::FirstOrDefault => "first_or_default",
            Resolution::ToList => "to_list",
        })
    }
}

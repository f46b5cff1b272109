use serde::{Deserialize, Serialize};

/// One node of an incoming selection request: a field name, an optional
/// alias, and the nested sub-selections.
///
/// This is the whole of the request model the execution engine walks; the
/// walking itself happens outside this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionNode {
    pub name: String,
    pub alias: Option<String>,
    pub children: Vec<SelectionNode>,
}

impl SelectionNode {
    pub fn new(name: impl Into<String>) -> Self {
        SelectionNode {
            name: name.into(),
            alias: None,
            children: Vec::new(),
        }
    }

    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        SelectionNode {
            name: name.into(),
            alias: Some(alias.into()),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<SelectionNode>) -> Self {
        self.children = children;
        self
    }

    /// The key this selection's value appears under in the response.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

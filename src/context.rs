//! # Namespace Context
//!
//! Explicit scope passed into every store call. Fetchers and importers never
//! read the current namespace from ambient state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamespaceContext {
    pub namespace_id: String,
    /// Operator on whose behalf the call runs, for audit logging only
    #[serde(default)]
    pub operator: Option<String>,
}

impl NamespaceContext {
    pub fn new(namespace_id: impl Into<String>) -> Self {
        Self {
            namespace_id: namespace_id.into(),
            operator: None,
        }
    }

    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.operator = Some(operator.into());
        self
    }

    pub fn namespace_id(&self) -> &str {
        &self.namespace_id
    }
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Parameters rendered into an invoice memo.
///
/// The memo is what a payer sees in their wallet, so it carries the service
/// name plus a small set of key=value context fields in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoParams {
    /// The service being purchased.
    pub service: String,
    /// Additional context fields, e.g. `article=42`.
    pub fields: BTreeMap<String, String>,
}

impl MemoParams {
    /// Create memo parameters for a service.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add a context field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Render the memo string: the service name followed by `k=v` pairs in
    /// key order. A memo with no service name renders the fields alone.
    pub fn render(&self) -> String {
        let mut parts = Vec::with_capacity(1 + self.fields.len());
        if !self.service.is_empty() {
            parts.push(self.service.clone());
        }
        for (key, value) in &self.fields {
            parts.push(format!("{}={}", key, value));
        }
        parts.join(" ")
    }
}

impl fmt::Display for MemoParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

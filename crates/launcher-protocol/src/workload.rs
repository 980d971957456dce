//! Opaque payloads passed through to the launcher.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Workload definition forwarded verbatim to the launcher.
///
/// The control plane never inspects the document; it only carries it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkloadDefinition(Value);

impl WorkloadDefinition {
    /// Wraps a JSON document.
    #[must_use]
    pub const fn new(document: Value) -> Self {
        Self(document)
    }

    /// Borrows the wrapped document.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }
}

/// A named secret with base64-encoded entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    /// Entry name to encoded value.
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

/// Secrets keyed by name, as supplied alongside a workload sync.
pub type SecretMap = BTreeMap<String, Secret>;

/// Secret material whose `Debug` output never reveals the value.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SecretValue(String);

impl SecretValue {
    /// Wraps secret material.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Exposes the secret material.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("SecretValue(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn secret_value_debug_is_redacted() {
        let value = SecretValue::new("hunter2");
        let rendered = format!("{value:?}");
        assert!(!rendered.contains("hunter2"), "leaked secret: {rendered}");
        assert_eq!(value.expose(), "hunter2");
    }

    #[test]
    fn workload_definition_serialises_transparently() {
        let document = json!({"metadata": {"namespace": "default", "name": "vm1"}});
        let workload = WorkloadDefinition::new(document.clone());
        let encoded = serde_json::to_value(&workload).expect("serialise workload");
        assert_eq!(encoded, document);
    }
}

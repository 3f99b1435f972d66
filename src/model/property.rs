//! Property instance attached to a vertex or edge.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Value;

/// Metadata carried by a property instance (confidence, source, ...).
pub type Metadata = BTreeMap<String, Value>;

/// Publication state of a property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SandboxStatus {
    Public,
    Private,
    PublicChanged,
}

impl SandboxStatus {
    /// PRIVATE and PUBLIC_CHANGED values are not yet published.
    pub fn is_unpublished(self) -> bool {
        matches!(self, SandboxStatus::Private | SandboxStatus::PublicChanged)
    }
}

/// A typed key/value property on an entity.
///
/// Several instances may share `name`; `key` and the confidence metadata
/// tell them apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub name: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandbox_status: Option<SandboxStatus>,
}

impl Property {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            key: String::new(),
            value: value.into(),
            metadata: Metadata::new(),
            sandbox_status: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_metadata(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(name.into(), value.into());
        self
    }

    pub fn with_sandbox_status(mut self, status: SandboxStatus) -> Self {
        self.sandbox_status = Some(status);
        self
    }

    /// Numeric metadata entry, if present.
    pub fn numeric_metadata(&self, name: &str) -> Option<f64> {
        self.metadata.get(name).and_then(Value::as_float)
    }
}

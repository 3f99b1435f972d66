//! Resolver configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Namespace used to expand bare property names.
pub const DEFAULT_NAMESPACE: &str = "http://ontology.example.org#";

/// Concept used when an entity's concept is missing or unknown.
pub const ROOT_CONCEPT: &str = "http://www.w3.org/2002/07/owl#Thing";

/// Knobs for canonicalization, duplicate ranking and display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverConfig {
    pub namespace: String,
    /// Metadata key holding a property instance's confidence.
    /// `None` means `<namespace>confidence`.
    pub confidence_key: Option<String>,
    pub root_concept: String,
    /// Fixed display timezone. `None` uses the process-local zone.
    pub timezone_offset_minutes: Option<i32>,
    /// Message overrides merged over the built-in table.
    pub messages: BTreeMap<String, String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            confidence_key: None,
            root_concept: ROOT_CONCEPT.to_string(),
            timezone_offset_minutes: None,
            messages: BTreeMap::new(),
        }
    }
}

impl ResolverConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_timezone_offset(mut self, minutes: i32) -> Self {
        self.timezone_offset_minutes = Some(minutes);
        self
    }

    pub fn with_message(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.messages.insert(key.into(), text.into());
        self
    }

    /// `namespace` + `local`.
    pub fn iri(&self, local: &str) -> String {
        format!("{}{}", self.namespace, local)
    }

    /// Namespace up to (not including) the `#` or trailing `/`.
    pub fn namespace_base(&self) -> &str {
        self.namespace
            .strip_suffix('#')
            .or_else(|| self.namespace.strip_suffix('/'))
            .unwrap_or(&self.namespace)
    }

    pub fn confidence_key(&self) -> String {
        self.confidence_key.clone().unwrap_or_else(|| self.iri("confidence"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::default();
        assert_eq!(config.iri("title"), "http://ontology.example.org#title");
        assert_eq!(config.namespace_base(), "http://ontology.example.org");
        assert_eq!(config.confidence_key(), "http://ontology.example.org#confidence");
    }

    #[test]
    fn test_from_json_partial() {
        let config = ResolverConfig::from_json_str(
            r#"{"namespace": "urn:x/", "timezoneOffsetMinutes": 60, "messages": {"boolean.true": "yes"}}"#,
        )
        .unwrap();
        assert_eq!(config.namespace_base(), "urn:x");
        assert_eq!(config.timezone_offset_minutes, Some(60));
        assert_eq!(config.root_concept, ROOT_CONCEPT);
        assert_eq!(config.messages.get("boolean.true").map(String::as_str), Some("yes"));
    }
}

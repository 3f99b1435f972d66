//! Graph entity (vertex or edge) with its denormalized property list.

use serde::{Deserialize, Serialize};

use super::{Property, Value};

/// Whether an entity is a vertex or an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Vertex,
    Edge,
}

/// A vertex or edge as supplied by the caller.
///
/// `properties` keeps insertion order; it only matters as a last-resort
/// tie-break. The resolver never mutates an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    /// Missing when the caller is not authorized to see the element.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<ElementType>,
    #[serde(default)]
    pub properties: Vec<Property>,
    /// Relationship label (edges only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Entity {
    pub fn vertex(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            element_type: Some(ElementType::Vertex),
            properties: Vec::new(),
            label: None,
        }
    }

    pub fn edge(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            element_type: Some(ElementType::Edge),
            properties: Vec::new(),
            label: Some(label.into()),
        }
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Shorthand for a property with an empty key and no metadata.
    pub fn with_value(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_property(Property::new(name, value))
    }

    pub fn is_vertex(&self) -> bool {
        self.element_type == Some(ElementType::Vertex)
    }

    pub fn is_edge(&self) -> bool {
        self.element_type == Some(ElementType::Edge)
    }

    pub fn has_property_named(&self, name: &str) -> bool {
        self.properties.iter().any(|p| p.name == name)
    }
}

//! Ontology definitions: properties, concepts, relationships.
//!
//! These are pure data, deserialized from the schema document with
//! camelCase field names.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Storage type of a property value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataType {
    String,
    Boolean,
    Date,
    Integer,
    Double,
    Currency,
    Number,
    GeoLocation,
    #[serde(rename = "directory/entity")]
    DirectoryEntity,
    #[serde(other)]
    Other,
}

impl DataType {
    /// date/integer/currency/number/double sort and roll up numerically.
    pub fn is_numeric_family(&self) -> bool {
        matches!(
            self,
            DataType::Date | DataType::Integer | DataType::Currency | DataType::Number | DataType::Double
        )
    }
}

/// Presentation hint layered over the data type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DisplayType {
    PhoneNumber,
    Ssn,
    /// Legacy spelling of `bytes`.
    Byte,
    Bytes,
    Heading,
    Duration,
    DateOnly,
    Link,
    Textarea,
    #[serde(other)]
    Other,
}

/// Ontology property definition.
///
/// A non-empty `dependent_property_iris` makes the property compound: its
/// value is composed from those simple properties, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OntologyProperty {
    /// Canonical IRI.
    pub title: String,
    #[serde(default)]
    pub display_name: String,
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_type: Option<DisplayType>,
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub dependent_property_iris: SmallVec<[String; 4]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_formula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_formula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub possible_values: Option<BTreeMap<String, String>>,
    #[serde(default = "default_true")]
    pub user_visible: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub intents: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl OntologyProperty {
    pub fn new(title: impl Into<String>, data_type: DataType) -> Self {
        Self {
            title: title.into(),
            display_name: String::new(),
            data_type,
            display_type: None,
            dependent_property_iris: SmallVec::new(),
            display_formula: None,
            validation_formula: None,
            possible_values: None,
            user_visible: true,
            intents: Vec::new(),
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn with_display_type(mut self, display_type: DisplayType) -> Self {
        self.display_type = Some(display_type);
        self
    }

    pub fn with_dependents(mut self, iris: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.dependent_property_iris = iris.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_display_formula(mut self, formula: impl Into<String>) -> Self {
        self.display_formula = Some(formula.into());
        self
    }

    pub fn with_validation_formula(mut self, formula: impl Into<String>) -> Self {
        self.validation_formula = Some(formula.into());
        self
    }

    pub fn with_possible_values<K, V>(mut self, values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.possible_values = Some(values.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.user_visible = false;
        self
    }

    pub fn is_compound(&self) -> bool {
        !self.dependent_property_iris.is_empty()
    }

    pub fn has_intent(&self, intent: &str) -> bool {
        self.intents.iter().any(|i| i == intent)
    }
}

/// Which element formula to look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormulaKey {
    Title,
    Subtitle,
    Time,
}

/// Concept (vertex type) in the concept tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OntologyConcept {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_concept: Option<String>,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub properties: Vec<String>,
    #[serde(default)]
    pub glyph_icon_href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glyph_icon_selected_href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_formula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle_formula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_formula: Option<String>,
}

impl OntologyConcept {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_concept: None,
            display_name: String::new(),
            properties: Vec::new(),
            glyph_icon_href: String::new(),
            glyph_icon_selected_href: None,
            title_formula: None,
            subtitle_formula: None,
            time_formula: None,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_concept = Some(parent.into());
        self
    }

    pub fn with_properties(mut self, iris: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.properties = iris.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_glyph(mut self, href: impl Into<String>) -> Self {
        self.glyph_icon_href = href.into();
        self
    }

    pub fn with_formula(mut self, key: FormulaKey, formula: impl Into<String>) -> Self {
        let slot = match key {
            FormulaKey::Title => &mut self.title_formula,
            FormulaKey::Subtitle => &mut self.subtitle_formula,
            FormulaKey::Time => &mut self.time_formula,
        };
        *slot = Some(formula.into());
        self
    }

    pub fn formula(&self, key: FormulaKey) -> Option<&str> {
        match key {
            FormulaKey::Title => self.title_formula.as_deref(),
            FormulaKey::Subtitle => self.subtitle_formula.as_deref(),
            FormulaKey::Time => self.time_formula.as_deref(),
        }
    }
}

/// Relationship (edge label) definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OntologyRelationship {
    pub title: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_formula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle_formula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_formula: Option<String>,
}

impl OntologyRelationship {
    pub fn new(title: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            display_name: display_name.into(),
            title_formula: None,
            subtitle_formula: None,
            time_formula: None,
        }
    }

    pub fn with_formula(mut self, key: FormulaKey, formula: impl Into<String>) -> Self {
        let slot = match key {
            FormulaKey::Title => &mut self.title_formula,
            FormulaKey::Subtitle => &mut self.subtitle_formula,
            FormulaKey::Time => &mut self.time_formula,
        };
        *slot = Some(formula.into());
        self
    }

    pub fn formula(&self, key: FormulaKey) -> Option<&str> {
        match key {
            FormulaKey::Title => self.title_formula.as_deref(),
            FormulaKey::Subtitle => self.subtitle_formula.as_deref(),
            FormulaKey::Time => self.time_formula.as_deref(),
        }
    }
}

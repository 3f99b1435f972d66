//! Read-only ontology schema with its lookup indexes.

use hashbrown::{HashMap, HashSet};
use serde::Deserialize;

use super::types::{FormulaKey, OntologyConcept, OntologyProperty, OntologyRelationship};
use crate::Result;

/// Loaded ontology.
///
/// Built once, then shared by reference into every resolver call. Nothing
/// here is mutated after construction, so no locking is needed.
#[derive(Debug, Clone, Default)]
pub struct OntologySchema {
    concepts_by_id: HashMap<String, OntologyConcept>,
    properties_by_title: HashMap<String, OntologyProperty>,
    /// dependent IRI → compound property IRI
    by_dependent_to_compound: HashMap<String, String>,
    relationships_by_title: HashMap<String, OntologyRelationship>,
}

/// On-disk shape of a schema document.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SchemaDocument {
    concepts: Vec<OntologyConcept>,
    properties: Vec<OntologyProperty>,
    relationships: Vec<OntologyRelationship>,
}

impl OntologySchema {
    pub fn new(
        concepts: impl IntoIterator<Item = OntologyConcept>,
        properties: impl IntoIterator<Item = OntologyProperty>,
        relationships: impl IntoIterator<Item = OntologyRelationship>,
    ) -> Self {
        let concepts_by_id: HashMap<_, _> =
            concepts.into_iter().map(|c| (c.id.clone(), c)).collect();
        let properties_by_title: HashMap<_, _> =
            properties.into_iter().map(|p| (p.title.clone(), p)).collect();
        let relationships_by_title: HashMap<_, _> =
            relationships.into_iter().map(|r| (r.title.clone(), r)).collect();

        let mut by_dependent_to_compound = HashMap::new();
        for property in properties_by_title.values() {
            for dependent in &property.dependent_property_iris {
                by_dependent_to_compound.insert(dependent.clone(), property.title.clone());
            }
        }

        Self {
            concepts_by_id,
            properties_by_title,
            by_dependent_to_compound,
            relationships_by_title,
        }
    }

    /// Parse a `{concepts, properties, relationships}` JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let doc: SchemaDocument = serde_json::from_str(json)?;
        Ok(Self::new(doc.concepts, doc.properties, doc.relationships))
    }

    pub fn property(&self, iri: &str) -> Option<&OntologyProperty> {
        self.properties_by_title.get(iri)
    }

    pub fn concept(&self, id: &str) -> Option<&OntologyConcept> {
        self.concepts_by_id.get(id)
    }

    pub fn relationship(&self, title: &str) -> Option<&OntologyRelationship> {
        self.relationships_by_title.get(title)
    }

    /// The compound property a simple property participates in, if any.
    pub fn compound_for_dependent(&self, iri: &str) -> Option<&str> {
        self.by_dependent_to_compound.get(iri).map(String::as_str)
    }

    pub fn properties(&self) -> impl Iterator<Item = &OntologyProperty> {
        self.properties_by_title.values()
    }

    /// Walk from `start` up through its ancestors.
    ///
    /// Stops when a concept has no parent, the parent is unknown, or a
    /// concept repeats (a cyclic schema is reported once and cut).
    pub fn concept_chain<'s>(&'s self, start: &str) -> ConceptChain<'s> {
        ConceptChain {
            schema: self,
            next: self.concept(start),
            visited: HashSet::new(),
        }
    }

    /// First formula of `key` declared on `concept_id` or an ancestor.
    pub fn tree_lookup_formula(&self, concept_id: &str, key: FormulaKey) -> Option<&str> {
        self.concept_chain(concept_id).find_map(|c| c.formula(key))
    }
}

/// Iterator over a concept and its ancestors.
pub struct ConceptChain<'s> {
    schema: &'s OntologySchema,
    next: Option<&'s OntologyConcept>,
    visited: HashSet<&'s str>,
}

impl<'s> Iterator for ConceptChain<'s> {
    type Item = &'s OntologyConcept;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        if !self.visited.insert(current.id.as_str()) {
            tracing::warn!(concept = %current.id, "Cycle in concept parent chain");
            return None;
        }
        self.next = current
            .parent_concept
            .as_deref()
            .and_then(|parent| self.schema.concept(parent));
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::DataType;

    fn tree() -> OntologySchema {
        OntologySchema::new(
            [
                OntologyConcept::new("thing").with_formula(FormulaKey::Title, "'root'"),
                OntologyConcept::new("person").with_parent("thing"),
                OntologyConcept::new("employee")
                    .with_parent("person")
                    .with_formula(FormulaKey::Subtitle, "'emp'"),
            ],
            [OntologyProperty::new("fullName", DataType::String).with_dependents(["first", "last"])],
            [],
        )
    }

    #[test]
    fn test_chain_walks_to_root() {
        let schema = tree();
        let ids: Vec<_> = schema.concept_chain("employee").map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["employee", "person", "thing"]);
    }

    #[test]
    fn test_tree_lookup_formula() {
        let schema = tree();
        assert_eq!(schema.tree_lookup_formula("employee", FormulaKey::Title), Some("'root'"));
        assert_eq!(schema.tree_lookup_formula("employee", FormulaKey::Subtitle), Some("'emp'"));
        assert_eq!(schema.tree_lookup_formula("person", FormulaKey::Time), None);
        assert_eq!(schema.tree_lookup_formula("missing", FormulaKey::Title), None);
    }

    #[test]
    fn test_cycle_is_cut() {
        let schema = OntologySchema::new(
            [
                OntologyConcept::new("a").with_parent("b"),
                OntologyConcept::new("b").with_parent("a"),
            ],
            [],
            [],
        );
        assert_eq!(schema.concept_chain("a").count(), 2);
        assert_eq!(schema.tree_lookup_formula("a", FormulaKey::Title), None);
    }

    #[test]
    fn test_dependent_index() {
        let schema = tree();
        assert_eq!(schema.compound_for_dependent("first"), Some("fullName"));
        assert_eq!(schema.compound_for_dependent("fullName"), None);
    }

    #[test]
    fn test_from_json() {
        let schema = OntologySchema::from_json_str(
            r#"{
                "concepts": [{"id": "thing", "glyphIconHref": "img/thing.png"}],
                "properties": [
                    {"title": "x#age", "displayName": "Age", "dataType": "integer"},
                    {"title": "x#when", "dataType": "date", "displayType": "dateOnly"},
                    {"title": "x#odd", "dataType": "somethingElse", "userVisible": false}
                ],
                "relationships": [{"title": "knows", "displayName": "Knows"}]
            }"#,
        )
        .unwrap();
        assert_eq!(schema.property("x#age").unwrap().data_type, DataType::Integer);
        assert!(schema.property("x#age").unwrap().user_visible);
        assert_eq!(schema.property("x#odd").unwrap().data_type, DataType::Other);
        assert_eq!(schema.concept("thing").unwrap().glyph_icon_href, "img/thing.png");
        assert_eq!(schema.relationship("knows").unwrap().display_name, "Knows");
    }
}

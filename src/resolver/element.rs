//! Element-level views: titles, concepts, artifacts, sandbox status.
//!
//! Everything here is built on the property resolver. Titles, subtitles and
//! times run schema formulas found by walking the concept tree (vertices) or
//! reading the relationship definition (edges).

use serde::{Deserialize, Serialize};

use super::{degrade, RawValue, ResolveOptions, Resolver};
use crate::formula::{Capabilities, Formula, Recording, Scope};
use crate::model::{Entity, Property, Value};
use crate::ontology::{DataType, FormulaKey, OntologyConcept};
use crate::Result;

// ============================================================================
// Formula capabilities
// ============================================================================

/// The capability set a schema formula sees for one entity.
pub struct EntityCapabilities<'a, 'e> {
    resolver: Resolver<'a>,
    entity: &'e Entity,
}

impl<'a, 'e> EntityCapabilities<'a, 'e> {
    pub fn new(resolver: Resolver<'a>, entity: &'e Entity) -> Self {
        Self { resolver, entity }
    }
}

impl Capabilities for EntityCapabilities<'_, '_> {
    fn prop(&mut self, name: &str, key: Option<&str>) -> Result<Option<Value>> {
        self.resolver.resolve(self.entity, name, key, &ResolveOptions::default())
    }

    fn prop_raw(&mut self, name: &str, key: Option<&str>) -> Result<Option<Value>> {
        let raw = self.resolver.resolve_raw(self.entity, name, key, &ResolveOptions::default())?;
        Ok(raw.map(RawValue::into_value))
    }

    fn longest_prop(&mut self, name: Option<&str>) -> Result<Option<Value>> {
        self.resolver.longest_prop(self.entity, name)
    }

    fn is_edge(&self) -> bool {
        self.entity.is_edge()
    }

    fn canonical_name(&self, name: &str) -> String {
        self.resolver.canonicalize(name)
    }
}

/// Coarse presentation class of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityDisplayType {
    Edge,
    Entity,
    Video,
    Audio,
    Image,
    Document,
}

impl<'a> Resolver<'a> {
    // ========================================================================
    // Title / subtitle / time
    // ========================================================================

    /// Computed title.
    ///
    /// Falls back to the `title` property when no formula applies or the
    /// formula yields a falsy value. Elements that are neither vertex nor
    /// edge get the "unauthorized" marker. When `provenance` is given, the
    /// canonical names of properties that contributed to the formula result
    /// are appended to it.
    pub fn title(&self, entity: &Entity, provenance: Option<&mut Vec<String>>) -> Result<Value> {
        if !entity.is_vertex() && !entity.is_edge() {
            let marker = self.format().messages().get("element.unauthorized");
            return Ok(Value::String(marker.to_uppercase()));
        }
        match self.formula_result(entity, FormulaKey::Title, provenance)? {
            Some(title) if title.is_truthy() => Ok(title),
            _ => {
                let options = ResolveOptions::default().ignoring_title_check();
                Ok(self.resolve(entity, "title", None, &options)?.unwrap_or_default())
            }
        }
    }

    pub fn subtitle(&self, entity: &Entity, provenance: Option<&mut Vec<String>>) -> Result<Value> {
        self.formula_or_empty(entity, FormulaKey::Subtitle, provenance)
    }

    pub fn time(&self, entity: &Entity, provenance: Option<&mut Vec<String>>) -> Result<Value> {
        self.formula_or_empty(entity, FormulaKey::Time, provenance)
    }

    fn formula_or_empty(
        &self,
        entity: &Entity,
        key: FormulaKey,
        provenance: Option<&mut Vec<String>>,
    ) -> Result<Value> {
        if !entity.is_vertex() && !entity.is_edge() {
            return Ok(Value::String(String::new()));
        }
        let result = self.formula_result(entity, key, provenance)?;
        Ok(result.unwrap_or_else(|| Value::String(String::new())))
    }

    /// Evaluate the element formula for `key`. `None` when the schema
    /// declares none or it yields null.
    pub fn formula_result(
        &self,
        entity: &Entity,
        key: FormulaKey,
        provenance: Option<&mut Vec<String>>,
    ) -> Result<Option<Value>> {
        let mut scope = Scope::default();
        let formula = if entity.is_edge() {
            let label = entity.label.as_deref().unwrap_or_default();
            let Some(relationship) = self.schema().relationship(label) else {
                tracing::warn!(label, "Relationship is not in ontology");
                return Ok(None);
            };
            scope = scope.with_variable("label", relationship.display_name.as_str());
            relationship.formula(key)
        } else if entity.is_vertex() {
            match self.prop_text(entity, "conceptType")? {
                Some(concept_id) if self.schema().concept(&concept_id).is_none() => {
                    tracing::warn!(concept = %concept_id, "Concept is not in ontology");
                    None
                }
                Some(concept_id) => self.schema().tree_lookup_formula(&concept_id, key),
                None => None,
            }
        } else {
            None
        };
        let Some(text) = formula else {
            return Ok(None);
        };

        let mut caps = EntityCapabilities::new(*self, entity);
        let result = Formula::parse(text).and_then(|formula| match provenance {
            Some(accessed) => formula.evaluate(&mut Recording::new(&mut caps, accessed), &scope),
            None => formula.evaluate(&mut caps, &scope),
        });
        degrade(result, "element", text, None)
    }

    /// Display value of `name` as text, `None` when absent or empty.
    fn prop_text(&self, entity: &Entity, name: &str) -> Result<Option<String>> {
        let value = self.resolve(entity, name, None, &ResolveOptions::default())?;
        Ok(value.map(|v| v.to_text()).filter(|text| !text.is_empty()))
    }

    // ========================================================================
    // Concepts
    // ========================================================================

    /// The entity's concept.
    ///
    /// A missing or `Unknown` concept type is the root concept; the
    /// `relationship` pseudo-concept has none; an unknown id warns and
    /// falls back to the root.
    pub fn concept(&self, entity: &Entity) -> Result<Option<&'a OntologyConcept>> {
        let concept_type = self.prop_text(entity, "conceptType")?;
        let root = self.config().root_concept.as_str();
        let id = match concept_type.as_deref() {
            None | Some("Unknown") => root,
            Some(id) => id,
        };
        if let Some(concept) = self.schema().concept(id) {
            return Ok(Some(concept));
        }
        if id == "relationship" {
            return Ok(None);
        }
        tracing::warn!(concept = id, "Concept is not in ontology");
        Ok(self.schema().concept(root))
    }

    /// Property IRIs declared by the entity's concept and its ancestors.
    pub fn concept_properties(&self, entity: &Entity) -> Result<Vec<String>> {
        let Some(concept) = self.concept(entity)? else {
            return Ok(Vec::new());
        };
        Ok(self
            .schema()
            .concept_chain(&concept.id)
            .flat_map(|c| c.properties.iter().cloned())
            .collect())
    }

    /// Whether the entity's concept chain declares `name`.
    pub fn has_property(&self, entity: &Entity, name: &str) -> Result<bool> {
        let name = self.canonicalize(name);
        let Some(concept) = self.concept(entity)? else {
            return Ok(false);
        };
        Ok(self
            .schema()
            .concept_chain(&concept.id)
            .any(|c| c.properties.iter().any(|p| *p == name)))
    }

    /// Whether the entity's concept is `concept_id` or descends from it.
    pub fn is_kind_of_concept(&self, entity: &Entity, concept_id: &str) -> Result<bool> {
        let Some(concept_type) = self.prop_text(entity, "conceptType")? else {
            return Ok(false);
        };
        Ok(concept_type == concept_id
            || self.schema().concept_chain(&concept_type).any(|c| c.id == concept_id))
    }

    // ========================================================================
    // Aggregates
    // ========================================================================

    /// Longest user-visible display value, optionally only among instances
    /// of `name`. Dependents route through their compound parent when the
    /// entity's concept declares it.
    pub fn longest_prop(&self, entity: &Entity, name: Option<&str>) -> Result<Option<Value>> {
        let name = name.map(|n| self.canonicalize(n));
        let options = ResolveOptions::default();

        let mut shown = Vec::new();
        for property in &entity.properties {
            if name.as_ref().is_some_and(|n| *n != property.name) {
                continue;
            }
            if !self.schema().property(&property.name).is_some_and(|p| p.user_visible) {
                continue;
            }
            let target = match self.schema().compound_for_dependent(&property.name) {
                Some(parent) if self.has_property(entity, parent)? => parent,
                _ => property.name.as_str(),
            };
            if let Some(value) = self.resolve(entity, target, Some(&property.key), &options)? {
                shown.push(value);
            }
        }
        shown.sort_by_key(|v| std::cmp::Reverse(v.to_text().chars().count()));
        Ok(shown.into_iter().next())
    }

    /// Summary of many raw values of `name`.
    ///
    /// Dates give `{span, average}`, numbers `{sum, average}`; anything else
    /// (or an empty input) gives an empty map.
    pub fn rollup(&self, name: &str, values: &[Value]) -> Value {
        let name = self.canonicalize(name);
        let numbers: Vec<f64> = values.iter().filter_map(Value::to_number).collect();
        let Some(property) = self.schema().property(&name) else {
            return Value::Map(Default::default());
        };
        if numbers.is_empty() {
            return Value::Map(Default::default());
        }

        let sum: f64 = numbers.iter().sum();
        let average = sum / numbers.len() as f64;
        let format = self.format();
        match property.data_type {
            DataType::Date => {
                let min = numbers.iter().copied().fold(f64::INFINITY, f64::min);
                let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                Value::map([
                    ("span", format.relative_to_date(min as i64, max as i64)),
                    ("average", format.date_string(&Value::Float(average))),
                ])
            }
            DataType::Double | DataType::Integer | DataType::Currency | DataType::Number => Value::map([
                ("sum", format.number_pretty(&Value::Float(sum))),
                ("average", format.number_pretty(&Value::Float(average))),
            ]),
            _ => Value::Map(Default::default()),
        }
    }

    /// Value of the first property whose name contains `heading` past its
    /// first character, else 0.
    pub fn heading(&self, entity: &Entity) -> Value {
        entity
            .properties
            .iter()
            .find(|p| p.name.find("heading").is_some_and(|at| at > 0))
            .map(|p| p.value.clone())
            .unwrap_or(Value::Int(0))
    }

    // ========================================================================
    // Artifacts
    // ========================================================================

    pub fn is_artifact(&self, entity: &Entity) -> bool {
        entity.has_property_named(&self.canonicalize("raw"))
    }

    pub fn display_type(&self, entity: &Entity) -> EntityDisplayType {
        if !self.is_artifact(entity) {
            return if entity.is_edge() { EntityDisplayType::Edge } else { EntityDisplayType::Entity };
        }

        let has_prefix = |prefix: String| entity.properties.iter().any(|p| p.name.starts_with(&prefix));
        if has_prefix(self.config().iri("video-")) {
            return EntityDisplayType::Video;
        }
        if has_prefix(self.config().iri("audio-")) {
            return EntityDisplayType::Audio;
        }

        let raw = self.canonicalize("raw");
        let mime_key = self.canonicalize("mimeType");
        let is_image = entity
            .properties
            .iter()
            .find(|p| p.name == raw)
            .and_then(|p| p.metadata.get(&mime_key))
            .and_then(Value::as_str)
            .is_some_and(|mime| mime.starts_with("image/"));
        if is_image { EntityDisplayType::Image } else { EntityDisplayType::Document }
    }

    // ========================================================================
    // Sandbox status and metadata
    // ========================================================================

    /// "Unpublished" for private or changed instances, else `None`.
    pub fn sandbox_status(&self, property: &Property) -> Option<String> {
        property
            .sandbox_status
            .filter(|status| status.is_unpublished())
            .map(|_| self.format().messages().get("vertex.status.unpublished"))
    }

    pub fn is_published(&self, property: &Property) -> bool {
        self.sandbox_status(property).is_none()
    }

    /// Status of the named property: unpublished only when every matching
    /// instance is.
    pub fn sandbox_status_of(&self, entity: &Entity, name: &str, key: Option<&str>) -> Result<Option<String>> {
        let matches = self.resolve_all(entity, name, key)?;
        if matches.is_empty() || matches.iter().any(|p| self.is_published(p)) {
            return Ok(None);
        }
        Ok(Some(self.format().messages().get("vertex.status.unpublished")))
    }

    /// Whether the instance carries any of `names` as metadata; the pseudo
    /// name `sandboxStatus` matches an unpublished instance.
    pub fn has_metadata(&self, property: &Property, names: &[&str]) -> bool {
        (self.sandbox_status(property).is_some() && names.contains(&"sandboxStatus"))
            || names.iter().any(|name| property.metadata.contains_key(*name))
    }

    /// Display text for a metadata value of the given kind. `None` for kinds
    /// with no formatter.
    pub fn metadata_display(&self, kind: &str, value: &Value) -> Option<String> {
        let format = self.format();
        match kind {
            "datetime" => Some(format.date_time_string(value)),
            "sandboxStatus" => {
                let unpublished = value.as_str().is_some_and(|status| {
                    status.eq_ignore_ascii_case("private") || status.eq_ignore_ascii_case("public_changed")
                });
                Some(if unpublished {
                    format.messages().get("vertex.status.unpublished")
                } else {
                    String::new()
                })
            }
            "percent" => Some(format.percent(value)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverConfig;
    use crate::format::FormatLibrary;
    use crate::model::SandboxStatus;
    use crate::ontology::{OntologyProperty, OntologyRelationship, OntologySchema};

    const THING: &str = "http://www.w3.org/2002/07/owl#Thing";

    fn iri(local: &str) -> String {
        ResolverConfig::default().iri(local)
    }

    fn schema() -> OntologySchema {
        OntologySchema::new(
            [
                OntologyConcept::new(THING).with_properties([iri("title")]),
                OntologyConcept::new(iri("person"))
                    .with_parent(THING)
                    .with_properties([iri("fullName")])
                    .with_formula(FormulaKey::Title, "prop('fullName')")
                    .with_formula(FormulaKey::Subtitle, "prop('nickname')"),
                OntologyConcept::new(iri("employee")).with_parent(iri("person")),
                OntologyConcept::new(iri("broken"))
                    .with_parent(THING)
                    .with_formula(FormulaKey::Title, "prop('fullName' +"),
            ],
            [
                OntologyProperty::new(iri("conceptType"), DataType::String).hidden(),
                OntologyProperty::new(iri("title"), DataType::String).with_display_name("Title"),
                OntologyProperty::new(iri("first"), DataType::String),
                OntologyProperty::new(iri("last"), DataType::String),
                OntologyProperty::new(iri("fullName"), DataType::String)
                    .with_dependents([iri("first"), iri("last")]),
                OntologyProperty::new(iri("nickname"), DataType::String),
                OntologyProperty::new(iri("born"), DataType::Date),
                OntologyProperty::new(iri("score"), DataType::Double),
                OntologyProperty::new(iri("raw"), DataType::Other),
                OntologyProperty::new(iri("mimeType"), DataType::String),
            ],
            [OntologyRelationship::new("knows", "Knows").with_formula(FormulaKey::Title, "label + ' (' + key + ')'")],
        )
    }

    fn with_resolver(f: impl FnOnce(Resolver<'_>)) {
        let schema = schema();
        let config = ResolverConfig::default().with_timezone_offset(0);
        let format = FormatLibrary::new(&config);
        f(Resolver::new(&schema, &format, &config));
    }

    fn person() -> Entity {
        Entity::vertex("p1")
            .with_value(iri("conceptType"), iri("employee"))
            .with_value(iri("first"), "Jane")
            .with_value(iri("last"), "Doe")
            .with_value(iri("title"), "fallback")
    }

    #[test]
    fn test_title_walks_concept_chain_and_records_provenance() {
        with_resolver(|r| {
            let mut accessed = Vec::new();
            let title = r.title(&person(), Some(&mut accessed)).unwrap();
            assert_eq!(title, Value::from("Jane Doe"));
            assert_eq!(accessed, vec![iri("fullName")]);
        });
    }

    #[test]
    fn test_title_falls_back_to_title_property() {
        with_resolver(|r| {
            let plain = Entity::vertex("v").with_value(iri("title"), "Plain");
            assert_eq!(r.title(&plain, None).unwrap(), Value::from("Plain"));

            let broken = Entity::vertex("b")
                .with_value(iri("conceptType"), iri("broken"))
                .with_value(iri("title"), "Still here");
            assert_eq!(r.title(&broken, None).unwrap(), Value::from("Still here"));
        });
    }

    #[test]
    fn test_title_of_edge_and_unknown_element() {
        with_resolver(|r| {
            let edge = Entity::edge("e1", "knows");
            assert_eq!(r.title(&edge, None).unwrap(), Value::from("Knows ()"));

            let mut opaque = Entity::vertex("x");
            opaque.element_type = None;
            assert_eq!(r.title(&opaque, None).unwrap(), Value::from("UNAUTHORIZED"));
            assert_eq!(r.subtitle(&opaque, None).unwrap(), Value::from(""));
        });
    }

    #[test]
    fn test_unknown_concept_has_no_element_formula() {
        with_resolver(|r| {
            let stray = Entity::vertex("s")
                .with_value(iri("conceptType"), "nowhere")
                .with_value(iri("title"), "fallback");
            let mut accessed = Vec::new();
            assert_eq!(r.formula_result(&stray, FormulaKey::Title, Some(&mut accessed)).unwrap(), None);
            assert!(accessed.is_empty());
            assert_eq!(r.title(&stray, None).unwrap(), Value::from("fallback"));
            assert_eq!(r.subtitle(&stray, None).unwrap(), Value::from(""));
        });
    }

    #[test]
    fn test_subtitle_and_time_default_to_empty() {
        with_resolver(|r| {
            let entity = person().with_value(iri("nickname"), "JD");
            assert_eq!(r.subtitle(&entity, None).unwrap(), Value::from("JD"));
            assert_eq!(r.time(&entity, None).unwrap(), Value::from(""));
        });
    }

    #[test]
    fn test_concepts() {
        with_resolver(|r| {
            assert_eq!(r.concept(&person()).unwrap().map(|c| c.id.clone()), Some(iri("employee")));
            assert_eq!(r.concept(&Entity::vertex("v")).unwrap().map(|c| c.id.as_str()), Some(THING));
            let stray = Entity::vertex("s").with_value(iri("conceptType"), "nowhere");
            assert_eq!(r.concept(&stray).unwrap().map(|c| c.id.as_str()), Some(THING));
            let relationship = Entity::vertex("r").with_value(iri("conceptType"), "relationship");
            assert!(r.concept(&relationship).unwrap().is_none());

            assert_eq!(r.concept_properties(&person()).unwrap(), vec![iri("fullName"), iri("title")]);
            assert!(r.has_property(&person(), "fullName").unwrap());
            assert!(!r.has_property(&person(), "nickname").unwrap());
            assert!(r.is_kind_of_concept(&person(), &iri("person")).unwrap());
            assert!(r.is_kind_of_concept(&person(), THING).unwrap());
            assert!(!r.is_kind_of_concept(&person(), &iri("broken")).unwrap());
        });
    }

    #[test]
    fn test_longest_prop_routes_through_compound() {
        with_resolver(|r| {
            let entity = person().with_value(iri("nickname"), "JD");
            assert_eq!(r.longest_prop(&entity, None).unwrap(), Some(Value::from("Jane Doe")));
            assert_eq!(r.longest_prop(&entity, Some("nickname")).unwrap(), Some(Value::from("JD")));
        });
    }

    #[test]
    fn test_rollup() {
        with_resolver(|r| {
            let scores = [Value::Int(1), Value::Float(2.5), Value::from("x")];
            assert_eq!(
                r.rollup("score", &scores),
                Value::map([("sum", "3.5"), ("average", "1.75")])
            );
            let day = 86_400_000i64;
            let dates = [Value::Int(0), Value::Int(4 * day)];
            assert_eq!(
                r.rollup("born", &dates),
                Value::map([("span", "4 days"), ("average", "1970-01-03")])
            );
            assert_eq!(r.rollup("nickname", &scores), Value::Map(Default::default()));
        });
    }

    #[test]
    fn test_heading_and_display_type() {
        with_resolver(|r| {
            let entity = Entity::vertex("v").with_value(iri("heading"), 90);
            assert_eq!(r.heading(&entity), Value::Int(90));
            assert_eq!(r.heading(&Entity::vertex("v")), Value::Int(0));

            assert_eq!(r.display_type(&Entity::vertex("v")), EntityDisplayType::Entity);
            assert_eq!(r.display_type(&Entity::edge("e", "knows")), EntityDisplayType::Edge);

            let image = Entity::vertex("i")
                .with_property(Property::new(iri("raw"), "bytes").with_metadata(iri("mimeType"), "image/png"));
            assert!(r.is_artifact(&image));
            assert_eq!(r.display_type(&image), EntityDisplayType::Image);
            let video = image.clone().with_value(iri("video-mp4"), "x");
            assert_eq!(r.display_type(&video), EntityDisplayType::Video);
            let document = Entity::vertex("d").with_value(iri("raw"), "bytes");
            assert_eq!(r.display_type(&document), EntityDisplayType::Document);
        });
    }

    #[test]
    fn test_sandbox_status() {
        with_resolver(|r| {
            let private = Property::new(iri("nickname"), "a").with_sandbox_status(SandboxStatus::Private);
            let public = Property::new(iri("nickname"), "b").with_key("k2");
            assert_eq!(r.sandbox_status(&private).as_deref(), Some("Unpublished"));
            assert!(r.is_published(&public));

            let mixed = Entity::vertex("v").with_property(private.clone()).with_property(public);
            assert_eq!(r.sandbox_status_of(&mixed, "nickname", None).unwrap(), None);
            let only_private = Entity::vertex("v").with_property(private.clone());
            assert_eq!(
                r.sandbox_status_of(&only_private, "nickname", None).unwrap().as_deref(),
                Some("Unpublished")
            );

            assert!(r.has_metadata(&private, &["sandboxStatus"]));
            assert!(!r.has_metadata(&private, &["other"]));
        });
    }

    #[test]
    fn test_metadata_display() {
        with_resolver(|r| {
            assert_eq!(r.metadata_display("percent", &Value::Float(0.25)).as_deref(), Some("25%"));
            assert_eq!(
                r.metadata_display("sandboxStatus", &Value::from("public_changed")).as_deref(),
                Some("Unpublished")
            );
            assert_eq!(r.metadata_display("sandboxStatus", &Value::from("PUBLIC")).as_deref(), Some(""));
            assert_eq!(r.metadata_display("nope", &Value::Null), None);
        });
    }
}

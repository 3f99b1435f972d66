//! End-to-end tests for element titles, concept lookups, the async
//! collaborator lookups and name canonicalization.

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use prop_resolver::request::{request_directory_entity_pretty, request_user_display_name};
use prop_resolver::{
    DataRequest, DataType, Entity, EntityDisplayType, FormatLibrary, FormulaKey, OntologyConcept,
    OntologyProperty, OntologyRelationship, OntologySchema, Property, Resolver, ResolverConfig, Result,
    Value,
};

const THING: &str = "http://www.w3.org/2002/07/owl#Thing";

fn iri(local: &str) -> String {
    ResolverConfig::default().iri(local)
}

fn schema() -> OntologySchema {
    OntologySchema::new(
        [
            OntologyConcept::new(THING).with_properties([iri("title"), iri("source")]),
            OntologyConcept::new(iri("person"))
                .with_parent(THING)
                .with_properties([iri("fullName"), iri("born")])
                .with_formula(FormulaKey::Title, "coalesce(prop('nickname'), prop('fullName'))")
                .with_formula(FormulaKey::Subtitle, "prop('source')")
                .with_formula(FormulaKey::Time, "prop('born')"),
            OntologyConcept::new(iri("celebrity")).with_parent(iri("person")),
        ],
        [
            OntologyProperty::new(iri("conceptType"), DataType::String).hidden(),
            OntologyProperty::new(iri("title"), DataType::String),
            OntologyProperty::new(iri("source"), DataType::String),
            OntologyProperty::new(iri("nickname"), DataType::String),
            OntologyProperty::new(iri("first"), DataType::String),
            OntologyProperty::new(iri("last"), DataType::String),
            OntologyProperty::new(iri("fullName"), DataType::String)
                .with_dependents([iri("first"), iri("last")])
                .with_display_formula("dependentProp('first') + ' ' + dependentProp('last')"),
            OntologyProperty::new(iri("born"), DataType::Date),
            OntologyProperty::new(iri("raw"), DataType::Other),
        ],
        [OntologyRelationship::new(iri("worksFor"), "Works For")
            .with_formula(FormulaKey::Title, "label + ': ' + prop('source')")],
    )
}

fn config() -> ResolverConfig {
    ResolverConfig::default().with_timezone_offset(0)
}

// ============================================================================
// 1. Titles with provenance
// ============================================================================

#[test]
fn test_title_provenance_lists_contributing_properties() {
    let (schema, config) = (schema(), config());
    let format = FormatLibrary::new(&config);
    let r = Resolver::new(&schema, &format, &config);

    let celebrity = Entity::vertex("v1")
        .with_value(iri("conceptType"), iri("celebrity"))
        .with_value(iri("nickname"), "Ace");
    let mut accessed = Vec::new();
    let title = r.title(&celebrity, Some(&mut accessed)).unwrap();
    assert_eq!(title, Value::from("Ace"));
    assert_eq!(accessed, vec![iri("nickname")]);

    let named = Entity::vertex("v2")
        .with_value(iri("conceptType"), iri("celebrity"))
        .with_value(iri("first"), "Ada")
        .with_value(iri("last"), "Lovelace");
    let mut accessed = Vec::new();
    assert_eq!(r.title(&named, Some(&mut accessed)).unwrap(), Value::from("Ada Lovelace"));
    assert_eq!(accessed, vec![iri("fullName")]);
}

#[test]
fn test_subtitle_time_and_edge_title() {
    let (schema, config) = (schema(), config());
    let format = FormatLibrary::new(&config);
    let r = Resolver::new(&schema, &format, &config);

    let person = Entity::vertex("v1")
        .with_value(iri("conceptType"), iri("person"))
        .with_value(iri("source"), "census")
        .with_value(iri("born"), 0);
    assert_eq!(r.subtitle(&person, None).unwrap(), Value::from("census"));
    assert_eq!(r.time(&person, None).unwrap(), Value::from("1970-01-01 00:00 UTC"));

    let edge = Entity::edge("e1", iri("worksFor")).with_value(iri("source"), "payroll");
    let mut accessed = Vec::new();
    assert_eq!(r.title(&edge, Some(&mut accessed)).unwrap(), Value::from("Works For: payroll"));
    assert_eq!(accessed, vec![iri("source")]);
}

#[test]
fn test_concept_queries() {
    let (schema, config) = (schema(), config());
    let format = FormatLibrary::new(&config);
    let r = Resolver::new(&schema, &format, &config);

    let celebrity = Entity::vertex("v1").with_value(iri("conceptType"), iri("celebrity"));
    assert!(r.is_kind_of_concept(&celebrity, &iri("person")).unwrap());
    assert!(r.has_property(&celebrity, "source").unwrap());
    assert_eq!(
        r.concept_properties(&celebrity).unwrap(),
        vec![iri("fullName"), iri("born"), iri("title"), iri("source")]
    );

    let artifact = Entity::vertex("a1").with_property(
        Property::new(iri("raw"), "...").with_metadata("mimeType", "application/pdf"),
    );
    assert_eq!(r.display_type(&artifact), EntityDisplayType::Document);
}

// ============================================================================
// 2. Async lookups
// ============================================================================

struct Directory;

#[async_trait]
impl DataRequest for Directory {
    async fn request(&self, domain: &str, method: &str, args: Value) -> Result<Value> {
        match (domain, method) {
            ("directory", "getById") => Ok(Value::map([
                ("displayName", Value::from("Research")),
                ("type", Value::from("group")),
                ("id", args),
            ])),
            ("user", "getUserNames") => Ok(Value::List(vec![Value::from("Grace Hopper")])),
            _ => Err(prop_resolver::Error::Request(format!("unexpected {domain}/{method}"))),
        }
    }
}

#[tokio::test]
async fn test_async_lookups() {
    let format = FormatLibrary::new(&config());
    let group = request_directory_entity_pretty(&Directory, "g1", &format).await.unwrap();
    assert_eq!(group.as_deref(), Some("Research (group)"));

    let user = request_user_display_name(&Directory, "u1", format.messages()).await.unwrap();
    assert_eq!(user, "Grace Hopper");
}

// ============================================================================
// 3. Canonicalization
// ============================================================================

proptest! {
    #[test]
    fn canonicalize_is_idempotent(name in "[a-zA-Z#:/._-]{1,24}") {
        let (schema, config) = (schema(), config());
        let format = FormatLibrary::new(&config);
        let r = Resolver::new(&schema, &format, &config);

        let once = r.canonicalize(&name);
        prop_assert_eq!(r.canonicalize(&once), once);
    }

    #[test]
    fn canonicalize_expands_known_local_names(
        local in prop::sample::select(vec!["title", "source", "nickname", "fullName", "born"])
    ) {
        let (schema, config) = (schema(), config());
        let format = FormatLibrary::new(&config);
        let r = Resolver::new(&schema, &format, &config);

        prop_assert_eq!(r.canonicalize(local), iri(local));
    }
}

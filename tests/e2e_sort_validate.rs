//! End-to-end tests for sorting and validation.

use pretty_assertions::assert_eq;
use prop_resolver::{
    DataType, Entity, Error, FormatLibrary, OntologyProperty, OntologySchema, Resolver, ResolverConfig,
    SortOrder, Value,
};

fn iri(local: &str) -> String {
    ResolverConfig::default().iri(local)
}

fn schema() -> OntologySchema {
    OntologySchema::new(
        [],
        [
            OntologyProperty::new(iri("title"), DataType::String),
            OntologyProperty::new(iri("score"), DataType::Double),
            OntologyProperty::new(iri("first"), DataType::String),
            OntologyProperty::new(iri("last"), DataType::String),
            OntologyProperty::new(iri("fullName"), DataType::String)
                .with_dependents([iri("first"), iri("last")])
                .with_validation_formula("dependentPropRaw('first') IS NOT NULL AND dependentPropRaw('last') IS NOT NULL"),
            OntologyProperty::new(iri("email"), DataType::String)
                .with_validation_formula("propRaw('email') =~ '[^@]+@[^@]+'"),
        ],
        [],
    )
}

fn ids(sorted: &[&Entity]) -> Vec<String> {
    sorted.iter().map(|e| e.id.clone()).collect()
}

// ============================================================================
// 1. Sorting
// ============================================================================

#[test]
fn test_sort_keeps_missing_values_last_in_both_orders() {
    let (schema, config) = (schema(), ResolverConfig::default());
    let format = FormatLibrary::new(&config);
    let r = Resolver::new(&schema, &format, &config);

    let entities = vec![
        Entity::vertex("A"),
        Entity::vertex("B").with_value(iri("score"), 5),
        Entity::vertex("C").with_value(iri("score"), 2),
    ];
    assert_eq!(ids(&r.sort_by_properties(&entities, "score", SortOrder::Asc).unwrap()), ["C", "B", "A"]);
    assert_eq!(ids(&r.sort_by_properties(&entities, "score", SortOrder::Desc).unwrap()), ["B", "C", "A"]);
}

#[test]
fn test_sort_compound_by_display_value() {
    let (schema, config) = (schema(), ResolverConfig::default());
    let format = FormatLibrary::new(&config);
    let r = Resolver::new(&schema, &format, &config);

    let entities = vec![
        Entity::vertex("zed").with_value(iri("first"), "Zed").with_value(iri("last"), "Able"),
        Entity::vertex("amy").with_value(iri("first"), "amy").with_value(iri("last"), "Zulu"),
        Entity::vertex("none").with_value(iri("title"), "Untitled"),
    ];
    let sorted = r.sort_by_properties(&entities, "fullName", SortOrder::Asc).unwrap();
    assert_eq!(ids(&sorted), ["amy", "zed", "none"]);
}

#[test]
fn test_sort_order_parses_from_json() {
    let order: SortOrder = serde_json::from_str("\"DESC\"").unwrap();
    assert_eq!(order, SortOrder::Desc);
    assert_eq!(SortOrder::default(), SortOrder::Asc);
}

// ============================================================================
// 2. Validation
// ============================================================================

#[test]
fn test_single_valid_without_formula_accepts_anything() {
    let (schema, config) = (schema(), ResolverConfig::default());
    let format = FormatLibrary::new(&config);
    let r = Resolver::new(&schema, &format, &config);

    for value in [Value::Null, Value::from(""), Value::Int(-7), Value::List(vec![])] {
        assert!(r.single_valid(&value, "score", None).unwrap());
    }
}

#[test]
fn test_single_valid_with_regex_formula() {
    let (schema, config) = (schema(), ResolverConfig::default());
    let format = FormatLibrary::new(&config);
    let r = Resolver::new(&schema, &format, &config);

    assert!(r.single_valid(&Value::from("jane@example.org"), "email", None).unwrap());
    assert!(!r.single_valid(&Value::from("not an address"), "email", None).unwrap());
}

#[test]
fn test_group_valid() {
    let (schema, config) = (schema(), ResolverConfig::default());
    let format = FormatLibrary::new(&config);
    let r = Resolver::new(&schema, &format, &config);
    let entity = Entity::vertex("v1").with_value(iri("first"), "Old");

    let both = Value::List(vec![Value::from("Jane"), Value::from("Doe")]);
    assert!(r.group_valid(&entity, &both, "fullName", None).unwrap());

    let one = Value::List(vec![Value::from("Jane")]);
    assert!(!r.group_valid(&entity, &one, "fullName", None).unwrap());

    let err = r.group_valid(&entity, &Value::from("Jane Doe"), "fullName", None).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

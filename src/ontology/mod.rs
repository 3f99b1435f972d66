//! # Ontology Schema
//!
//! The concept tree, property definitions and relationship definitions the
//! resolver consults. Loaded once and treated as an immutable value that is
//! passed into every call.

pub mod schema;
pub mod types;

pub use schema::{ConceptChain, OntologySchema};
pub use types::{
    DataType, DisplayType, FormulaKey, OntologyConcept, OntologyProperty, OntologyRelationship,
};

//! # prop-resolver: ontology-driven property resolution
//!
//! Turns the flat, denormalized property list of a graph entity into the
//! value a caller asked for: canonical names, compound (dependent)
//! properties, confidence-ranked duplicates, schema formulas, display
//! formatting, sorting and validation.
//!
//! ## Design Principles
//!
//! 1. **Schema is a value**: `OntologySchema` is built once and passed by reference
//! 2. **Clean DTOs**: `Entity`, `Property`, `Value` cross all boundaries
//! 3. **Formulas own nothing**: formula text → AST is a pure function; property
//!    access goes through the `Capabilities` seam
//! 4. **One argument boundary**: every public entry point validates its inputs
//!    before any resolution runs
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use prop_resolver::{
//!     DataType, Entity, FormatLibrary, OntologyProperty, OntologySchema,
//!     Resolver, ResolverConfig, ResolveOptions,
//! };
//!
//! # fn example() -> prop_resolver::Result<()> {
//! let config = ResolverConfig::default();
//! let schema = OntologySchema::new(
//!     [],
//!     [
//!         OntologyProperty::new(config.iri("firstName"), DataType::String),
//!         OntologyProperty::new(config.iri("lastName"), DataType::String),
//!         OntologyProperty::new(config.iri("fullName"), DataType::String)
//!             .with_dependents([config.iri("firstName"), config.iri("lastName")]),
//!     ],
//!     [],
//! );
//! let format = FormatLibrary::new(&config);
//! let resolver = Resolver::new(&schema, &format, &config);
//!
//! let person = Entity::vertex("v1")
//!     .with_value(config.iri("firstName"), "Jane")
//!     .with_value(config.iri("lastName"), "Doe");
//!
//! let name = resolver.resolve(&person, "fullName", None, &ResolveOptions::default())?;
//! assert_eq!(name.map(|v| v.to_text()).as_deref(), Some("Jane Doe"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Components
//!
//! | Component | Module |
//! |-----------|--------|
//! | PropertyResolver, DisplayFormatter, element titles | [`resolver`] |
//! | FormulaEvaluator | [`formula`] |
//! | Sorter | [`sort`] |
//! | ValidationEngine | [`validate`] |
//! | FormatLibrary | [`format`] |
//! | Async directory / user lookups | [`request`] |

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod format;
pub mod formula;
pub mod model;
pub mod ontology;
pub mod request;
pub mod resolver;
pub mod sort;
pub mod validate;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{ElementType, Entity, Metadata, Property, SandboxStatus, Value};

// ============================================================================
// Re-exports: Ontology
// ============================================================================

pub use ontology::{
    DataType, DisplayType, FormulaKey, OntologyConcept, OntologyProperty,
    OntologyRelationship, OntologySchema,
};

// ============================================================================
// Re-exports: Resolution
// ============================================================================

pub use config::ResolverConfig;
pub use format::FormatLibrary;
pub use formula::{Capabilities, Formula, Recording, Scope};
pub use request::DataRequest;
pub use resolver::{EntityDisplayType, RawValue, ResolveOptions, Resolver};
pub use sort::SortOrder;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed entity, property name or values array. Always a caller bug.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A compound property lists another compound property as a dependent.
    #[error("Compound property {compound} depends on compound property {dependent}")]
    CompoundNesting { compound: String, dependent: String },

    #[error("Formula syntax error at position {position}: {message}")]
    FormulaSyntax { position: usize, message: String },

    #[error("Formula evaluation error: {0}")]
    FormulaEval(String),

    #[error("Data request error: {0}")]
    Request(String),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    /// Errors caused by schema-declared formula text rather than the caller.
    pub fn is_formula_error(&self) -> bool {
        matches!(self, Error::FormulaSyntax { .. } | Error::FormulaEval(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

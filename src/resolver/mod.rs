//! # Property Resolution
//!
//! [`Resolver`] answers "what is the value of property X on this entity":
//!
//! 1. **Canonicalize** the requested name to its IRI form
//! 2. **Match** property instances by name (or by dependent IRIs for a
//!    compound property) and key
//! 3. **Rank** duplicates: confidence first, then display value
//! 4. **Compose** compound properties from their dependents, in declared order
//! 5. **Display** through a schema formula or the [`display`] dispatch
//!
//! Every public entry point runs the same argument check before any of
//! that happens; a malformed entity or name is [`Error::InvalidArgument`].
//!
//! Schema incompleteness never fails a call: unknown properties resolve
//! to their raw value, and broken schema formulas degrade with a warning.

pub mod display;
pub mod element;

pub use element::{EntityCapabilities, EntityDisplayType};

use std::cmp::Ordering;

use crate::config::ResolverConfig;
use crate::format::FormatLibrary;
use crate::formula::{Formula, Scope};
use crate::model::{Entity, Property, SandboxStatus, Value};
use crate::ontology::{OntologyProperty, OntologySchema};
use crate::{Error, Result};

// ============================================================================
// Options and results
// ============================================================================

/// Per-call knobs for [`Resolver::resolve_raw`] and [`Resolver::resolve`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveOptions {
    /// Returned when no instance has a value. Falsy defaults fall back to
    /// the "not available" placeholder.
    pub default_value: Option<Value>,
    /// Skip a scalar property's display formula.
    pub ignore_display_formula: bool,
    /// Allow the bare name `title`; normally callers must use
    /// [`Resolver::title`].
    pub ignore_error_if_title: bool,
    /// Named string transforms applied left to right by the display step
    /// when nothing else formats the value. Disabled entries are skipped.
    pub transforms: Vec<(String, bool)>,
}

impl ResolveOptions {
    pub fn with_default(value: impl Into<Value>) -> Self {
        Self { default_value: Some(value.into()), ..Self::default() }
    }

    pub fn ignoring_display_formula(mut self) -> Self {
        self.ignore_display_formula = true;
        self
    }

    pub fn ignoring_title_check(mut self) -> Self {
        self.ignore_error_if_title = true;
        self
    }

    pub fn with_transform(mut self, name: impl Into<String>, enabled: bool) -> Self {
        self.transforms.push((name.into(), enabled));
        self
    }
}

/// Raw resolution result.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// A simple property's value (or its default / placeholder).
    Single(Value),
    /// One slot per declared dependent, in declared order.
    Compound(Vec<Option<Value>>),
}

impl RawValue {
    /// Flatten into a [`Value`]; compound slots become a list with nulls.
    pub fn into_value(self) -> Value {
        match self {
            RawValue::Single(value) => value,
            RawValue::Compound(values) => {
                Value::List(values.into_iter().map(Option::unwrap_or_default).collect())
            }
        }
    }

    pub fn as_single(&self) -> Option<&Value> {
        match self {
            RawValue::Single(value) => Some(value),
            RawValue::Compound(_) => None,
        }
    }

    pub fn is_compound(&self) -> bool {
        matches!(self, RawValue::Compound(_))
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Resolution engine bound to a schema, a format library and a config.
///
/// Holds only shared references, so it is `Copy` and can be handed to
/// formula capabilities freely.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    schema: &'a OntologySchema,
    format: &'a FormatLibrary,
    config: &'a ResolverConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(
        schema: &'a OntologySchema,
        format: &'a FormatLibrary,
        config: &'a ResolverConfig,
    ) -> Self {
        Self { schema, format, config }
    }

    pub fn schema(&self) -> &'a OntologySchema {
        self.schema
    }

    pub fn format(&self) -> &'a FormatLibrary {
        self.format
    }

    pub fn config(&self) -> &'a ResolverConfig {
        self.config
    }

    /// The argument boundary shared by every entry point.
    ///
    /// `Entity::properties` is a `Vec`, so "properties must be a list" holds
    /// by construction; what remains is a non-empty id and name.
    pub(crate) fn check_arguments(&self, entity: &Entity, name: &str) -> Result<()> {
        if entity.id.is_empty() {
            return Err(Error::InvalidArgument("Entity is invalid: missing id".into()));
        }
        self.check_name(name)
    }

    pub(crate) fn check_name(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidArgument("Property name is invalid: empty".into()));
        }
        Ok(())
    }

    // ========================================================================
    // Names and matching
    // ========================================================================

    /// Canonical IRI for a property name.
    ///
    /// Names under the configured namespace pass through; bare names are
    /// expanded. Whichever form is a known ontology property wins, and an
    /// unknown name comes back unchanged. Idempotent.
    pub fn canonicalize(&self, name: &str) -> String {
        let expanded = if name.starts_with(self.config.namespace_base()) {
            name.to_string()
        } else {
            self.config.iri(name)
        };
        match self.schema.property(name).or_else(|| self.schema.property(&expanded)) {
            Some(property) if property.title == name => name.to_string(),
            Some(_) => expanded,
            None => name.to_string(),
        }
    }

    /// All property instances matching `name` (and `key`, when given), in
    /// entity order. Compound names match their dependents' instances.
    ///
    /// A missing visibility property is synthesized as public with an
    /// empty source.
    pub fn resolve_all(&self, entity: &Entity, name: &str, key: Option<&str>) -> Result<Vec<Property>> {
        self.check_arguments(entity, name)?;
        let name = self.canonicalize(name);

        let compound = self.schema.property(&name).filter(|p| p.is_compound());
        let found: Vec<Property> = entity
            .properties
            .iter()
            .filter(|p| match compound {
                Some(compound) => compound.dependent_property_iris.contains(&p.name),
                None => p.name == name,
            })
            .filter(|p| key.is_none_or(|key| p.key == key))
            .cloned()
            .collect();

        if found.is_empty() && name == self.config.iri("visibilityJson") {
            return Ok(vec![self.default_visibility()]);
        }
        Ok(found)
    }

    fn default_visibility(&self) -> Property {
        Property::new(self.config.iri("visibilityJson"), Value::map([("source", "")]))
            .with_sandbox_status(SandboxStatus::Public)
    }

    /// Instances named by any of `iris`, best first.
    pub(crate) fn ranked_matches<'e>(&self, entity: &'e Entity, iris: &[&str]) -> Vec<&'e Property> {
        let confidence_key = self.config.confidence_key();
        let mut matches: Vec<&Property> = entity
            .properties
            .iter()
            .filter(|p| iris.contains(&p.name.as_str()))
            .collect();
        matches.sort_by(|a, b| self.compare_duplicates(a, b, &confidence_key));
        matches
    }

    /// Confidence-carrying instances first, higher confidence first, then a
    /// case-insensitive compare of display values.
    fn compare_duplicates(&self, a: &Property, b: &Property, confidence_key: &str) -> Ordering {
        match (a.numeric_metadata(confidence_key), b.numeric_metadata(confidence_key)) {
            (Some(ca), Some(cb)) if ca != cb => cb.partial_cmp(&ca).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            _ => {
                let da = self.display(&a.name, &a.value, &[]);
                let db = self.display(&b.name, &b.value, &[]);
                match (da.as_str(), db.as_str()) {
                    (Some(da), Some(db)) => da.to_lowercase().cmp(&db.to_lowercase()),
                    _ => Ordering::Equal,
                }
            }
        }
    }

    // ========================================================================
    // Raw resolution
    // ========================================================================

    /// Raw value of `name`.
    ///
    /// `Ok(None)` means the entity has no such value and no default applies.
    /// The title property never resolves to `None`: it falls back to the
    /// "not available" placeholder.
    pub fn resolve_raw(
        &self,
        entity: &Entity,
        name: &str,
        key: Option<&str>,
        options: &ResolveOptions,
    ) -> Result<Option<RawValue>> {
        self.check_arguments(entity, name)?;
        if !options.ignore_error_if_title && name == "title" {
            return Err(Error::InvalidArgument("Use title function, not generic prop".into()));
        }

        let name = self.canonicalize(name);
        match self.schema.property(&name).filter(|p| p.is_compound()) {
            Some(compound) => self.compound_raw(entity, compound, key, options).map(Some),
            None => Ok(self.simple_raw(entity, &name, key, options).map(RawValue::Single)),
        }
    }

    fn compound_raw(
        &self,
        entity: &Entity,
        compound: &OntologyProperty,
        key: Option<&str>,
        options: &ResolveOptions,
    ) -> Result<RawValue> {
        let dependents = &compound.dependent_property_iris;
        if let Some(nested) = dependents
            .iter()
            .find(|d| self.schema.property(d).is_some_and(OntologyProperty::is_compound))
        {
            return Err(Error::CompoundNesting {
                compound: compound.title.clone(),
                dependent: nested.clone(),
            });
        }

        let key = match key {
            Some(key) => Some(key.to_string()),
            None => {
                let iris: Vec<&str> = dependents.iter().map(String::as_str).collect();
                self.ranked_matches(entity, &iris).first().map(|p| p.key.clone())
            }
        };

        let values = dependents
            .iter()
            .map(|dependent| self.simple_raw(entity, dependent, key.as_deref(), options))
            .collect();
        Ok(RawValue::Compound(values))
    }

    fn simple_raw(
        &self,
        entity: &Entity,
        name: &str,
        key: Option<&str>,
        options: &ResolveOptions,
    ) -> Option<Value> {
        let matches = self.ranked_matches(entity, &[name]);
        let found = match key {
            Some(key) => matches.into_iter().find(|p| p.key == key),
            None => matches.into_iter().next(),
        };

        if let Some(value) = found.map(|p| &p.value).filter(|v| !v.is_null()) {
            return Some(value.clone());
        }
        if name != self.config.iri("title") && options.default_value.is_none() {
            return None;
        }
        match options.default_value.as_ref().filter(|v| v.is_truthy()) {
            Some(default) => Some(default.clone()),
            None => Some(Value::String(self.not_available(name))),
        }
    }

    fn not_available(&self, name: &str) -> String {
        let display_name = self
            .schema
            .property(name)
            .map(|p| p.display_name.to_lowercase())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| name.to_string());
        self.format.messages().format("vertex.property.not_available", &[display_name.as_str()])
    }

    // ========================================================================
    // Display resolution
    // ========================================================================

    /// Display value of `name`.
    ///
    /// Compound properties run their display formula, or join their
    /// dependents' display values with a space. Scalars run their display
    /// formula unless suppressed, else go through the display dispatch.
    /// Names without an ontology property return the raw value.
    pub fn resolve(
        &self,
        entity: &Entity,
        name: &str,
        key: Option<&str>,
        options: &ResolveOptions,
    ) -> Result<Option<Value>> {
        let raw = self.resolve_raw(entity, name, key, options)?;
        let name = self.canonicalize(name);
        let Some(property) = self.schema.property(&name) else {
            return Ok(raw.map(RawValue::into_value));
        };

        if raw.as_ref().is_some_and(RawValue::is_compound) {
            return self.resolve_compound(entity, property, key, options);
        }

        if !options.ignore_display_formula {
            if let Some(formula) = &property.display_formula {
                return self.display_formula(entity, formula, key);
            }
        }
        Ok(raw.map(|raw| self.format_value(property, &raw.into_value(), &options.transforms)))
    }

    fn resolve_compound(
        &self,
        entity: &Entity,
        compound: &OntologyProperty,
        key: Option<&str>,
        options: &ResolveOptions,
    ) -> Result<Option<Value>> {
        let dependents = &compound.dependent_property_iris;
        let key = match key {
            Some(key) => Some(key.to_string()),
            None => entity
                .properties
                .iter()
                .find(|p| dependents.contains(&p.name))
                .map(|p| p.key.clone()),
        };

        if let Some(formula) = &compound.display_formula {
            return self.display_formula(entity, formula, key.as_deref());
        }

        let mut parts = Vec::with_capacity(dependents.len());
        for dependent in dependents {
            let part = self.resolve(entity, dependent, key.as_deref(), options)?;
            parts.push(part.map(|v| v.to_text()).unwrap_or_default());
        }
        Ok(Some(Value::String(parts.join(" "))))
    }

    fn display_formula(&self, entity: &Entity, formula: &str, key: Option<&str>) -> Result<Option<Value>> {
        let mut caps = EntityCapabilities::new(*self, entity);
        let result = Formula::parse(formula).and_then(|f| f.evaluate(&mut caps, &Scope::new(key)));
        degrade(result, "display", formula, Some(Value::String(String::new())))
    }
}

/// Schema formula failures degrade to `fallback`; everything else propagates.
pub(crate) fn degrade<T>(result: Result<T>, kind: &'static str, formula: &str, fallback: T) -> Result<T> {
    match result {
        Err(err) if err.is_formula_error() => {
            tracing::warn!(kind, formula, error = %err, "Schema formula failed");
            Ok(fallback)
        }
        other => other,
    }
}

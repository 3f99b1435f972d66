//! Validating candidate values against schema validation formulas.
//!
//! Validation runs against a candidate entity: a one-property synthetic
//! entity for a single value, or the caller's entity with the property's
//! instances replaced by the candidate values for a group. A property
//! without a validation formula accepts everything.

use crate::formula::{Formula, Scope};
use crate::model::{Entity, Property, Value};
use crate::resolver::{degrade, EntityCapabilities, Resolver};
use crate::{Error, Result};

/// Id of the synthetic entity built by [`Resolver::single_valid`].
const SINGLE_VALUE_ENTITY: &str = "singlePropValid";

impl Resolver<'_> {
    /// Whether `value` is acceptable for property `name` on its own.
    pub fn single_valid(&self, value: &Value, name: &str, key: Option<&str>) -> Result<bool> {
        self.check_name(name)?;
        let name = self.canonicalize(name);
        let Some(formula) = self
            .schema()
            .property(&name)
            .and_then(|p| p.validation_formula.as_deref())
        else {
            return Ok(true);
        };

        let candidate = Entity::vertex(SINGLE_VALUE_ENTITY)
            .with_property(Property::new(name, value.clone()).with_key(key.unwrap_or_default()));
        self.run_validation(&candidate, formula, key)
    }

    /// Whether `values` are acceptable for `name` on `entity`.
    ///
    /// `values` must be a list. For a compound property, `values[i]` is the
    /// candidate for the i-th dependent; a simple property takes `values[0]`.
    /// One-element lists unwrap to their element. An existing instance with
    /// the same name and key is reused with the candidate value, anything
    /// else becomes a new instance. Every candidate instance must pass
    /// [`Resolver::single_valid`] and the property's own formula must hold.
    pub fn group_valid(&self, entity: &Entity, values: &Value, name: &str, key: Option<&str>) -> Result<bool> {
        self.check_arguments(entity, name)?;
        let Some(values) = values.as_list() else {
            return Err(Error::InvalidArgument("Unable to validate without values array".into()));
        };

        let name = self.canonicalize(name);
        let property = self.schema().property(&name);

        let candidate = if values.is_empty() {
            entity.clone()
        } else {
            let iris: Vec<&str> = match property.filter(|p| p.is_compound()) {
                Some(compound) => compound.dependent_property_iris.iter().map(String::as_str).collect(),
                None => vec![name.as_str()],
            };
            let properties = iris
                .into_iter()
                .enumerate()
                .map(|(i, iri)| candidate_property(entity, iri, key, values.get(i)))
                .collect();
            Entity { properties, ..entity.clone() }
        };

        for p in &candidate.properties {
            let key = Some(p.key.as_str()).filter(|k| !k.is_empty());
            if !self.single_valid(&p.value, &p.name, key)? {
                return Ok(false);
            }
        }

        match property.and_then(|p| p.validation_formula.as_deref()) {
            Some(formula) => self.run_validation(&candidate, formula, key),
            None => Ok(true),
        }
    }

    fn run_validation(&self, candidate: &Entity, formula: &str, key: Option<&str>) -> Result<bool> {
        let mut caps = EntityCapabilities::new(*self, candidate);
        let result = Formula::parse(formula)
            .and_then(|f| f.evaluate(&mut caps, &Scope::new(key)))
            .map(|value| value.is_some_and(|v| v.is_truthy()));
        degrade(result, "validation", formula, false)
    }
}

fn candidate_property(entity: &Entity, iri: &str, key: Option<&str>, value: Option<&Value>) -> Property {
    let value = match value {
        Some(Value::List(items)) if items.len() == 1 => items[0].clone(),
        Some(value) => value.clone(),
        None => Value::Null,
    };
    let existing = key.and_then(|key| entity.properties.iter().find(|p| p.name == iri && p.key == key));
    match existing {
        Some(existing) => Property { value, ..existing.clone() },
        None => Property::new(iri, value).with_key(key.unwrap_or_default()),
    }
}

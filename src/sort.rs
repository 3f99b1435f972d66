//! Sorting entities by a named property.
//!
//! Entities split into those with a usable value and those without. The
//! first group sorts by a type-aware key built from the raw value; the
//! second always follows, sorted by title, whatever the order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::model::{Entity, Value};
use crate::ontology::DataType;
use crate::resolver::{RawValue, ResolveOptions, Resolver};
use crate::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Per-entity sort key. Numbers sort before text, text before anything else.
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Number(f64),
    Text(String),
    Other,
}

impl SortKey {
    fn rank(&self) -> u8 {
        match self {
            SortKey::Number(_) => 0,
            SortKey::Text(_) => 1,
            SortKey::Other => 2,
        }
    }

    fn cmp(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Resolver<'_> {
    /// Order `entities` by the value of `name`.
    ///
    /// `Desc` reverses only the entities that have a value; entities without
    /// one stay last, sorted by title.
    pub fn sort_by_properties<'e>(
        &self,
        entities: &'e [Entity],
        name: &str,
        order: SortOrder,
    ) -> Result<Vec<&'e Entity>> {
        let options = ResolveOptions::with_default(" ").ignoring_title_check();

        let mut with_value = Vec::new();
        let mut without_value = Vec::new();
        for entity in entities {
            if self.has_usable_value(entity, name, &options)? {
                with_value.push((self.sort_key(entity, name, &options)?, entity));
            } else {
                without_value.push((self.title(entity, None)?.to_text(), entity));
            }
        }

        with_value.sort_by(|(a, _), (b, _)| a.cmp(b));
        if order == SortOrder::Desc {
            with_value.reverse();
        }
        without_value.sort_by(|(a, _), (b, _)| a.cmp(b));

        Ok(with_value
            .into_iter()
            .map(|(_, entity)| entity)
            .chain(without_value.into_iter().map(|(_, entity)| entity))
            .collect())
    }

    fn has_usable_value(&self, entity: &Entity, name: &str, options: &ResolveOptions) -> Result<bool> {
        if self.resolve_all(entity, name, None)?.is_empty() {
            return Ok(false);
        }
        Ok(match self.resolve(entity, name, None, options)? {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        })
    }

    fn sort_key(&self, entity: &Entity, name: &str, options: &ResolveOptions) -> Result<SortKey> {
        let property = self.schema().property(&self.canonicalize(name));
        let value = match property {
            Some(p) if p.is_compound() => self.resolve(entity, name, None, options)?,
            _ => self.resolve_raw(entity, name, None, options)?.map(RawValue::into_value),
        }
        .unwrap_or_default();
        let value = match value {
            Value::String(s) => Value::String(s.trim().to_string()),
            other => other,
        };

        let key = match property.map(|p| &p.data_type) {
            Some(DataType::String) => SortKey::Text(value.to_text().to_lowercase()),
            Some(DataType::Boolean) => SortKey::Number(if value == Value::Bool(true) { 1.0 } else { -1.0 }),
            Some(data_type) if data_type.is_numeric_family() => {
                value.to_number().map_or(SortKey::Other, SortKey::Number)
            }
            _ => match value {
                Value::Int(_) | Value::Float(_) => value.to_number().map_or(SortKey::Other, SortKey::Number),
                Value::String(s) => SortKey::Text(s),
                _ => SortKey::Other,
            },
        };
        Ok(key)
    }
}

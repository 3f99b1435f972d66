//! Display dispatch: raw value → display value by ontology metadata.
//!
//! Order: possible-values lookup, display type, data type, then the
//! caller's string transforms. The first step that applies wins.

use crate::format::text;
use crate::model::Value;
use crate::ontology::{DataType, DisplayType, OntologyProperty};

use super::Resolver;

impl Resolver<'_> {
    /// Format `value` as a display value for property `name`.
    ///
    /// Names without an ontology property return the value unchanged.
    pub fn display(&self, name: &str, value: &Value, transforms: &[(String, bool)]) -> Value {
        match self.schema().property(&self.canonicalize(name)) {
            Some(property) => self.format_value(property, value, transforms),
            None => value.clone(),
        }
    }

    pub(crate) fn format_value(
        &self,
        property: &OntologyProperty,
        value: &Value,
        transforms: &[(String, bool)],
    ) -> Value {
        if let Some(possible) = &property.possible_values {
            let key = value.to_text();
            match possible.get(&key) {
                Some(label) => return Value::String(label.clone()),
                None => tracing::warn!(
                    property = %property.title,
                    value = %key,
                    "Value not among possible values"
                ),
            }
        }

        let format = self.format();
        if let Some(display_type) = &property.display_type {
            let shown = match display_type {
                DisplayType::PhoneNumber => Some(format.phone_number(value)),
                DisplayType::Ssn => Some(format.ssn(value)),
                DisplayType::Byte | DisplayType::Bytes => Some(format.bytes(value)),
                DisplayType::Heading => {
                    return format.heading(value).map(Value::String).unwrap_or_default();
                }
                DisplayType::Duration => Some(format.duration(value)),
                _ => None,
            };
            if let Some(shown) = shown {
                return Value::String(shown);
            }
        }

        let shown = match property.data_type {
            DataType::Boolean => Some(format.boolean(value)),
            DataType::Date if property.display_type == Some(DisplayType::DateOnly) => {
                Some(format.date_string_utc(value))
            }
            DataType::Date => Some(format.date_time_string(value)),
            ref numeric if numeric.is_numeric_family() => Some(format.number_pretty(value)),
            DataType::GeoLocation => {
                return format.geo_location(value).map(Value::String).unwrap_or_default();
            }
            _ => None,
        };
        if let Some(shown) = shown {
            return Value::String(shown);
        }

        match value {
            Value::String(s) => Value::String(apply_transforms(s, transforms)),
            other => other.clone(),
        }
    }
}

/// Enabled transforms applied left to right; unknown names pass through.
fn apply_transforms(s: &str, transforms: &[(String, bool)]) -> String {
    let mut out = s.to_string();
    for (name, _) in transforms.iter().filter(|(_, enabled)| *enabled) {
        match text::transform(name, &out) {
            Some(transformed) => out = transformed,
            None => tracing::debug!(transform = %name, "Unknown string transform"),
        }
    }
    out
}

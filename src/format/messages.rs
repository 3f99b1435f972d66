//! Message table for user-facing strings.
//!
//! Localization tables are supplied by the host; the built-in table is the
//! English fallback. `{0}`, `{1}`, ... are positional placeholders.

use std::collections::BTreeMap;

use hashbrown::HashMap;

const ENGLISH: &[(&str, &str)] = &[
    ("boolean.true", "true"),
    ("boolean.false", "false"),
    ("bytes.suffix", "B"),
    ("bytes.kilo", "K"),
    ("bytes.mega", "M"),
    ("bytes.giga", "G"),
    ("bytes.tera", "T"),
    ("numbers.thousand_suffix", "K"),
    ("numbers.million_suffix", "M"),
    ("numbers.billion_suffix", "B"),
    ("numbers.trillion_suffix", "T"),
    ("field.heading.north", "North"),
    ("field.heading.northeast", "Northeast"),
    ("field.heading.east", "East"),
    ("field.heading.southeast", "Southeast"),
    ("field.heading.south", "South"),
    ("field.heading.southwest", "Southwest"),
    ("field.heading.west", "West"),
    ("field.heading.northwest", "Northwest"),
    ("field.directory.group", "group"),
    ("field.directory.person", "person"),
    ("time.ago", "ago"),
    ("time.moments", "moments"),
    ("time.minute", "1 minute"),
    ("time.minutes", "minutes"),
    ("time.hour", "1 hour"),
    ("time.hours", "hours"),
    ("time.day", "1 day"),
    ("time.days", "days"),
    ("time.month", "1 month"),
    ("time.months", "months"),
    ("time.year", "1 year"),
    ("time.years", "years"),
    ("vertex.property.not_available", "No {0} available"),
    ("vertex.status.unpublished", "Unpublished"),
    ("element.unauthorized", "unauthorized"),
    ("user.unknown.displayName", "Unknown User"),
];

/// Keyed message lookup with positional substitution.
#[derive(Debug, Clone)]
pub struct Messages {
    table: HashMap<String, String>,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            table: ENGLISH.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }
}

impl Messages {
    /// English table with `overrides` applied on top.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut messages = Self::default();
        for (key, text) in overrides {
            messages.table.insert(key.clone(), text.clone());
        }
        messages
    }

    /// The message for `key`, or the key itself when unknown.
    pub fn get(&self, key: &str) -> String {
        self.table.get(key).cloned().unwrap_or_else(|| key.to_string())
    }

    pub fn format(&self, key: &str, args: &[&str]) -> String {
        let mut text = self.get(key);
        for (i, arg) in args.iter().enumerate() {
            text = text.replace(&format!("{{{i}}}"), arg);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitution() {
        let messages = Messages::default();
        assert_eq!(messages.format("vertex.property.not_available", &["title"]), "No title available");
    }

    #[test]
    fn test_override_and_missing_key() {
        let mut overrides = BTreeMap::new();
        overrides.insert("boolean.true".to_string(), "oui".to_string());
        let messages = Messages::with_overrides(&overrides);
        assert_eq!(messages.get("boolean.true"), "oui");
        assert_eq!(messages.get("boolean.false"), "false");
        assert_eq!(messages.get("no.such.key"), "no.such.key");
    }
}

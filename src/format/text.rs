//! String pretty-printers and named string transforms.

use std::sync::LazyLock;

use hashbrown::HashMap;
use parking_lot::Mutex;
use regex::Regex;

use super::Messages;
use crate::model::Value;

static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{3})?[-. ]?([0-9]{3})?[-. ]?([0-9]{4})$").expect("valid phone pattern")
});

static SSN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{3})?[-. ]?([0-9]{2})?[-. ]?([0-9]{4})$").expect("valid ssn pattern")
});

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w[^-\s]*").expect("valid word pattern"));

fn as_input(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => other.to_text(),
    }
}

fn join_groups(re: &Regex, input: &str) -> Option<String> {
    let caps = re.captures(input)?;
    let groups: Vec<&str> = caps.iter().skip(1).flatten().map(|m| m.as_str()).collect();
    Some(groups.join("-"))
}

/// US phone numbers: `1234567890` / `123.456.7890` → `123-456-7890`.
/// Non-matching input is returned unchanged.
pub fn phone_number(value: &Value) -> String {
    let input = as_input(value);
    join_groups(&PHONE, &input).unwrap_or(input)
}

/// SSN-like input → `123-45-6789`. Non-matching input is returned unchanged.
pub fn ssn(value: &Value) -> String {
    let input = as_input(value);
    join_groups(&SSN, &input).unwrap_or(input)
}

pub fn uppercase(s: &str) -> String {
    s.to_uppercase()
}

pub fn lowercase(s: &str) -> String {
    s.to_lowercase()
}

/// First letter of each word uppercased, the rest lowercased.
pub fn pretty_print(s: &str) -> String {
    WORD.replace_all(s, |caps: &regex::Captures<'_>| {
        let word = &caps[0];
        let mut chars = word.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
            None => String::new(),
        }
    })
    .into_owned()
}

pub fn normalize_accents(s: &str) -> String {
    s.chars()
        .map(|c| match c.to_lowercase().next().unwrap_or(c) {
            'á' | 'à' | 'ã' | 'â' | 'ä' => 'a',
            'é' | 'è' | '¨' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ç' => 'c',
            'ñ' => 'n',
            _ => c,
        })
        .collect()
}

/// "No people", "1 ball", "2 balls".
pub fn plural(count: i64, singular: &str, plural: Option<&str>) -> String {
    let plural = plural.map(str::to_string).unwrap_or_else(|| format!("{singular}s"));
    match count {
        0 => format!("No {plural}"),
        1 => format!("1 {singular}"),
        n => format!("{} {plural}", super::number::pretty_f64(n as f64)),
    }
}

/// Keep the first `words` words, appending an ellipsis when shortened.
pub fn truncate(s: &str, words: usize) -> String {
    let max_chars = 7 * words;
    let trimmed = s.trim();
    let truncated = trimmed.split_whitespace().take(words).collect::<Vec<_>>().join(" ");

    if truncated.chars().count() > max_chars {
        let head: String = trimmed.chars().take(max_chars).collect();
        format!("{head}…")
    } else if truncated != trimmed {
        format!("{truncated}…")
    } else {
        truncated
    }
}

/// Apply a named string transform. `None` when no transform has that name.
pub fn transform(name: &str, s: &str) -> Option<String> {
    let out = match name {
        "uppercase" => uppercase(s),
        "lowercase" => lowercase(s),
        "prettyPrint" | "palantirPrettyPrint" => pretty_print(s),
        "normalizeAccents" => normalize_accents(s),
        _ => return None,
    };
    Some(out)
}

/// `"Jane Doe (person)"` for a directory entity map, "" otherwise.
pub fn directory_entity(entity: &Value, messages: &Messages) -> String {
    let Some(kind) = entity.get("type").and_then(Value::as_str) else {
        return String::new();
    };
    let pretty_type = if kind == "group" {
        messages.get("field.directory.group")
    } else {
        messages.get("field.directory.person")
    };
    let name = entity.get("displayName").map(Value::to_text).unwrap_or_default();
    format!("{name} ({pretty_type})")
}

// ============================================================================
// Class-name interning
// ============================================================================

#[derive(Default)]
struct ClassNames {
    next: u64,
    to_class: HashMap<String, String>,
    from_class: HashMap<String, String>,
}

static CLASS_NAMES: LazyLock<Mutex<ClassNames>> = LazyLock::new(Default::default);

/// Stable `idN` class name for an arbitrary string. Append-only, process-wide.
pub fn class_name_to(s: &str) -> String {
    let mut names = CLASS_NAMES.lock();
    if let Some(existing) = names.to_class.get(s) {
        return existing.clone();
    }
    let class = format!("id{}", names.next);
    names.next += 1;
    names.to_class.insert(s.to_string(), class.clone());
    names.from_class.insert(class.clone(), s.to_string());
    class
}

/// Original string for a class name produced by [`class_name_to`].
pub fn class_name_from(class: &str) -> Option<String> {
    let found = CLASS_NAMES.lock().from_class.get(class).cloned();
    if found.is_none() {
        tracing::warn!(class, "Never created a class name for");
    }
    found
}

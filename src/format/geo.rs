//! Geolocation pretty-printer.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::Value;

static POINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*point(?:\[|\()(.*?),(.*?)(?:\]|\))\s*$").expect("valid point pattern")
});

/// Parse `point[lat,lon]` / `point(lat,lon)` into a `{latitude, longitude}` map.
pub fn parse(text: &str) -> Option<Value> {
    let caps = POINT.captures(text)?;
    Some(Value::map([
        ("latitude", caps[1].trim()),
        ("longitude", caps[2].trim()),
    ]))
}

/// `lat, lon` to three decimals, prefixed by the description unless withheld.
///
/// Unparseable strings are returned as-is; other shapes yield `None`.
pub fn pretty(geo: &Value, withhold_description: bool) -> Option<String> {
    if let Value::String(text) = geo {
        return match parse(text) {
            Some(parsed) => pretty(&parsed, false),
            None => Some(text.clone()),
        };
    }

    let latitude = geo.get("latitude")?.to_number().unwrap_or(f64::NAN);
    let longitude = geo.get("longitude")?.to_number().unwrap_or(f64::NAN);
    let lat_lon = format!("{latitude:.3}, {longitude:.3}");

    match geo.get("description").and_then(Value::as_str) {
        Some(description) if !withhold_description && !description.is_empty() => {
            Some(format!("{description} {lat_lon}"))
        }
        _ => Some(lat_lon),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_map() {
        let geo = Value::map([
            ("latitude", Value::Float(38.8977)),
            ("longitude", Value::Float(-77.0366)),
            ("description", Value::from("White House")),
        ]);
        assert_eq!(pretty(&geo, false).as_deref(), Some("White House 38.898, -77.037"));
        assert_eq!(pretty(&geo, true).as_deref(), Some("38.898, -77.037"));
    }

    #[test]
    fn test_pretty_point_string() {
        assert_eq!(pretty(&Value::from("POINT(1.5, 2)"), false).as_deref(), Some("1.500, 2.000"));
        assert_eq!(pretty(&Value::from("somewhere"), false).as_deref(), Some("somewhere"));
        assert_eq!(pretty(&Value::Int(3), false), None);
    }
}

//! Numeric pretty-printers: numbers, headings, durations, bytes, booleans.

use super::Messages;
use crate::model::Value;

const BITS_FOR_INDEX: u32 = 12;
const BITS_FOR_OFFSET: u32 = 32 - BITS_FOR_INDEX;

const HEADINGS: [&str; 8] = [
    "north", "northeast", "east", "southeast", "south", "southwest", "west", "northwest",
];

/// At most two decimals, trailing zeros dropped, thousands separated.
/// Strings are parsed as floats; anything non-numeric yields "".
pub fn pretty(value: &Value) -> String {
    match value.to_number() {
        Some(n) if value.is_numeric() || value.is_string() => pretty_f64(n),
        _ => String::new(),
    }
}

pub fn pretty_f64(n: f64) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    let fixed = format!("{:.2}", n.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((&fixed, ""));
    let frac = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = n < 0.0 && (int_part != "0" || !frac.is_empty());
    let sign = if negative { "-" } else { "" };
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}

/// Approximate magnitude: 1500 → "1.5K", 2000000 → "2M".
pub fn pretty_approximate(n: f64, messages: &Messages) -> String {
    let abs = n.abs();
    let scaled = |divisor: f64, suffix: &str| {
        let rounded = (abs / divisor * 10.0).round() / 10.0;
        format!("{}{}", rounded, messages.get(suffix))
    };
    let result = if abs >= 1e12 {
        scaled(1e12, "numbers.trillion_suffix")
    } else if abs >= 1e9 {
        scaled(1e9, "numbers.billion_suffix")
    } else if abs >= 1e6 {
        scaled(1e6, "numbers.million_suffix")
    } else if abs >= 1e3 {
        scaled(1e3, "numbers.thousand_suffix")
    } else {
        pretty_f64(abs)
    };
    if n < 0.0 { format!("-{result}") } else { result }
}

/// Fraction (0-1) to a rounded percentage.
pub fn percent(value: &Value) -> String {
    match value.to_number() {
        Some(n) => format!("{}%", (n * 100.0).round() as i64),
        None => "NaN%".to_string(),
    }
}

/// Degrees to a compass heading: 5.2 → "North 5.2°".
pub fn heading(value: &Value, messages: &Messages) -> Option<String> {
    let degrees = value.to_number()?;
    let in_range = degrees % 360.0;
    let index = ((in_range / 45.0).round() as i64).rem_euclid(8) as usize;
    Some(format!(
        "{} {}°",
        messages.get(&format!("field.heading.{}", HEADINGS[index])),
        pretty_f64(in_range)
    ))
}

/// Seconds to a readable duration: 64 → "1m 4s".
pub fn duration(value: &Value) -> String {
    let seconds = match value {
        Value::Int(_) | Value::Float(_) => value.as_float().unwrap_or_default(),
        Value::String(s) if s.trim().is_empty() => return String::new(),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(n) => n,
            Err(_) => return s.clone(),
        },
        _ => return String::new(),
    };
    if seconds == 0.0 {
        return "0s".to_string();
    }

    let mut remaining = seconds.floor().abs() as u64;
    let mut parts = Vec::new();
    for (unit, size) in [("w", 604_800u64), ("d", 86_400), ("h", 3_600), ("m", 60), ("s", 1)] {
        let count = remaining / size;
        if count > 0 {
            parts.push(format!("{count}{unit}"));
            remaining %= size;
        }
    }
    let text = parts.join(" ");
    if seconds < 0.0 { format!("-{text}") } else { text }
}

/// Split a 32-bit value into its 12-bit index and 20-bit offset.
pub fn offset_values(value: u32) -> (u32, u32) {
    let offset_mask = (1u32 << BITS_FOR_OFFSET) - 1;
    (value >> BITS_FOR_OFFSET, value & offset_mask)
}

pub fn compact_offset_values(index: u32, offset: u32) -> u32 {
    (index << BITS_FOR_OFFSET) | offset
}

/// Human-readable byte count, terabytes being the largest unit.
pub fn bytes(value: &Value, precision: usize, messages: &Messages) -> String {
    const K: f64 = 1024.0;
    const M: f64 = K * 1024.0;
    const G: f64 = M * 1024.0;
    const T: f64 = G * 1024.0;

    let Some(n) = value.to_number() else {
        return format!("{} {}", value.to_text(), messages.get("bytes.suffix"));
    };
    let (divisor, unit) = if (0.0..K).contains(&n) || n < 0.0 {
        return format!("{} {}", value.to_text(), messages.get("bytes.suffix"));
    } else if n < M {
        (K, "bytes.kilo")
    } else if n < G {
        (M, "bytes.mega")
    } else if n < T {
        (G, "bytes.giga")
    } else {
        (T, "bytes.tera")
    };
    format!("{:.*} {}", precision, n / divisor, messages.get(unit))
}

/// Booleans and `T`/`F`/`"true"`/`"false"` strings to the localized word.
pub fn boolean(value: &Value, messages: &Messages) -> String {
    let truthy = match value {
        Value::Null => return String::new(),
        Value::String(s) if s.is_empty() => return String::new(),
        Value::String(s) if s == "T" => true,
        Value::String(s) if s == "F" || s == "false" => false,
        other => other.is_truthy(),
    };
    messages.get(if truthy { "boolean.true" } else { "boolean.false" })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty() {
        assert_eq!(pretty(&Value::Int(1234567)), "1,234,567");
        assert_eq!(pretty(&Value::Float(1234.5678)), "1,234.57");
        assert_eq!(pretty(&Value::Float(-1000.5)), "-1,000.5");
        assert_eq!(pretty(&Value::from("12.10")), "12.1");
        assert_eq!(pretty(&Value::from("abc")), "");
        assert_eq!(pretty(&Value::Null), "");
    }

    #[test]
    fn test_pretty_approximate() {
        let m = Messages::default();
        assert_eq!(pretty_approximate(1500.0, &m), "1.5K");
        assert_eq!(pretty_approximate(-2_000_000.0, &m), "-2M");
        assert_eq!(pretty_approximate(999.0, &m), "999");
    }

    #[test]
    fn test_heading() {
        let m = Messages::default();
        assert_eq!(heading(&Value::Float(5.2), &m).as_deref(), Some("North 5.2°"));
        assert_eq!(heading(&Value::Int(90), &m).as_deref(), Some("East 90°"));
        assert_eq!(heading(&Value::Int(350), &m).as_deref(), Some("North 350°"));
        assert_eq!(heading(&Value::Null, &m), None);
    }

    #[test]
    fn test_duration() {
        assert_eq!(duration(&Value::Int(64)), "1m 4s");
        assert_eq!(duration(&Value::Int(0)), "0s");
        assert_eq!(duration(&Value::Float(3661.9)), "1h 1m 1s");
        assert_eq!(duration(&Value::from("  ")), "");
    }

    #[test]
    fn test_bytes() {
        let m = Messages::default();
        assert_eq!(bytes(&Value::Int(512), 1, &m), "512 B");
        assert_eq!(bytes(&Value::Int(1024), 1, &m), "1.0 K");
        assert_eq!(bytes(&Value::Int(1536 * 1024), 1, &m), "1.5 M");
    }

    #[test]
    fn test_boolean() {
        let m = Messages::default();
        assert_eq!(boolean(&Value::Bool(true), &m), "true");
        assert_eq!(boolean(&Value::from("F"), &m), "false");
        assert_eq!(boolean(&Value::from("false"), &m), "false");
        assert_eq!(boolean(&Value::from(""), &m), "");
    }

    #[test]
    fn test_offset_values() {
        let packed = compact_offset_values(3, 17);
        assert_eq!(offset_values(packed), (3, 17));
    }
}

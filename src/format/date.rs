//! Date and timezone pretty-printers.
//!
//! Raw date values are epoch milliseconds (numbers or numeric strings),
//! RFC 3339 strings, or `YYYY-MM-DD HH:mm <zone>` strings.

use std::sync::OnceLock;

use chrono::{
    DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc,
};

use super::Messages;
use crate::model::Value;

/// Offset of a timezone, with its `+HH:MM` rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimezoneInfo {
    pub offset_minutes: i32,
    pub offset_display: String,
}

impl TimezoneInfo {
    pub fn from_offset_minutes(offset_minutes: i32) -> Self {
        Self { offset_minutes, offset_display: offset_display(offset_minutes) }
    }

    pub fn fixed_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.offset_minutes * 60).unwrap_or(Utc.fix())
    }

    /// Label appended to date-time strings.
    pub fn label(&self) -> String {
        if self.offset_minutes == 0 {
            "UTC".to_string()
        } else {
            self.offset_display.clone()
        }
    }
}

/// Process-local timezone, computed once.
pub fn current_timezone() -> &'static TimezoneInfo {
    static CURRENT: OnceLock<TimezoneInfo> = OnceLock::new();
    CURRENT.get_or_init(|| {
        let seconds = Local::now().offset().local_minus_utc();
        TimezoneInfo::from_offset_minutes(seconds / 60)
    })
}

/// `+HH:MM` / `-HH:MM` for an offset in minutes.
pub fn offset_display(offset_minutes: i32) -> String {
    let sign = if offset_minutes < 0 { '-' } else { '+' };
    let abs = offset_minutes.unsigned_abs();
    format!("{sign}{:02}:{:02}", abs / 60, abs % 60)
}

/// Parse a raw date value into an instant. `tz` interprets zone-less text.
pub fn parse_instant(value: &Value, tz: &FixedOffset) -> Option<DateTime<Utc>> {
    match value {
        Value::Int(ms) => Utc.timestamp_millis_opt(*ms).single(),
        Value::Float(ms) => Utc.timestamp_millis_opt(ms.floor() as i64).single(),
        Value::String(s) => parse_instant_str(s.trim(), tz),
        _ => None,
    }
}

fn parse_instant_str(s: &str, tz: &FixedOffset) -> Option<DateTime<Utc>> {
    if let Ok(ms) = s.parse::<i64>() {
        return Utc.timestamp_millis_opt(ms).single();
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // "2015-03-01 10:30 EST": the zone text is informational only.
    let date_time: String = s.splitn(3, ' ').take(2).collect::<Vec<_>>().join(" ");
    if let Ok(naive) = NaiveDateTime::parse_from_str(&date_time, "%Y-%m-%d %H:%M") {
        return tz.from_local_datetime(&naive).single().map(|dt| dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
    }
    tracing::debug!(value = s, "Unable to parse date");
    None
}

/// Instant shifted into `tz`.
pub fn local(value: &Value, tz: &TimezoneInfo) -> Option<DateTime<FixedOffset>> {
    let offset = tz.fixed_offset();
    parse_instant(value, &offset).map(|dt| dt.with_timezone(&offset))
}

/// Instant viewed in UTC.
pub fn utc(value: &Value, tz: &TimezoneInfo) -> Option<DateTime<Utc>> {
    parse_instant(value, &tz.fixed_offset())
}

pub fn date_string(value: &Value, tz: &TimezoneInfo) -> String {
    local(value, tz).map(|dt| dt.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

/// `YYYY-MM-DD HH:mm <zone>` in the display timezone.
pub fn date_time_string(value: &Value, tz: &TimezoneInfo) -> String {
    local(value, tz)
        .map(|dt| format!("{} {}", dt.format("%Y-%m-%d %H:%M"), tz.label()))
        .unwrap_or_default()
}

/// Calendar date in UTC, no time part.
pub fn date_string_utc(value: &Value, tz: &TimezoneInfo) -> String {
    utc(value, tz).map(|dt| dt.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

pub fn date_time_string_utc(value: &Value, tz: &TimezoneInfo) -> String {
    utc(value, tz).map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string()).unwrap_or_default()
}

pub fn time_string(value: &Value, tz: &TimezoneInfo) -> String {
    local(value, tz).map(|dt| dt.format("%H:%M").to_string()).unwrap_or_default()
}

pub fn time_string_utc(value: &Value, tz: &TimezoneInfo) -> String {
    utc(value, tz).map(|dt| dt.format("%H:%M").to_string()).unwrap_or_default()
}

/// Coarse span between two epoch-millisecond instants: "5 minutes", "1 year".
pub fn relative_to_date(date_ms: i64, from_ms: i64, messages: &Messages) -> String {
    let span = Duration::milliseconds(from_ms - date_ms);
    let days = span.num_days();
    let years = days / 365;
    let months = days / 30;
    let hours = span.num_hours();
    let minutes = span.num_minutes();

    let plural = |n: i64, key: &str| format!("{n} {}", messages.get(key));
    if years > 1 {
        plural(years, "time.years")
    } else if years == 1 {
        messages.get("time.year")
    } else if months > 1 {
        plural(months, "time.months")
    } else if months == 1 {
        messages.get("time.month")
    } else if days > 1 {
        plural(days, "time.days")
    } else if days == 1 {
        messages.get("time.day")
    } else if hours > 1 {
        plural(hours, "time.hours")
    } else if hours == 1 {
        messages.get("time.hour")
    } else if minutes > 1 {
        plural(minutes, "time.minutes")
    } else if minutes == 1 {
        messages.get("time.minute")
    } else {
        messages.get("time.moments")
    }
}

/// Relative span from `date_ms` to now, with the "ago" suffix.
pub fn relative_to_now(date_ms: i64, messages: &Messages) -> String {
    let now = Utc::now().timestamp_millis();
    format!("{} {}", relative_to_date(date_ms, now, messages), messages.get("time.ago"))
}

pub fn add_days_to_date<Tz: TimeZone>(date: DateTime<Tz>, days: i64) -> DateTime<Tz> {
    date + Duration::days(days)
}

pub fn date_to_date_string<Tz: TimeZone>(date: &DateTime<Tz>) -> String {
    date.with_timezone(&Utc).format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2015-03-01T23:30:00Z
    const MS: i64 = 1_425_252_600_000;

    #[test]
    fn test_date_time_string_in_zone() {
        let tz = TimezoneInfo::from_offset_minutes(60);
        assert_eq!(date_time_string(&Value::Int(MS), &tz), "2015-03-02 00:30 +01:00");
        assert_eq!(date_string(&Value::Int(MS), &tz), "2015-03-02");
    }

    #[test]
    fn test_date_string_utc_ignores_zone() {
        let tz = TimezoneInfo::from_offset_minutes(60);
        assert_eq!(date_string_utc(&Value::Int(MS), &tz), "2015-03-01");
        assert_eq!(date_time_string_utc(&Value::from(MS.to_string()), &tz), "2015-03-01 23:30 UTC");
    }

    #[test]
    fn test_parse_variants() {
        let tz = TimezoneInfo::from_offset_minutes(0);
        assert_eq!(date_string_utc(&Value::from("2015-03-01T23:30:00Z"), &tz), "2015-03-01");
        assert_eq!(time_string(&Value::from("2015-03-01 10:15 UTC"), &tz), "10:15");
        assert_eq!(date_string(&Value::from("2015-03-01"), &tz), "2015-03-01");
        assert_eq!(date_string(&Value::from("not a date"), &tz), "");
    }

    #[test]
    fn test_offset_display() {
        assert_eq!(offset_display(330), "+05:30");
        assert_eq!(offset_display(-240), "-04:00");
        assert_eq!(offset_display(0), "+00:00");
    }

    #[test]
    fn test_relative_to_date() {
        let m = Messages::default();
        let minute = 60_000;
        assert_eq!(relative_to_date(0, 5 * minute, &m), "5 minutes");
        assert_eq!(relative_to_date(0, 61 * minute, &m), "1 hour");
        assert_eq!(relative_to_date(0, 10_000, &m), "moments");
        assert_eq!(relative_to_date(0, 800 * 24 * 60 * minute, &m), "2 years");
    }

    #[test]
    fn test_add_days() {
        let start = Utc.timestamp_millis_opt(MS).single().unwrap();
        assert_eq!(date_to_date_string(&add_days_to_date(start, 2)), "2015-03-03");
    }
}

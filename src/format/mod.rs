//! # Format Library
//!
//! Pure pretty-printers per data type, grouped by namespace:
//!
//! | Namespace | Module |
//! |-----------|--------|
//! | number, bytes, boolean | [`number`] |
//! | date, timezone | [`date`] |
//! | geoLocation | [`geo`] |
//! | string, className, directoryEntity | [`text`] |
//!
//! [`FormatLibrary`] binds them to a message table and display timezone.
//! The only process-wide state is the class-name interning table and the
//! memoized local timezone; both are computed lazily and only grow.

pub mod date;
pub mod geo;
pub mod messages;
pub mod number;
pub mod text;

pub use date::TimezoneInfo;
pub use messages::Messages;

use crate::config::ResolverConfig;
use crate::model::Value;

/// Message table + timezone the printers run against.
#[derive(Debug, Clone)]
pub struct FormatLibrary {
    messages: Messages,
    timezone: Option<TimezoneInfo>,
}

impl Default for FormatLibrary {
    fn default() -> Self {
        Self::new(&ResolverConfig::default())
    }
}

impl FormatLibrary {
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            messages: Messages::with_overrides(&config.messages),
            timezone: config.timezone_offset_minutes.map(TimezoneInfo::from_offset_minutes),
        }
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// Configured zone, else the memoized process-local one.
    pub fn timezone(&self) -> &TimezoneInfo {
        self.timezone.as_ref().unwrap_or_else(|| date::current_timezone())
    }

    pub fn number_pretty(&self, value: &Value) -> String {
        number::pretty(value)
    }

    pub fn percent(&self, value: &Value) -> String {
        number::percent(value)
    }

    pub fn heading(&self, value: &Value) -> Option<String> {
        number::heading(value, &self.messages)
    }

    pub fn duration(&self, value: &Value) -> String {
        number::duration(value)
    }

    pub fn bytes(&self, value: &Value) -> String {
        number::bytes(value, 1, &self.messages)
    }

    pub fn boolean(&self, value: &Value) -> String {
        number::boolean(value, &self.messages)
    }

    pub fn date_time_string(&self, value: &Value) -> String {
        date::date_time_string(value, self.timezone())
    }

    pub fn date_string(&self, value: &Value) -> String {
        date::date_string(value, self.timezone())
    }

    pub fn date_string_utc(&self, value: &Value) -> String {
        date::date_string_utc(value, self.timezone())
    }

    pub fn relative_to_date(&self, date_ms: i64, from_ms: i64) -> String {
        date::relative_to_date(date_ms, from_ms, &self.messages)
    }

    pub fn geo_location(&self, value: &Value) -> Option<String> {
        geo::pretty(value, false)
    }

    pub fn phone_number(&self, value: &Value) -> String {
        text::phone_number(value)
    }

    pub fn ssn(&self, value: &Value) -> String {
        text::ssn(value)
    }

    pub fn directory_entity(&self, value: &Value) -> String {
        text::directory_entity(value, &self.messages)
    }
}

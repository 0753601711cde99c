//! One timestamp discipline for everything persisted.
//!
//! Instants are stored as UTC RFC 3339 text with millisecond precision and a
//! `Z` suffix — the same shape the schema triggers write — so SQL string
//! comparison agrees with instant ordering.

use chrono::{DateTime, NaiveTime, SecondsFormat, Utc};

use crate::error::StoreError;

pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| StoreError::InvalidStored {
            field: "timestamp",
            value: raw.to_string(),
        })
}

/// Parse a time-of-day in the "HH:MM" shape operating hours are stored in.
pub fn parse_hhmm(raw: &str) -> Result<NaiveTime, StoreError> {
    NaiveTime::parse_from_str(raw, "%H:%M").map_err(|_| StoreError::InvalidStored {
        field: "time_of_day",
        value: raw.to_string(),
    })
}

//! Date and time parsing for form and filter values

use chrono::{NaiveDate, NaiveTime};

use crate::error::{ConferenceError, ConferenceResult};

/// Parse a `YYYY-MM-DD` date, ignoring anything after the first 10 characters
/// (so full ISO timestamps are accepted)
pub fn parse_date(value: &str) -> ConferenceResult<NaiveDate> {
    let trimmed = value.trim();
    let head = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .map_err(|_| ConferenceError::bad_request(format!("Invalid date '{}', expected YYYY-MM-DD", value)))
}

/// Parse an `HH:MM` time, ignoring seconds or anything after the first 5 characters
pub fn parse_time(value: &str) -> ConferenceResult<NaiveTime> {
    let trimmed = value.trim();
    let head = trimmed.get(..5).unwrap_or(trimmed);
    NaiveTime::parse_from_str(head, "%H:%M")
        .map_err(|_| ConferenceError::bad_request(format!("Invalid time '{}', expected HH:MM", value)))
}

/// Parse an optional date form field; empty strings count as absent
pub fn parse_optional_date(value: Option<&str>) -> ConferenceResult<Option<NaiveDate>> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => parse_date(v).map(Some),
        _ => Ok(None),
    }
}

/// Parse an optional time form field; empty strings count as absent
pub fn parse_optional_time(value: Option<&str>) -> ConferenceResult<Option<NaiveTime>> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => parse_time(v).map(Some),
        _ => Ok(None),
    }
}

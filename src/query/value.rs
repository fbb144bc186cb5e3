//! Typed filter values

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

use crate::error::{ConferenceError, ConferenceResult};
use crate::utils::{parse_date, parse_time};

/// A value a predicate compares against
///
/// Every field has exactly one [`ValueType`], so predicates and entity values
/// for the same field always hold the same variant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Int(i64),
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Int(v) => write!(f, "{}", v),
            FilterValue::Text(v) => write!(f, "{}", v),
            FilterValue::Date(v) => write!(f, "{}", v),
            FilterValue::Time(v) => write!(f, "{}", v.format("%H:%M")),
        }
    }
}

/// Storage type of a filterable field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Int,
    Text,
    Date,
    Time,
}

impl ValueType {
    /// Convert a raw string into this type; failures are `BadRequest`
    pub fn coerce(&self, field: &str, raw: &str) -> ConferenceResult<FilterValue> {
        match self {
            ValueType::Int => raw.trim().parse::<i64>().map(FilterValue::Int).map_err(|_| {
                ConferenceError::bad_request(format!(
                    "Filter value '{}' for field '{}' is not an integer",
                    raw, field
                ))
            }),
            ValueType::Text => Ok(FilterValue::Text(raw.to_string())),
            ValueType::Date => parse_date(raw).map(FilterValue::Date),
            ValueType::Time => parse_time(raw).map(FilterValue::Time),
        }
    }
}

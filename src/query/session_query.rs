//! "Sessions not of type X starting before T"
//!
//! Expressed with one inequality only: the excluded type becomes an `IN` over
//! the remaining session types, leaving `startTime <` as the sole range.

use super::fields::SessionField;
use super::filter::{Operator, QueryPlan};
use super::value::FilterValue;
use crate::error::{ConferenceError, ConferenceResult};
use crate::types::SESSION_TYPES;
use crate::utils::parse_time;

/// Build the plan for sessions whose type is not `excluded_type` and whose
/// start time is strictly before `start_time` (`HH:MM`)
pub fn sessions_excluding_type_before(
    excluded_type: &str,
    start_time: &str,
) -> ConferenceResult<QueryPlan<SessionField>> {
    let excluded_type = excluded_type.trim();
    if !SESSION_TYPES.contains(&excluded_type) {
        return Err(ConferenceError::bad_request(format!(
            "{} not in the choice.",
            excluded_type
        )));
    }
    let before = parse_time(start_time)?;

    let remaining = SESSION_TYPES
        .iter()
        .filter(|t| **t != excluded_type)
        .map(|t| FilterValue::Text(t.to_string()))
        .collect();

    Ok(QueryPlan::builder()
        .filter_in(SessionField::TypeOfSession, remaining)?
        .filter(SessionField::StartTime, Operator::Lt, FilterValue::Time(before))?
        .build())
}

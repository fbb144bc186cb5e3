//! Conference entity

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::EntityKey;

/// City used when the organizer leaves it blank
pub const DEFAULT_CITY: &str = "Default City";

/// Topics used when the organizer gives none
pub const DEFAULT_TOPICS: &[&str] = &["Default", "Topic"];

/// A conference, keyed under its organizer's profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conference {
    pub key: EntityKey,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub organizer_user_id: String,
    #[serde(default)]
    pub topics: Vec<String>,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Month of `start_date`, 0 when there is none
    #[serde(default)]
    pub month: i64,
    #[serde(default)]
    pub max_attendees: i64,
    #[serde(default)]
    pub seats_available: i64,
}

impl Conference {
    /// Month number used by the `MONTH` filter
    pub fn month_of(start_date: Option<NaiveDate>) -> i64 {
        start_date.map(|d| i64::from(d.month())).unwrap_or(0)
    }

    /// Number of seats currently taken
    pub fn registered_count(&self) -> i64 {
        self.max_attendees - self.seats_available
    }

    /// Whether the conference is in progress on `date` (both bounds inclusive)
    pub fn runs_on(&self, date: NaiveDate) -> bool {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => start <= date && date <= end,
            (Some(start), None) => start == date,
            _ => false,
        }
    }

    /// `0 <= seatsAvailable <= maxAttendees`
    pub fn seats_consistent(&self) -> bool {
        self.seats_available >= 0 && self.seats_available <= self.max_attendees
    }
}

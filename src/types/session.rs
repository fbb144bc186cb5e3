//! Conference session entity

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::EntityKey;

/// Session types offered by every conference
pub const SESSION_TYPES: &[&str] = &["workshop", "lecture", "keynote"];

/// A session, keyed under the conference it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub key: EntityKey,
    pub session_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlights: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    /// Length in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_of_session: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveTime>,
    pub organizer_user_id: String,
    /// Name of the parent conference, copied at creation
    pub conference_belong_to: String,
}

impl Session {
    /// Key of the conference this session belongs to
    pub fn conference_key(&self) -> Option<&EntityKey> {
        self.key.parent()
    }
}

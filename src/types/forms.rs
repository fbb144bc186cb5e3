//! Request and response forms
//!
//! Every transfer between a form and an entity is spelled out field by field
//! here; nothing is copied by name at run time.

use serde::{Deserialize, Serialize};

use chrono::{NaiveDate, NaiveTime};

use super::{Conference, Profile, Session, TeeShirtSize, WishlistEntry};
use crate::error::{ConferenceError, ConferenceResult};
use crate::utils::{parse_optional_date, parse_optional_time};

/// Conference as sent by clients and returned to them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConferenceForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attendees: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seats_available: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub websafe_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer_display_name: Option<String>,
}

/// Organizer-editable conference fields, parsed; `None` means "not provided"
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConferenceFields {
    pub name: Option<String>,
    pub description: Option<String>,
    pub topics: Option<Vec<String>>,
    pub city: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub max_attendees: Option<i64>,
}

impl ConferenceForm {
    /// Parse the editable fields, treating empty strings and lists as absent
    ///
    /// `organizerUserId`, `month`, `seatsAvailable` and the key are derived
    /// server side and ignored here.
    pub fn parse_fields(&self) -> ConferenceResult<ConferenceFields> {
        if let Some(max) = self.max_attendees {
            if max < 0 {
                return Err(ConferenceError::bad_request("'maxAttendees' must not be negative"));
            }
        }

        Ok(ConferenceFields {
            name: non_empty(&self.name),
            description: non_empty(&self.description),
            topics: self.topics.clone().filter(|t| !t.is_empty()),
            city: non_empty(&self.city),
            start_date: parse_optional_date(self.start_date.as_deref())?,
            end_date: parse_optional_date(self.end_date.as_deref())?,
            max_attendees: self.max_attendees,
        })
    }

    pub fn from_conference(conf: &Conference, organizer_display_name: Option<String>) -> Self {
        Self {
            name: Some(conf.name.clone()),
            description: conf.description.clone(),
            organizer_user_id: Some(conf.organizer_user_id.clone()),
            topics: Some(conf.topics.clone()),
            city: Some(conf.city.clone()),
            start_date: conf.start_date.map(|d| d.to_string()),
            month: Some(conf.month),
            max_attendees: Some(conf.max_attendees),
            seats_available: Some(conf.seats_available),
            end_date: conf.end_date.map(|d| d.to_string()),
            websafe_key: Some(conf.key.to_websafe()),
            organizer_display_name,
        }
    }
}

/// Profile as returned to its owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
    pub display_name: String,
    pub main_email: String,
    pub tee_shirt_size: TeeShirtSize,
    pub conference_keys_to_attend: Vec<String>,
}

impl From<&Profile> for ProfileForm {
    fn from(profile: &Profile) -> Self {
        Self {
            display_name: profile.display_name.clone(),
            main_email: profile.main_email.clone(),
            tee_shirt_size: profile.tee_shirt_size,
            conference_keys_to_attend: profile
                .conference_keys_to_attend
                .iter()
                .map(|k| k.to_websafe())
                .collect(),
        }
    }
}

/// User-editable profile fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileMiniForm {
    pub display_name: Option<String>,
    pub tee_shirt_size: Option<TeeShirtSize>,
}

/// Session as sent by clients and returned to them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlights: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_of_session: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conference_belong_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub websafe_session_key: Option<String>,
}

/// Parsed session fields supplied by the organizer
#[derive(Debug, Clone, PartialEq)]
pub struct SessionFields {
    pub session_name: String,
    pub highlights: Option<String>,
    pub speaker: Option<String>,
    pub duration: Option<i64>,
    pub type_of_session: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
}

impl SessionForm {
    pub fn parse_fields(&self) -> ConferenceResult<SessionFields> {
        let session_name = non_empty(&self.session_name)
            .ok_or_else(|| ConferenceError::bad_request("Session 'name' field required"))?;
        if let Some(duration) = self.duration {
            if duration < 0 {
                return Err(ConferenceError::bad_request("'duration' must not be negative"));
            }
        }

        Ok(SessionFields {
            session_name,
            highlights: non_empty(&self.highlights),
            speaker: non_empty(&self.speaker),
            duration: self.duration,
            type_of_session: non_empty(&self.type_of_session),
            date: parse_optional_date(self.date.as_deref())?,
            start_time: parse_optional_time(self.start_time.as_deref())?,
        })
    }
}

impl From<&Session> for SessionForm {
    fn from(session: &Session) -> Self {
        Self {
            session_name: Some(session.session_name.clone()),
            highlights: session.highlights.clone(),
            speaker: session.speaker.clone(),
            duration: session.duration,
            type_of_session: session.type_of_session.clone(),
            date: session.date.map(|d| d.to_string()),
            start_time: session.start_time.map(|t| t.format("%H:%M").to_string()),
            organizer_user_id: Some(session.organizer_user_id.clone()),
            conference_belong_to: Some(session.conference_belong_to.clone()),
            websafe_session_key: Some(session.key.to_websafe()),
        }
    }
}

/// Confirmation returned after a wishlist add
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistForm {
    pub user_name: String,
    pub session_name: String,
}

impl From<&WishlistEntry> for WishlistForm {
    fn from(entry: &WishlistEntry) -> Self {
        Self {
            user_name: entry.user_name.clone(),
            session_name: entry.session_name.clone(),
        }
    }
}

/// Conferences and sessions returned together by discovery endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferencesAndSessions {
    pub conferences: Vec<ConferenceForm>,
    pub sessions: Vec<SessionForm>,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

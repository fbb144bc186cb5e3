//! Field vocabularies for conference and session queries

use std::fmt;

use super::executor::Filterable;
use super::filter::FilterField;
use super::value::{FilterValue, ValueType};
use crate::types::{Conference, Session};

/// Queryable conference attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConferenceField {
    Name,
    City,
    Topics,
    Month,
    MaxAttendees,
    SeatsAvailable,
}

impl ConferenceField {
    pub fn attribute(&self) -> &'static str {
        match self {
            ConferenceField::Name => "name",
            ConferenceField::City => "city",
            ConferenceField::Topics => "topics",
            ConferenceField::Month => "month",
            ConferenceField::MaxAttendees => "maxAttendees",
            ConferenceField::SeatsAvailable => "seatsAvailable",
        }
    }
}

impl fmt::Display for ConferenceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute())
    }
}

impl FilterField for ConferenceField {
    fn parse(token: &str) -> Option<Self> {
        match token.trim() {
            "NAME" | "name" => Some(ConferenceField::Name),
            "CITY" | "city" => Some(ConferenceField::City),
            "TOPIC" | "topics" => Some(ConferenceField::Topics),
            "MONTH" | "month" => Some(ConferenceField::Month),
            "MAX_ATTENDEES" | "maxAttendees" => Some(ConferenceField::MaxAttendees),
            "SEATS_AVAILABLE" | "seatsAvailable" => Some(ConferenceField::SeatsAvailable),
            _ => None,
        }
    }

    fn value_type(&self) -> ValueType {
        match self {
            ConferenceField::Name | ConferenceField::City | ConferenceField::Topics => ValueType::Text,
            ConferenceField::Month | ConferenceField::MaxAttendees | ConferenceField::SeatsAvailable => {
                ValueType::Int
            }
        }
    }

    fn name_field() -> Self {
        ConferenceField::Name
    }
}

impl Filterable<ConferenceField> for Conference {
    fn values(&self, field: ConferenceField) -> Vec<FilterValue> {
        match field {
            ConferenceField::Name => vec![FilterValue::Text(self.name.clone())],
            ConferenceField::City => vec![FilterValue::Text(self.city.clone())],
            ConferenceField::Topics => self.topics.iter().cloned().map(FilterValue::Text).collect(),
            ConferenceField::Month => vec![FilterValue::Int(self.month)],
            ConferenceField::MaxAttendees => vec![FilterValue::Int(self.max_attendees)],
            ConferenceField::SeatsAvailable => vec![FilterValue::Int(self.seats_available)],
        }
    }
}

/// Queryable session attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionField {
    Name,
    Speaker,
    Duration,
    Date,
    StartTime,
    TypeOfSession,
}

impl SessionField {
    pub fn attribute(&self) -> &'static str {
        match self {
            SessionField::Name => "sessionName",
            SessionField::Speaker => "speaker",
            SessionField::Duration => "duration",
            SessionField::Date => "date",
            SessionField::StartTime => "startTime",
            SessionField::TypeOfSession => "typeOfSession",
        }
    }
}

impl fmt::Display for SessionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute())
    }
}

impl FilterField for SessionField {
    fn parse(token: &str) -> Option<Self> {
        match token.trim() {
            "NAME" | "sessionName" => Some(SessionField::Name),
            "SPEAKER" | "speaker" => Some(SessionField::Speaker),
            "DURATION" | "duration" => Some(SessionField::Duration),
            "DATE" | "date" => Some(SessionField::Date),
            "STARTTIME" | "startTime" => Some(SessionField::StartTime),
            "TYPEOFSESSION" | "typeOfSession" => Some(SessionField::TypeOfSession),
            _ => None,
        }
    }

    fn value_type(&self) -> ValueType {
        match self {
            SessionField::Name | SessionField::Speaker | SessionField::TypeOfSession => ValueType::Text,
            SessionField::Duration => ValueType::Int,
            SessionField::Date => ValueType::Date,
            SessionField::StartTime => ValueType::Time,
        }
    }

    fn name_field() -> Self {
        SessionField::Name
    }
}

impl Filterable<SessionField> for Session {
    fn values(&self, field: SessionField) -> Vec<FilterValue> {
        let value = match field {
            SessionField::Name => Some(FilterValue::Text(self.session_name.clone())),
            SessionField::Speaker => self.speaker.clone().map(FilterValue::Text),
            SessionField::Duration => self.duration.map(FilterValue::Int),
            SessionField::Date => self.date.map(FilterValue::Date),
            SessionField::StartTime => self.start_time.map(FilterValue::Time),
            SessionField::TypeOfSession => self.type_of_session.clone().map(FilterValue::Text),
        };
        value.into_iter().collect()
    }
}

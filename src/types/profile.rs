//! User profile entity

use serde::{Deserialize, Serialize};

use super::EntityKey;

/// T-shirt sizes offered at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TeeShirtSize {
    #[default]
    NotSpecified,
    XsM,
    XsW,
    SM,
    SW,
    MM,
    MW,
    LM,
    LW,
    XlM,
    XlW,
    XxlM,
    XxlW,
    XxxlM,
    XxxlW,
}

/// Per-user profile, created lazily on first authenticated access
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub key: EntityKey,
    pub display_name: String,
    pub main_email: String,
    #[serde(default)]
    pub tee_shirt_size: TeeShirtSize,
    /// Conferences this user is registered for, no duplicates
    #[serde(default)]
    pub conference_keys_to_attend: Vec<EntityKey>,
}

impl Profile {
    pub fn new(user_id: &str, display_name: String, main_email: String) -> Self {
        Self {
            key: EntityKey::profile(user_id),
            display_name,
            main_email,
            tee_shirt_size: TeeShirtSize::NotSpecified,
            conference_keys_to_attend: Vec::new(),
        }
    }

    pub fn is_attending(&self, conference: &EntityKey) -> bool {
        self.conference_keys_to_attend.contains(conference)
    }

    /// Add a conference to the attendance set; false if it was already there
    pub fn attend(&mut self, conference: EntityKey) -> bool {
        if self.is_attending(&conference) {
            return false;
        }
        self.conference_keys_to_attend.push(conference);
        true
    }

    /// Remove a conference from the attendance set; false if it was absent
    pub fn unattend(&mut self, conference: &EntityKey) -> bool {
        let before = self.conference_keys_to_attend.len();
        self.conference_keys_to_attend.retain(|k| k != conference);
        before != self.conference_keys_to_attend.len()
    }
}

//! Data types for Conference Central
//!
//! Entities, their keys, and the forms exchanged with clients.

mod conference;
pub mod forms;
mod key;
mod profile;
mod session;
mod wishlist;

use serde::{Deserialize, Serialize};

pub use conference::{Conference, DEFAULT_CITY, DEFAULT_TOPICS};
pub use forms::{
    ConferenceFields, ConferenceForm, ConferencesAndSessions, ProfileForm, ProfileMiniForm,
    SessionFields, SessionForm, WishlistForm,
};
pub use key::{EntityKey, Kind, KeyId};
pub use profile::{Profile, TeeShirtSize};
pub use session::{Session, SESSION_TYPES};
pub use wishlist::WishlistEntry;

/// Any stored entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum Entity {
    Profile(Profile),
    Conference(Conference),
    Session(Session),
    Wishlist(WishlistEntry),
}

impl Entity {
    pub fn key(&self) -> &EntityKey {
        match self {
            Entity::Profile(p) => &p.key,
            Entity::Conference(c) => &c.key,
            Entity::Session(s) => &s.key,
            Entity::Wishlist(w) => &w.key,
        }
    }
}

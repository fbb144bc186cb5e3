//! Conference Central - the conference services
//!
//! Registration, wishlists, conferences, sessions, profiles and discovery on
//! top of the entity store. Operations live in submodules and are exposed as
//! methods on [`ConferenceCentral`].

mod conference;
mod discovery;
mod profile;
mod registration;
mod session;
mod wishlist;

use std::sync::Arc;

use crate::announcements::{Announcements, Cache, MemoryCache};
use crate::auth::UserIdentity;
use crate::error::ConferenceResult;
use crate::notify::{LogNotifier, Notifier};
use crate::query::RawFilter;
use crate::store::EntityStore;
use crate::types::{
    Conference, ConferenceForm, EntityKey, Profile, ProfileMiniForm, Session, SessionForm, WishlistEntry,
};

pub use discovery::Discovered;
pub use registration::RegistrationOutcome;

/// Conference services sharing one store and its collaborators
pub struct ConferenceCentral {
    pub(crate) store: Arc<EntityStore>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) announcements: Announcements,
}

impl ConferenceCentral {
    /// Services over `store`, logging emails and caching in memory
    pub fn new(store: EntityStore) -> Self {
        Self::with_collaborators(
            Arc::new(store),
            Arc::new(LogNotifier),
            Arc::new(MemoryCache::new()),
        )
    }

    pub fn with_collaborators(
        store: Arc<EntityStore>,
        notifier: Arc<dyn Notifier>,
        cache: Arc<dyn Cache>,
    ) -> Self {
        Self {
            store,
            notifier,
            announcements: Announcements::new(cache),
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Shared handle to the store, for background tasks
    pub fn store_handle(&self) -> Arc<EntityStore> {
        Arc::clone(&self.store)
    }

    pub fn announcements(&self) -> &Announcements {
        &self.announcements
    }
}

impl ConferenceCentral {
    // Registration (from registration.rs)
    pub fn register(&self, user: &UserIdentity, conference: &EntityKey) -> ConferenceResult<RegistrationOutcome> {
        registration::register(self, user, conference)
    }

    pub fn unregister(&self, user: &UserIdentity, conference: &EntityKey) -> ConferenceResult<RegistrationOutcome> {
        registration::unregister(self, user, conference)
    }

    pub fn conferences_attending(&self, user: &UserIdentity) -> ConferenceResult<Vec<Conference>> {
        registration::attending(self, user)
    }

    // Wishlist (from wishlist.rs)
    pub fn add_to_wishlist(&self, user: &UserIdentity, session: &EntityKey) -> ConferenceResult<WishlistEntry> {
        wishlist::add_to_wishlist(self, user, session)
    }

    pub fn wishlist_for_conference(
        &self,
        user: &UserIdentity,
        conference: &EntityKey,
    ) -> ConferenceResult<Vec<Session>> {
        wishlist::wishlist_for_conference(self, user, conference)
    }

    // Conferences (from conference.rs)
    pub fn create_conference(&self, user: &UserIdentity, form: &ConferenceForm) -> ConferenceResult<Conference> {
        conference::create_conference(self, user, form)
    }

    pub fn update_conference(
        &self,
        user: &UserIdentity,
        key: &EntityKey,
        form: &ConferenceForm,
    ) -> ConferenceResult<Conference> {
        conference::update_conference(self, user, key, form)
    }

    pub fn get_conference(&self, key: &EntityKey) -> ConferenceResult<Conference> {
        conference::get_conference(self, key)
    }

    pub fn conferences_created(&self, user: &UserIdentity) -> ConferenceResult<Vec<Conference>> {
        conference::conferences_created(self, user)
    }

    pub fn query_conferences(&self, filters: &[RawFilter]) -> ConferenceResult<Vec<Conference>> {
        conference::query_conferences(self, filters)
    }

    pub fn conference_form(&self, conference: &Conference) -> ConferenceForm {
        conference::conference_form(self, conference)
    }

    pub fn conference_forms(&self, conferences: &[Conference]) -> Vec<ConferenceForm> {
        conference::conference_forms(self, conferences)
    }

    // Profiles (from profile.rs)
    pub fn profile_for(&self, user: &UserIdentity) -> ConferenceResult<Profile> {
        profile::profile_for(self, user)
    }

    pub fn save_profile(&self, user: &UserIdentity, form: &ProfileMiniForm) -> ConferenceResult<Profile> {
        profile::save_profile(self, user, form)
    }

    // Sessions (from session.rs)
    pub fn create_session(
        &self,
        user: &UserIdentity,
        conference: &EntityKey,
        form: &SessionForm,
    ) -> ConferenceResult<Session> {
        session::create_session(self, user, conference, form)
    }

    pub fn conference_sessions(&self, conference: &EntityKey) -> ConferenceResult<Vec<Session>> {
        session::conference_sessions(self, conference)
    }

    pub fn conference_sessions_by_type(
        &self,
        conference: &EntityKey,
        type_of_session: &str,
    ) -> ConferenceResult<Vec<Session>> {
        session::conference_sessions_by_type(self, conference, type_of_session)
    }

    pub fn all_sessions(&self) -> Vec<Session> {
        session::all_sessions(self)
    }

    pub fn sessions_by_speaker(&self, speaker: &str) -> ConferenceResult<Vec<Session>> {
        session::sessions_by_speaker(self, speaker)
    }

    pub fn query_sessions(&self, filters: &[RawFilter]) -> ConferenceResult<Vec<Session>> {
        session::query_sessions(self, filters)
    }

    pub fn sessions_excluding_type_before(
        &self,
        excluded_type: &str,
        start_time: &str,
    ) -> ConferenceResult<Vec<Session>> {
        session::sessions_before_excluding(self, excluded_type, start_time)
    }

    // Discovery (from discovery.rs)
    pub fn discover_by_date(&self, date: &str) -> ConferenceResult<Discovered> {
        discovery::by_date(self, date)
    }

    pub fn discover_by_keyword(&self, keyword: &str) -> ConferenceResult<Discovered> {
        discovery::by_keyword(self, keyword)
    }

    // Announcements
    pub fn refresh_announcement(&self) -> ConferenceResult<Option<String>> {
        self.announcements.refresh(&self.store)
    }

    pub fn announcement(&self) -> String {
        self.announcements.current()
    }

    pub fn featured_speaker(&self) -> String {
        self.announcements.featured_speaker()
    }
}

impl Default for ConferenceCentral {
    fn default() -> Self {
        Self::new(EntityStore::new())
    }
}

//! Wishlist Manager
//!
//! Wishlist rows are standalone join entities between a profile and a
//! session. Listing a user's wishlist for one conference scans that user's
//! rows and keeps the sessions whose parent key is the conference.

use tracing::info;

use super::profile::{profile_for, profile_key};
use super::ConferenceCentral;
use crate::auth::UserIdentity;
use crate::error::{ConferenceError, ConferenceResult};
use crate::types::{EntityKey, Kind, Session, WishlistEntry};

/// Record that the caller wants to attend a session
///
/// Adding the same session twice stores two rows.
pub fn add_to_wishlist(
    central: &ConferenceCentral,
    user: &UserIdentity,
    session_key: &EntityKey,
) -> ConferenceResult<WishlistEntry> {
    session_key.expect_kind(Kind::Session)?;
    let session: Session = central.store.get(session_key).ok_or_else(|| {
        ConferenceError::not_found(format!("No session found with key: {}", session_key.to_websafe()))
    })?;
    let profile = profile_for(central, user)?;

    let entry = WishlistEntry {
        key: EntityKey::with_id(Kind::Wishlist, central.store.allocate_id()),
        user_key: profile.key.clone(),
        session_key: session_key.clone(),
        user_name: profile.display_name,
        session_name: session.session_name,
    };
    central.store.put(entry.clone())?;

    info!(user = %user.user_id, session = %session_key, "Session added to wishlist");
    Ok(entry)
}

/// The caller's wishlisted sessions that belong to `conference_key`
///
/// Rows whose session no longer exists are skipped.
pub fn wishlist_for_conference(
    central: &ConferenceCentral,
    user: &UserIdentity,
    conference_key: &EntityKey,
) -> ConferenceResult<Vec<Session>> {
    conference_key.expect_kind(Kind::Conference)?;
    let user_key = profile_key(user)?;

    let session_keys: Vec<EntityKey> = central
        .store
        .query_kind::<WishlistEntry>()
        .into_iter()
        .filter(|entry| entry.user_key == user_key)
        .map(|entry| entry.session_key)
        .filter(|key| key.parent() == Some(conference_key))
        .collect();

    Ok(central
        .store
        .get_many::<Session>(&session_keys)
        .into_iter()
        .flatten()
        .collect())
}

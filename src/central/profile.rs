//! Lazily created user profiles

use tracing::info;

use super::ConferenceCentral;
use crate::auth::UserIdentity;
use crate::error::{ConferenceError, ConferenceResult};
use crate::store::{Transaction, TransactionOptions};
use crate::types::{EntityKey, Profile, ProfileMiniForm};

/// Key of the caller's profile
pub(crate) fn profile_key(user: &UserIdentity) -> ConferenceResult<EntityKey> {
    if user.user_id.trim().is_empty() {
        return Err(ConferenceError::Unauthorized("Authorization required".to_string()));
    }
    Ok(EntityKey::profile(&user.user_id))
}

/// Fetch the caller's profile inside `tx`, creating it if absent
pub(crate) fn get_or_create_in(tx: &mut Transaction<'_>, user: &UserIdentity) -> ConferenceResult<Profile> {
    let key = profile_key(user)?;
    if let Some(profile) = tx.get::<Profile>(&key)? {
        return Ok(profile);
    }

    let profile = Profile::new(&user.user_id, user.nickname.clone(), user.email.clone());
    tx.put(profile.clone())?;
    Ok(profile)
}

pub fn profile_for(central: &ConferenceCentral, user: &UserIdentity) -> ConferenceResult<Profile> {
    let key = profile_key(user)?;
    if let Some(profile) = central.store.get::<Profile>(&key) {
        return Ok(profile);
    }

    let profile = central
        .store
        .run_in_transaction(TransactionOptions::single_group(), |tx| get_or_create_in(tx, user))?;
    info!(user = %user.user_id, "Profile created");
    Ok(profile)
}

/// Update the display name and t-shirt size; blank values leave a field unchanged
pub fn save_profile(
    central: &ConferenceCentral,
    user: &UserIdentity,
    form: &ProfileMiniForm,
) -> ConferenceResult<Profile> {
    let display_name = form
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    central
        .store
        .run_in_transaction(TransactionOptions::single_group(), |tx| {
            let mut profile = get_or_create_in(tx, user)?;
            if let Some(name) = display_name {
                profile.display_name = name.to_string();
            }
            if let Some(size) = form.tee_shirt_size {
                profile.tee_shirt_size = size;
            }
            tx.put(profile.clone())?;
            Ok(profile)
        })
}

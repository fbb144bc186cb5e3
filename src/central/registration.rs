//! Registration Coordinator
//!
//! A user's attendance set and a conference's free seats change together or
//! not at all: both live in one cross-group transaction spanning the user's
//! profile and the conference. A transaction that loses a race to another
//! commit is re-run against fresh state.

use serde::Serialize;
use tracing::{debug, info};

use super::profile::{get_or_create_in, profile_key};
use super::ConferenceCentral;
use crate::auth::UserIdentity;
use crate::error::{ConferenceError, ConferenceResult};
use crate::store::TransactionOptions;
use crate::types::{Conference, EntityKey, Kind, Profile};

/// Result of a register or unregister request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegistrationOutcome {
    pub success: bool,
}

pub(crate) fn conference_not_found(key: &EntityKey) -> ConferenceError {
    ConferenceError::not_found(format!("No conference found with key: {}", key.to_websafe()))
}

/// Take a seat at the conference
///
/// Fails with `Conflict` when already registered or when no seats are left;
/// neither entity changes in that case.
pub fn register(
    central: &ConferenceCentral,
    user: &UserIdentity,
    conference_key: &EntityKey,
) -> ConferenceResult<RegistrationOutcome> {
    conference_key.expect_kind(Kind::Conference)?;

    let seats_left = central
        .store
        .run_in_transaction(TransactionOptions::cross_group(), |tx| {
            let mut conference: Conference = tx
                .get(conference_key)?
                .ok_or_else(|| conference_not_found(conference_key))?;
            let mut profile = get_or_create_in(tx, user)?;

            if profile.is_attending(conference_key) {
                return Err(ConferenceError::conflict(
                    "You have already registered for this conference",
                ));
            }
            if conference.seats_available <= 0 {
                return Err(ConferenceError::conflict("There are no seats available."));
            }

            profile.attend(conference_key.clone());
            conference.seats_available -= 1;
            let seats_left = conference.seats_available;

            tx.put(profile)?;
            tx.put(conference)?;
            Ok(seats_left)
        })?;

    info!(
        user = %user.user_id,
        conference = %conference_key,
        seats_left,
        "Registered for conference"
    );
    Ok(RegistrationOutcome { success: true })
}

/// Give the seat back
///
/// Not being registered is reported as `success: false` and writes nothing.
pub fn unregister(
    central: &ConferenceCentral,
    user: &UserIdentity,
    conference_key: &EntityKey,
) -> ConferenceResult<RegistrationOutcome> {
    conference_key.expect_kind(Kind::Conference)?;
    let user_key = profile_key(user)?;

    let success = central
        .store
        .run_in_transaction(TransactionOptions::cross_group(), |tx| {
            let mut conference: Conference = tx
                .get(conference_key)?
                .ok_or_else(|| conference_not_found(conference_key))?;

            let mut profile = match tx.get::<Profile>(&user_key)? {
                Some(profile) => profile,
                None => return Ok(false),
            };
            if !profile.unattend(conference_key) {
                return Ok(false);
            }

            conference.seats_available += 1;
            tx.put(profile)?;
            tx.put(conference)?;
            Ok(true)
        })?;

    if success {
        info!(user = %user.user_id, conference = %conference_key, "Unregistered from conference");
    } else {
        debug!(user = %user.user_id, conference = %conference_key, "Unregister ignored, not registered");
    }
    Ok(RegistrationOutcome { success })
}

/// Conferences the user is registered for, in registration order
pub fn attending(central: &ConferenceCentral, user: &UserIdentity) -> ConferenceResult<Vec<Conference>> {
    let key = profile_key(user)?;
    let Some(profile) = central.store.get::<Profile>(&key) else {
        return Ok(Vec::new());
    };

    Ok(central
        .store
        .get_many::<Conference>(&profile.conference_keys_to_attend)
        .into_iter()
        .flatten()
        .collect())
}

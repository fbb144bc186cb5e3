//! Conference creation, update and lookup

use std::collections::HashMap;

use tracing::info;

use super::profile::{get_or_create_in, profile_key};
use super::registration::conference_not_found;
use super::ConferenceCentral;
use crate::auth::UserIdentity;
use crate::error::{ConferenceError, ConferenceResult};
use crate::notify::EmailPayload;
use crate::query::{compile_filters, ConferenceField, QueryExecutor, QueryPlan, RawFilter};
use crate::store::TransactionOptions;
use crate::types::{
    Conference, ConferenceFields, ConferenceForm, EntityKey, Kind, Profile, DEFAULT_CITY, DEFAULT_TOPICS,
};

pub fn create_conference(
    central: &ConferenceCentral,
    user: &UserIdentity,
    form: &ConferenceForm,
) -> ConferenceResult<Conference> {
    let fields = form.parse_fields()?;
    let name = fields
        .name
        .ok_or_else(|| ConferenceError::bad_request("Conference 'name' field required"))?;
    let organizer_key = profile_key(user)?;

    let max_attendees = fields.max_attendees.unwrap_or(0);
    let conference = Conference {
        key: organizer_key.child(Kind::Conference, central.store.allocate_id()),
        name,
        description: fields.description,
        organizer_user_id: user.user_id.clone(),
        topics: fields
            .topics
            .unwrap_or_else(|| DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect()),
        city: fields.city.unwrap_or_else(|| DEFAULT_CITY.to_string()),
        start_date: fields.start_date,
        end_date: fields.end_date,
        month: Conference::month_of(fields.start_date),
        max_attendees,
        seats_available: max_attendees,
    };

    central
        .store
        .run_in_transaction(TransactionOptions::single_group(), |tx| {
            get_or_create_in(tx, user)?;
            tx.put(conference.clone())?;
            Ok(())
        })?;

    info!(
        organizer = %user.user_id,
        conference = %conference.key,
        name = %conference.name,
        "Conference created"
    );

    central.notifier.enqueue_email(
        &user.email,
        EmailPayload::new(
            "You created a new Conference!",
            format!(
                "Hi, you have created the following conference:\r\n\r\n{}",
                conference.name
            ),
        ),
    );

    Ok(conference)
}

/// Apply the provided fields; only the organizer may do this
pub fn update_conference(
    central: &ConferenceCentral,
    user: &UserIdentity,
    key: &EntityKey,
    form: &ConferenceForm,
) -> ConferenceResult<Conference> {
    key.expect_kind(Kind::Conference)?;
    let fields = form.parse_fields()?;

    let updated = central
        .store
        .run_in_transaction(TransactionOptions::single_group(), |tx| {
            let mut conference: Conference = tx.get(key)?.ok_or_else(|| conference_not_found(key))?;
            if conference.organizer_user_id != user.user_id {
                return Err(ConferenceError::forbidden("Only the owner can update the conference."));
            }
            apply_fields(&mut conference, &fields)?;
            tx.put(conference.clone())?;
            Ok(conference)
        })?;

    info!(conference = %key, "Conference updated");
    Ok(updated)
}

fn apply_fields(conference: &mut Conference, fields: &ConferenceFields) -> ConferenceResult<()> {
    if let Some(name) = &fields.name {
        conference.name = name.clone();
    }
    if let Some(description) = &fields.description {
        conference.description = Some(description.clone());
    }
    if let Some(topics) = &fields.topics {
        conference.topics = topics.clone();
    }
    if let Some(city) = &fields.city {
        conference.city = city.clone();
    }
    if let Some(start) = fields.start_date {
        conference.start_date = Some(start);
        conference.month = Conference::month_of(Some(start));
    }
    if let Some(end) = fields.end_date {
        conference.end_date = Some(end);
    }
    if let Some(max) = fields.max_attendees {
        // Registered attendees keep their seats
        let registered = conference.registered_count();
        if max < registered {
            return Err(ConferenceError::bad_request(format!(
                "'maxAttendees' cannot be lower than the {} registered attendees",
                registered
            )));
        }
        conference.max_attendees = max;
        conference.seats_available = max - registered;
    }
    Ok(())
}

pub fn get_conference(central: &ConferenceCentral, key: &EntityKey) -> ConferenceResult<Conference> {
    key.expect_kind(Kind::Conference)?;
    central
        .store
        .get::<Conference>(key)
        .ok_or_else(|| conference_not_found(key))
}

/// Conferences organized by the caller, by name
pub fn conferences_created(central: &ConferenceCentral, user: &UserIdentity) -> ConferenceResult<Vec<Conference>> {
    let organizer_key = profile_key(user)?;
    Ok(QueryExecutor::new(&central.store)
        .run_under::<ConferenceField, Conference>(&organizer_key, &QueryPlan::all())
        .collect())
}

/// Compile and run client filters over all conferences
pub fn query_conferences(central: &ConferenceCentral, filters: &[RawFilter]) -> ConferenceResult<Vec<Conference>> {
    let plan = compile_filters::<ConferenceField>(filters)?;
    Ok(QueryExecutor::new(&central.store)
        .run::<_, Conference>(&plan)
        .collect())
}

/// Form for one conference, with its organizer's display name
pub fn conference_form(central: &ConferenceCentral, conference: &Conference) -> ConferenceForm {
    let organizer = central
        .store
        .get::<Profile>(&EntityKey::profile(&conference.organizer_user_id))
        .map(|p| p.display_name);
    ConferenceForm::from_conference(conference, organizer)
}

/// Forms for `conferences`, with each organizer's display name looked up once
pub fn conference_forms(central: &ConferenceCentral, conferences: &[Conference]) -> Vec<ConferenceForm> {
    let mut organizers: Vec<EntityKey> = conferences
        .iter()
        .map(|c| EntityKey::profile(&c.organizer_user_id))
        .collect();
    organizers.sort();
    organizers.dedup();

    let names: HashMap<EntityKey, String> = organizers
        .iter()
        .cloned()
        .zip(central.store.get_many::<Profile>(&organizers))
        .filter_map(|(key, profile)| profile.map(|p| (key, p.display_name)))
        .collect();

    conferences
        .iter()
        .map(|c| {
            let display_name = names.get(&EntityKey::profile(&c.organizer_user_id)).cloned();
            ConferenceForm::from_conference(c, display_name)
        })
        .collect()
}

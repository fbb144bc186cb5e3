//! Sessions within conferences

use tracing::info;

use super::registration::conference_not_found;
use super::ConferenceCentral;
use crate::auth::UserIdentity;
use crate::error::{ConferenceError, ConferenceResult};
use crate::query::{
    compile_filters, sessions_excluding_type_before, FilterValue, Operator, QueryExecutor, QueryPlan, RawFilter,
    SessionField,
};
use crate::store::TransactionOptions;
use crate::types::{Conference, EntityKey, Kind, Session, SessionForm};

/// Add a session to a conference; only its organizer may do this
///
/// When the speaker already has sessions in the conference, the featured
/// speaker announcement is updated.
pub fn create_session(
    central: &ConferenceCentral,
    user: &UserIdentity,
    conference_key: &EntityKey,
    form: &SessionForm,
) -> ConferenceResult<Session> {
    conference_key.expect_kind(Kind::Conference)?;
    let fields = form.parse_fields()?;
    let session_id = central.store.allocate_id();

    let (session, same_speaker) = central
        .store
        .run_in_transaction(TransactionOptions::single_group(), |tx| {
            let conference: Conference = tx
                .get(conference_key)?
                .ok_or_else(|| conference_not_found(conference_key))?;
            if conference.organizer_user_id != user.user_id {
                return Err(ConferenceError::forbidden(
                    "Only the owner can add sessions to the conference.",
                ));
            }

            let session = Session {
                key: conference_key.child(Kind::Session, session_id),
                session_name: fields.session_name.clone(),
                highlights: fields.highlights.clone(),
                speaker: fields.speaker.clone(),
                duration: fields.duration,
                type_of_session: fields.type_of_session.clone(),
                date: fields.date,
                start_time: fields.start_time,
                organizer_user_id: user.user_id.clone(),
                conference_belong_to: conference.name,
            };

            let same_speaker: Vec<String> = match &session.speaker {
                Some(speaker) => tx
                    .query_ancestor::<Session>(conference_key)?
                    .into_iter()
                    .filter(|s| s.speaker.as_deref() == Some(speaker.as_str()))
                    .map(|s| s.session_name)
                    .collect(),
                None => Vec::new(),
            };

            tx.put(session.clone())?;
            Ok((session, same_speaker))
        })?;

    info!(session = %session.key, name = %session.session_name, "Session created");

    if let (Some(speaker), false) = (&session.speaker, same_speaker.is_empty()) {
        let mut names = Vec::with_capacity(same_speaker.len() + 1);
        names.push(session.session_name.clone());
        names.extend(same_speaker);
        central.announcements.record_featured_speaker(speaker, &names);
    }

    Ok(session)
}

/// Sessions of one conference, by name
pub fn conference_sessions(central: &ConferenceCentral, conference_key: &EntityKey) -> ConferenceResult<Vec<Session>> {
    sessions_under(central, conference_key, &QueryPlan::all())
}

/// Sessions of one conference with the given type, by name
pub fn conference_sessions_by_type(
    central: &ConferenceCentral,
    conference_key: &EntityKey,
    type_of_session: &str,
) -> ConferenceResult<Vec<Session>> {
    let plan = QueryPlan::builder()
        .filter(
            SessionField::TypeOfSession,
            Operator::Eq,
            FilterValue::Text(type_of_session.to_string()),
        )?
        .build();
    sessions_under(central, conference_key, &plan)
}

fn sessions_under(
    central: &ConferenceCentral,
    conference_key: &EntityKey,
    plan: &QueryPlan<SessionField>,
) -> ConferenceResult<Vec<Session>> {
    conference_key.expect_kind(Kind::Conference)?;
    if central.store.get::<Conference>(conference_key).is_none() {
        return Err(conference_not_found(conference_key));
    }
    Ok(QueryExecutor::new(&central.store)
        .run_under::<_, Session>(conference_key, plan)
        .collect())
}

pub fn all_sessions(central: &ConferenceCentral) -> Vec<Session> {
    QueryExecutor::new(&central.store)
        .run::<SessionField, Session>(&QueryPlan::all())
        .collect()
}

/// Sessions given by `speaker` across all conferences
pub fn sessions_by_speaker(central: &ConferenceCentral, speaker: &str) -> ConferenceResult<Vec<Session>> {
    let plan = QueryPlan::builder()
        .filter(SessionField::Speaker, Operator::Eq, FilterValue::Text(speaker.to_string()))?
        .build();
    Ok(QueryExecutor::new(&central.store).run::<_, Session>(&plan).collect())
}

/// Compile and run client filters over all sessions
pub fn query_sessions(central: &ConferenceCentral, filters: &[RawFilter]) -> ConferenceResult<Vec<Session>> {
    let plan = compile_filters::<SessionField>(filters)?;
    Ok(QueryExecutor::new(&central.store).run::<_, Session>(&plan).collect())
}

/// Sessions not of `excluded_type` that start before `start_time`
pub fn sessions_before_excluding(
    central: &ConferenceCentral,
    excluded_type: &str,
    start_time: &str,
) -> ConferenceResult<Vec<Session>> {
    let plan = sessions_excluding_type_before(excluded_type, start_time)?;
    Ok(QueryExecutor::new(&central.store).run::<_, Session>(&plan).collect())
}

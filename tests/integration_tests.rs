//! Integration tests for Conference Central

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use futures::future::join_all;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use conference_central::api::http::create_router;
use conference_central::api::AppState;
use conference_central::auth::JwtAuth;
use conference_central::types::{ConferenceForm, ProfileMiniForm, SessionForm, TeeShirtSize};
use conference_central::{
    ConferenceCentral, ConferenceError, EntityKey, EntityStore, RawFilter, Session, UserIdentity,
};

fn organizer() -> UserIdentity {
    UserIdentity::new("organizer", "organizer@example.com", "Organizer")
}

fn alice() -> UserIdentity {
    UserIdentity::new("alice", "alice@example.com", "Alice")
}

fn conference_form(name: &str, city: &str, max: i64) -> ConferenceForm {
    ConferenceForm {
        name: Some(name.to_string()),
        city: Some(city.to_string()),
        max_attendees: Some(max),
        ..Default::default()
    }
}

fn session_form(name: &str, speaker: &str, kind: &str, start: &str) -> SessionForm {
    SessionForm {
        session_name: Some(name.to_string()),
        speaker: Some(speaker.to_string()),
        type_of_session: Some(kind.to_string()),
        start_time: Some(start.to_string()),
        duration: Some(45),
        ..Default::default()
    }
}

fn names(sessions: &[Session]) -> Vec<&str> {
    sessions.iter().map(|s| s.session_name.as_str()).collect()
}

// ============================================================================
// Conferences
// ============================================================================

#[test]
fn test_create_conference_applies_defaults() {
    let central = ConferenceCentral::default();
    let form = ConferenceForm {
        name: Some("RustConf".to_string()),
        start_date: Some("2024-09-10".to_string()),
        ..Default::default()
    };

    let conf = central.create_conference(&organizer(), &form).unwrap();
    assert_eq!(conf.city, "Default City");
    assert_eq!(conf.topics, vec!["Default", "Topic"]);
    assert_eq!(conf.month, 9);
    assert_eq!(conf.seats_available, conf.max_attendees);
    assert_eq!(conf.key.parent(), Some(&EntityKey::profile("organizer")));

    // The organizer's profile is created alongside
    assert_eq!(central.profile_for(&organizer()).unwrap().display_name, "Organizer");
}

#[test]
fn test_create_conference_requires_name() {
    let central = ConferenceCentral::default();
    let err = central
        .create_conference(&organizer(), &ConferenceForm::default())
        .unwrap_err();
    assert_eq!(
        err,
        ConferenceError::BadRequest("Conference 'name' field required".to_string())
    );
}

#[test]
fn test_update_conference_by_owner_only() {
    let central = ConferenceCentral::default();
    let conf = central
        .create_conference(&organizer(), &conference_form("RustConf", "Portland", 10))
        .unwrap();

    let rename = ConferenceForm {
        name: Some("RustConf 2024".to_string()),
        ..Default::default()
    };
    let err = central.update_conference(&alice(), &conf.key, &rename).unwrap_err();
    assert!(matches!(err, ConferenceError::Forbidden(_)));

    let updated = central.update_conference(&organizer(), &conf.key, &rename).unwrap();
    assert_eq!(updated.name, "RustConf 2024");
    assert_eq!(updated.city, "Portland");
}

#[test]
fn test_update_capacity_keeps_registered_seats() {
    let central = ConferenceCentral::default();
    let conf = central
        .create_conference(&organizer(), &conference_form("RustConf", "Portland", 10))
        .unwrap();
    for n in 0..3 {
        let user = UserIdentity::new(format!("u{}", n), "u@example.com", "U");
        central.register(&user, &conf.key).unwrap();
    }

    let grow = ConferenceForm {
        max_attendees: Some(20),
        ..Default::default()
    };
    let updated = central.update_conference(&organizer(), &conf.key, &grow).unwrap();
    assert_eq!(updated.max_attendees, 20);
    assert_eq!(updated.seats_available, 17);

    let shrink = ConferenceForm {
        max_attendees: Some(2),
        ..Default::default()
    };
    let err = central.update_conference(&organizer(), &conf.key, &shrink).unwrap_err();
    assert!(matches!(err, ConferenceError::BadRequest(_)));
    assert_eq!(central.get_conference(&conf.key).unwrap().seats_available, 17);
}

#[test]
fn test_conferences_created_lists_only_own() {
    let central = ConferenceCentral::default();
    central
        .create_conference(&organizer(), &conference_form("Zeta", "Paris", 5))
        .unwrap();
    central
        .create_conference(&organizer(), &conference_form("Alpha", "Paris", 5))
        .unwrap();
    central
        .create_conference(&alice(), &conference_form("Other", "Rome", 5))
        .unwrap();

    let created: Vec<String> = central
        .conferences_created(&organizer())
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(created, vec!["Alpha", "Zeta"]);
}

#[test]
fn test_conference_forms_carry_organizer_name() {
    let central = ConferenceCentral::default();
    central
        .save_profile(
            &organizer(),
            &ProfileMiniForm {
                display_name: Some("The Organizer".to_string()),
                tee_shirt_size: Some(TeeShirtSize::LM),
            },
        )
        .unwrap();
    let conf = central
        .create_conference(&organizer(), &conference_form("RustConf", "Portland", 10))
        .unwrap();

    let forms = central.conference_forms(&[conf.clone(), conf]);
    assert_eq!(forms.len(), 2);
    assert!(forms
        .iter()
        .all(|f| f.organizer_display_name.as_deref() == Some("The Organizer")));
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn test_query_conferences_with_filters() {
    let central = ConferenceCentral::default();
    central
        .create_conference(&organizer(), &conference_form("Big Paris", "Paris", 500))
        .unwrap();
    central
        .create_conference(&organizer(), &conference_form("Small Paris", "Paris", 20))
        .unwrap();
    central
        .create_conference(&organizer(), &conference_form("Big London", "London", 800))
        .unwrap();

    let filters = vec![
        RawFilter::new("CITY", "EQ", "Paris"),
        RawFilter::new("MAX_ATTENDEES", "GT", "100"),
    ];
    let found = central.query_conferences(&filters).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Big Paris");

    // Ordered by the inequality field first
    let by_size = central
        .query_conferences(&[RawFilter::new("MAX_ATTENDEES", "GTEQ", "20")])
        .unwrap();
    let sizes: Vec<i64> = by_size.iter().map(|c| c.max_attendees).collect();
    assert_eq!(sizes, vec![20, 500, 800]);
}

#[test]
fn test_query_conferences_rejects_bad_filters() {
    let central = ConferenceCentral::default();

    let two_fields = vec![
        RawFilter::new("MONTH", "GT", "3"),
        RawFilter::new("MAX_ATTENDEES", "LT", "10"),
    ];
    assert!(matches!(
        central.query_conferences(&two_fields),
        Err(ConferenceError::MultipleInequalityFields { .. })
    ));

    let unknown = vec![RawFilter::new("COLOR", "EQ", "red")];
    assert!(matches!(
        central.query_conferences(&unknown),
        Err(ConferenceError::InvalidFilter(_))
    ));

    let not_a_number = vec![RawFilter::new("MAX_ATTENDEES", "EQ", "many")];
    assert!(matches!(
        central.query_conferences(&not_a_number),
        Err(ConferenceError::BadRequest(_))
    ));
}

#[test]
fn test_query_conferences_by_topic_matches_any_element() {
    let central = ConferenceCentral::default();
    let form = ConferenceForm {
        topics: Some(vec!["Web".to_string(), "Systems".to_string()]),
        ..conference_form("RustConf", "Portland", 10)
    };
    central.create_conference(&organizer(), &form).unwrap();
    central
        .create_conference(&organizer(), &conference_form("Defaults", "Portland", 10))
        .unwrap();

    let found = central
        .query_conferences(&[RawFilter::new("TOPIC", "EQ", "Systems")])
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "RustConf");
}

// ============================================================================
// Sessions
// ============================================================================

#[test]
fn test_sessions_by_owner_only() {
    let central = ConferenceCentral::default();
    let conf = central
        .create_conference(&organizer(), &conference_form("RustConf", "Portland", 10))
        .unwrap();

    let form = session_form("Ownership", "Ferris", "lecture", "10:00");
    let err = central.create_session(&alice(), &conf.key, &form).unwrap_err();
    assert!(matches!(err, ConferenceError::Forbidden(_)));

    let session = central.create_session(&organizer(), &conf.key, &form).unwrap();
    assert_eq!(session.conference_belong_to, "RustConf");
    assert_eq!(session.conference_key(), Some(&conf.key));
}

#[test]
fn test_session_queries() {
    let central = ConferenceCentral::default();
    let conf = central
        .create_conference(&organizer(), &conference_form("RustConf", "Portland", 10))
        .unwrap();
    let other = central
        .create_conference(&organizer(), &conference_form("GopherCon", "Denver", 10))
        .unwrap();

    central
        .create_session(&organizer(), &conf.key, &session_form("Traits", "Ferris", "lecture", "09:00"))
        .unwrap();
    central
        .create_session(&organizer(), &conf.key, &session_form("Async", "Alice", "workshop", "18:00"))
        .unwrap();
    central
        .create_session(&organizer(), &conf.key, &session_form("Keynote", "Bob", "keynote", "20:00"))
        .unwrap();
    central
        .create_session(&organizer(), &other.key, &session_form("Goroutines", "Ferris", "lecture", "11:00"))
        .unwrap();

    assert_eq!(
        names(&central.conference_sessions(&conf.key).unwrap()),
        vec!["Async", "Keynote", "Traits"]
    );
    assert_eq!(
        names(&central.conference_sessions_by_type(&conf.key, "workshop").unwrap()),
        vec!["Async"]
    );
    assert_eq!(
        names(&central.sessions_by_speaker("Ferris").unwrap()),
        vec!["Goroutines", "Traits"]
    );
    assert_eq!(central.all_sessions().len(), 4);

    // Not workshops, starting before 19:00, ordered by start time
    assert_eq!(
        names(&central.sessions_excluding_type_before("workshop", "19:00").unwrap()),
        vec!["Traits", "Goroutines"]
    );
    assert!(matches!(
        central.sessions_excluding_type_before("party", "19:00"),
        Err(ConferenceError::BadRequest(_))
    ));

    let long_lectures = central
        .query_sessions(&[
            RawFilter::new("TYPEOFSESSION", "EQ", "lecture"),
            RawFilter::new("DURATION", "GTEQ", "30"),
        ])
        .unwrap();
    assert_eq!(long_lectures.len(), 2);
}

#[test]
fn test_sessions_of_missing_conference_not_found() {
    let central = ConferenceCentral::default();
    let missing = EntityKey::profile("organizer").child(conference_central::Kind::Conference, 77);
    assert!(matches!(
        central.conference_sessions(&missing),
        Err(ConferenceError::NotFound(_))
    ));
}

#[test]
fn test_featured_speaker_recorded_on_second_session() {
    let central = ConferenceCentral::default();
    let conf = central
        .create_conference(&organizer(), &conference_form("RustConf", "Portland", 10))
        .unwrap();

    central
        .create_session(&organizer(), &conf.key, &session_form("Traits", "Ferris", "lecture", "09:00"))
        .unwrap();
    assert_eq!(central.featured_speaker(), "");

    central
        .create_session(&organizer(), &conf.key, &session_form("Macros", "Ferris", "workshop", "13:00"))
        .unwrap();
    assert_eq!(
        central.featured_speaker(),
        "Speaker Ferris has 2 sessions in this conference: Macros,Traits."
    );
}

// ============================================================================
// Wishlists
// ============================================================================

#[test]
fn test_wishlist_is_scoped_by_conference() {
    let central = ConferenceCentral::default();
    let conf = central
        .create_conference(&organizer(), &conference_form("RustConf", "Portland", 10))
        .unwrap();
    let other = central
        .create_conference(&organizer(), &conference_form("GopherCon", "Denver", 10))
        .unwrap();
    let traits = central
        .create_session(&organizer(), &conf.key, &session_form("Traits", "Ferris", "lecture", "09:00"))
        .unwrap();
    let goroutines = central
        .create_session(&organizer(), &other.key, &session_form("Goroutines", "Gopher", "lecture", "09:00"))
        .unwrap();

    let entry = central.add_to_wishlist(&alice(), &traits.key).unwrap();
    assert_eq!(entry.user_name, "Alice");
    assert_eq!(entry.session_name, "Traits");
    central.add_to_wishlist(&alice(), &goroutines.key).unwrap();

    let wished = central.wishlist_for_conference(&alice(), &conf.key).unwrap();
    assert_eq!(names(&wished), vec!["Traits"]);
    assert!(central
        .wishlist_for_conference(&organizer(), &conf.key)
        .unwrap()
        .is_empty());
}

#[test]
fn test_wishlist_unknown_session_not_found() {
    let central = ConferenceCentral::default();
    let conf = central
        .create_conference(&organizer(), &conference_form("RustConf", "Portland", 10))
        .unwrap();
    let missing = conf.key.child(conference_central::Kind::Session, 12345);

    let err = central.add_to_wishlist(&alice(), &missing).unwrap_err();
    assert!(matches!(err, ConferenceError::NotFound(ref msg) if msg.starts_with("No session found with key: ")));
}

// ============================================================================
// Discovery and announcements
// ============================================================================

#[test]
fn test_discover_by_date_and_keyword() {
    let central = ConferenceCentral::default();
    let form = ConferenceForm {
        start_date: Some("2024-05-01".to_string()),
        end_date: Some("2024-05-03".to_string()),
        description: Some("Systems programming".to_string()),
        ..conference_form("RustConf", "Portland", 10)
    };
    let conf = central.create_conference(&organizer(), &form).unwrap();
    central
        .create_conference(&organizer(), &conference_form("GopherCon", "Denver", 10))
        .unwrap();
    let talk = SessionForm {
        date: Some("2024-05-02".to_string()),
        highlights: Some("Pinning explained".to_string()),
        ..session_form("Async", "Alice", "lecture", "10:00")
    };
    central.create_session(&organizer(), &conf.key, &talk).unwrap();

    let on_day = central.discover_by_date("2024-05-02").unwrap();
    assert_eq!(on_day.conferences.len(), 1);
    assert_eq!(names(&on_day.sessions), vec!["Async"]);
    assert!(central.discover_by_date("2024-05-04").unwrap().conferences.is_empty());
    assert!(matches!(
        central.discover_by_date("May 2nd"),
        Err(ConferenceError::BadRequest(_))
    ));

    let found = central.discover_by_keyword("Pinning").unwrap();
    assert!(found.conferences.is_empty());
    assert_eq!(found.sessions.len(), 1);

    let found = central.discover_by_keyword("Systems").unwrap();
    assert_eq!(found.conferences.len(), 1);
    assert!(found.sessions.is_empty());

    assert!(matches!(
        central.discover_by_keyword(""),
        Err(ConferenceError::BadRequest(_))
    ));
}

#[test]
fn test_announcement_tracks_nearly_sold_out() {
    let central = ConferenceCentral::default();
    let conf = central
        .create_conference(&organizer(), &conference_form("Tiny", "Oslo", 6))
        .unwrap();
    central
        .create_conference(&organizer(), &conference_form("Huge", "Oslo", 600))
        .unwrap();

    assert_eq!(central.refresh_announcement().unwrap(), None);
    assert_eq!(central.announcement(), "");

    central.register(&alice(), &conf.key).unwrap();
    let announcement = central.refresh_announcement().unwrap().unwrap();
    assert!(announcement.ends_with("Tiny"));
    assert_eq!(central.announcement(), announcement);
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conference.jsonl");

    let conf_key = {
        let central = ConferenceCentral::new(EntityStore::open(&path).unwrap());
        let conf = central
            .create_conference(&organizer(), &conference_form("RustConf", "Portland", 10))
            .unwrap();
        central.register(&alice(), &conf.key).unwrap();
        conf.key
    };

    let central = ConferenceCentral::new(EntityStore::open(&path).unwrap());
    let conf = central.get_conference(&conf_key).unwrap();
    assert_eq!(conf.seats_available, 9);
    assert!(central.profile_for(&alice()).unwrap().is_attending(&conf_key));

    // Fresh ids never collide with loaded ones
    let second = central
        .create_conference(&organizer(), &conference_form("Second", "Portland", 10))
        .unwrap();
    assert_ne!(second.key, conf_key);
    assert_eq!(central.conferences_created(&organizer()).unwrap().len(), 2);
}

// ============================================================================
// HTTP API
// ============================================================================

const SECRET: &str = "integration-secret-key-that-is-at-least-32-chars";

fn app() -> (Router, Arc<JwtAuth>) {
    let auth = Arc::new(JwtAuth::new(SECRET).unwrap());
    let state = Arc::new(AppState::new(
        Arc::new(ConferenceCentral::default()),
        Arc::clone(&auth),
    ));
    (create_router(state), auth)
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_api_conference_lifecycle() {
    let (app, auth) = app();
    let org_token = auth.issue_token(&organizer()).unwrap();
    let alice_token = auth.issue_token(&alice()).unwrap();

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/conferences",
            Some(&org_token),
            Some(json!({"name": "RustConf", "city": "Portland", "maxAttendees": 2})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["seatsAvailable"], 2);
    assert_eq!(body["data"]["organizerDisplayName"], "Organizer");
    let key = body["data"]["websafeKey"].as_str().unwrap().to_string();

    let registration = format!("/api/conferences/{}/registration", key);
    let (status, body) = send(&app, request("POST", &registration, Some(&alice_token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["success"], true);

    let (status, body) = send(&app, request("POST", &registration, Some(&alice_token), None)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (status, body) = send(&app, request("GET", &format!("/api/conferences/{}", key), None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["seatsAvailable"], 1);

    let (status, body) = send(
        &app,
        request(
            "PUT",
            &format!("/api/conferences/{}", key),
            Some(&alice_token),
            Some(json!({"name": "Hijacked"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, body) = send(&app, request("GET", "/api/conferences/attending", Some(&alice_token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_api_query_errors_map_to_status() {
    let (app, _) = app();

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/conferences/query",
            None,
            Some(json!({"filters": [
                {"field": "MONTH", "operator": "GT", "value": "3"},
                {"field": "MAX_ATTENDEES", "operator": "LT", "value": "10"}
            ]})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MULTIPLE_INEQUALITY_FIELDS");

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/sessions/query",
            None,
            Some(json!({"filters": [{"field": "ROOM", "operator": "EQ", "value": "A"}]})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_FILTER");

    let (status, _) = send(&app, request("GET", "/api/conferences/not-a-key", None, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_api_concurrent_registrations() {
    let (app, auth) = app();
    let org_token = auth.issue_token(&organizer()).unwrap();

    let (_, body) = send(
        &app,
        request(
            "POST",
            "/api/conferences",
            Some(&org_token),
            Some(json!({"name": "Small", "maxAttendees": 3})),
        ),
    )
    .await;
    let key = body["data"]["websafeKey"].as_str().unwrap().to_string();
    let registration = format!("/api/conferences/{}/registration", key);

    let requests = (0..6).map(|n| {
        let user = UserIdentity::new(format!("user-{}", n), "user@example.com", format!("User {}", n));
        let token = auth.issue_token(&user).unwrap();
        let req = request("POST", &registration, Some(&token), None);
        let app = app.clone();
        async move { send(&app, req).await.0 }
    });
    let statuses = join_all(requests).await;

    let ok = statuses.iter().filter(|s| **s == StatusCode::OK).count();
    let conflict = statuses.iter().filter(|s| **s == StatusCode::CONFLICT).count();
    assert_eq!(ok, 3);
    assert_eq!(conflict, 3);

    let (_, body) = send(&app, request("GET", &format!("/api/conferences/{}", key), None, None)).await;
    assert_eq!(body["data"]["seatsAvailable"], 0);
}

//! HTTP server setup with Axum

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use super::rest::{announcements, conferences, discovery, profile, sessions, wishlist};
use super::AppState;

/// Create the Axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration - allow all origins for development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Conferences
        .route("/api/conferences", post(conferences::create_conference))
        .route("/api/conferences/query", post(conferences::query_conferences))
        .route("/api/conferences/created", get(conferences::conferences_created))
        .route("/api/conferences/attending", get(conferences::conferences_attending))
        .route(
            "/api/conferences/:key",
            get(conferences::get_conference).put(conferences::update_conference),
        )
        .route(
            "/api/conferences/:key/registration",
            post(conferences::register).delete(conferences::unregister),
        )
        .route(
            "/api/conferences/:key/sessions",
            get(sessions::conference_sessions).post(sessions::create_session),
        )
        .route("/api/conferences/:key/wishlist", get(wishlist::conference_wishlist))
        // Sessions
        .route("/api/sessions", get(sessions::all_sessions))
        .route("/api/sessions/query", post(sessions::query_sessions))
        .route("/api/sessions/speaker/:speaker", get(sessions::sessions_by_speaker))
        .route("/api/sessions/before", get(sessions::sessions_before))
        .route("/api/sessions/:key/wishlist", post(wishlist::add_to_wishlist))
        // Profile
        .route("/api/profile", get(profile::get_profile).post(profile::save_profile))
        // Announcements
        .route("/api/announcement", get(announcements::get_announcement))
        .route("/api/announcement/refresh", post(announcements::refresh_announcement))
        .route("/api/featured-speaker", get(announcements::featured_speaker))
        // Discovery
        .route("/api/discover/date/:date", get(discovery::by_date))
        .route("/api/discover/keyword", get(discovery::by_keyword))
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

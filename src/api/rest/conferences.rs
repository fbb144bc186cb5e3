//! Conference and registration endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::{path_key, ApiResponse, ApiResult, QueryRequest};
use crate::api::extract::CurrentUser;
use crate::api::AppState;
use crate::central::RegistrationOutcome;
use crate::error::ConferenceError;
use crate::types::ConferenceForm;

/// POST /api/conferences - Create a conference organized by the caller
pub async fn create_conference(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(form): Json<ConferenceForm>,
) -> Result<(StatusCode, Json<ApiResponse<ConferenceForm>>), ConferenceError> {
    let conference = state.central.create_conference(&user, &form)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(state.central.conference_form(&conference))),
    ))
}

/// POST /api/conferences/query - Query conferences with filters
pub async fn query_conferences(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> ApiResult<Vec<ConferenceForm>> {
    let conferences = state.central.query_conferences(&request.filters)?;
    Ok(Json(ApiResponse::list(state.central.conference_forms(&conferences))))
}

/// GET /api/conferences/created - Conferences organized by the caller
pub async fn conferences_created(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Vec<ConferenceForm>> {
    let conferences = state.central.conferences_created(&user)?;
    Ok(Json(ApiResponse::list(state.central.conference_forms(&conferences))))
}

/// GET /api/conferences/attending - Conferences the caller registered for
pub async fn conferences_attending(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Vec<ConferenceForm>> {
    let conferences = state.central.conferences_attending(&user)?;
    Ok(Json(ApiResponse::list(state.central.conference_forms(&conferences))))
}

/// GET /api/conferences/:key
pub async fn get_conference(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> ApiResult<ConferenceForm> {
    let conference = state.central.get_conference(&path_key(&key)?)?;
    Ok(Json(ApiResponse::new(state.central.conference_form(&conference))))
}

/// PUT /api/conferences/:key - Update a conference (organizer only)
pub async fn update_conference(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(key): Path<String>,
    Json(form): Json<ConferenceForm>,
) -> ApiResult<ConferenceForm> {
    let conference = state.central.update_conference(&user, &path_key(&key)?, &form)?;
    Ok(Json(ApiResponse::new(state.central.conference_form(&conference))))
}

/// POST /api/conferences/:key/registration
pub async fn register(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(key): Path<String>,
) -> ApiResult<RegistrationOutcome> {
    let outcome = state.central.register(&user, &path_key(&key)?)?;
    Ok(Json(ApiResponse::new(outcome)))
}

/// DELETE /api/conferences/:key/registration
pub async fn unregister(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(key): Path<String>,
) -> ApiResult<RegistrationOutcome> {
    let outcome = state.central.unregister(&user, &path_key(&key)?)?;
    Ok(Json(ApiResponse::new(outcome)))
}

//! Session endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::{path_key, ApiResponse, ApiResult, QueryRequest};
use crate::api::extract::CurrentUser;
use crate::api::AppState;
use crate::error::ConferenceError;
use crate::types::{Session, SessionForm};

/// Query parameters for listing a conference's sessions
#[derive(Debug, Deserialize)]
pub struct SessionTypeParams {
    /// Only sessions of this type
    #[serde(rename = "type")]
    pub type_of_session: Option<String>,
}

/// Query parameters for the "not type X, before T" listing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeforeParams {
    pub exclude_type: String,
    pub start_time: String,
}

fn forms(sessions: Vec<Session>) -> Vec<SessionForm> {
    sessions.iter().map(SessionForm::from).collect()
}

/// GET /api/conferences/:key/sessions
pub async fn conference_sessions(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Query(params): Query<SessionTypeParams>,
) -> ApiResult<Vec<SessionForm>> {
    let key = path_key(&key)?;
    let sessions = match params.type_of_session.as_deref().map(str::trim) {
        Some(kind) if !kind.is_empty() => state.central.conference_sessions_by_type(&key, kind)?,
        _ => state.central.conference_sessions(&key)?,
    };
    Ok(Json(ApiResponse::list(forms(sessions))))
}

/// POST /api/conferences/:key/sessions - Create a session (organizer only)
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(key): Path<String>,
    Json(form): Json<SessionForm>,
) -> Result<(StatusCode, Json<ApiResponse<SessionForm>>), ConferenceError> {
    let session = state.central.create_session(&user, &path_key(&key)?, &form)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(SessionForm::from(&session)))))
}

/// GET /api/sessions
pub async fn all_sessions(State(state): State<Arc<AppState>>) -> ApiResult<Vec<SessionForm>> {
    Ok(Json(ApiResponse::list(forms(state.central.all_sessions()))))
}

/// POST /api/sessions/query - Query sessions with filters
pub async fn query_sessions(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> ApiResult<Vec<SessionForm>> {
    let sessions = state.central.query_sessions(&request.filters)?;
    Ok(Json(ApiResponse::list(forms(sessions))))
}

/// GET /api/sessions/speaker/:speaker
pub async fn sessions_by_speaker(
    State(state): State<Arc<AppState>>,
    Path(speaker): Path<String>,
) -> ApiResult<Vec<SessionForm>> {
    let sessions = state.central.sessions_by_speaker(&speaker)?;
    Ok(Json(ApiResponse::list(forms(sessions))))
}

/// GET /api/sessions/before?excludeType=&startTime=
pub async fn sessions_before(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BeforeParams>,
) -> ApiResult<Vec<SessionForm>> {
    let sessions = state
        .central
        .sessions_excluding_type_before(&params.exclude_type, &params.start_time)?;
    Ok(Json(ApiResponse::list(forms(sessions))))
}

//! Discovery endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{ApiResponse, ApiResult};
use crate::api::AppState;
use crate::central::Discovered;
use crate::types::{ConferencesAndSessions, SessionForm};

/// Query parameters for keyword discovery
#[derive(Debug, Deserialize)]
pub struct KeywordParams {
    #[serde(default)]
    pub q: String,
}

fn to_forms(state: &AppState, found: Discovered) -> ConferencesAndSessions {
    ConferencesAndSessions {
        conferences: state.central.conference_forms(&found.conferences),
        sessions: found.sessions.iter().map(SessionForm::from).collect(),
    }
}

/// GET /api/discover/date/:date - Conferences running and sessions held on a date
pub async fn by_date(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> ApiResult<ConferencesAndSessions> {
    let found = state.central.discover_by_date(&date)?;
    Ok(Json(ApiResponse::new(to_forms(&state, found))))
}

/// GET /api/discover/keyword?q= - Substring search over conferences and sessions
pub async fn by_keyword(
    State(state): State<Arc<AppState>>,
    Query(params): Query<KeywordParams>,
) -> ApiResult<ConferencesAndSessions> {
    let found = state.central.discover_by_keyword(&params.q)?;
    Ok(Json(ApiResponse::new(to_forms(&state, found))))
}

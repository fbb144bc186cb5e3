//! Announcement endpoints

use std::sync::Arc;

use axum::{extract::State, Json};

use super::{ApiResponse, ApiResult};
use crate::api::AppState;

/// GET /api/announcement - Current nearly-sold-out announcement ("" if none)
pub async fn get_announcement(State(state): State<Arc<AppState>>) -> ApiResult<String> {
    Ok(Json(ApiResponse::new(state.central.announcement())))
}

/// POST /api/announcement/refresh - Recompute the announcement now
pub async fn refresh_announcement(State(state): State<Arc<AppState>>) -> ApiResult<String> {
    let announcement = state.central.refresh_announcement()?;
    Ok(Json(ApiResponse::new(announcement.unwrap_or_default())))
}

/// GET /api/featured-speaker
pub async fn featured_speaker(State(state): State<Arc<AppState>>) -> ApiResult<String> {
    Ok(Json(ApiResponse::new(state.central.featured_speaker())))
}

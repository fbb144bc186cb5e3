//! Profile endpoints

use std::sync::Arc;

use axum::{extract::State, Json};

use super::{ApiResponse, ApiResult};
use crate::api::extract::CurrentUser;
use crate::api::AppState;
use crate::types::{ProfileForm, ProfileMiniForm};

/// GET /api/profile - The caller's profile, created on first access
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<ProfileForm> {
    let profile = state.central.profile_for(&user)?;
    Ok(Json(ApiResponse::new(ProfileForm::from(&profile))))
}

/// POST /api/profile - Update display name and t-shirt size
pub async fn save_profile(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(form): Json<ProfileMiniForm>,
) -> ApiResult<ProfileForm> {
    let profile = state.central.save_profile(&user, &form)?;
    Ok(Json(ApiResponse::new(ProfileForm::from(&profile))))
}

//! Wishlist endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use super::{path_key, ApiResponse, ApiResult};
use crate::api::extract::CurrentUser;
use crate::api::AppState;
use crate::types::{SessionForm, WishlistForm};

/// POST /api/sessions/:key/wishlist
pub async fn add_to_wishlist(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(key): Path<String>,
) -> ApiResult<WishlistForm> {
    let entry = state.central.add_to_wishlist(&user, &path_key(&key)?)?;
    Ok(Json(ApiResponse::new(WishlistForm::from(&entry))))
}

/// GET /api/conferences/:key/wishlist
pub async fn conference_wishlist(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(key): Path<String>,
) -> ApiResult<Vec<SessionForm>> {
    let sessions = state.central.wishlist_for_conference(&user, &path_key(&key)?)?;
    Ok(Json(ApiResponse::list(sessions.iter().map(SessionForm::from).collect())))
}

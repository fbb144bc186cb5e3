//! Request extractors

use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use super::AppState;
use crate::auth::{AuthError, UserIdentity};
use crate::error::ConferenceError;

/// The caller identified by the `Authorization: Bearer` header
///
/// Rejects with 401 when the header is missing or the token is invalid.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserIdentity);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ConferenceError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingToken)?;

        let identity = state.auth.validate_authorization(header)?;
        Ok(CurrentUser(identity))
    }
}

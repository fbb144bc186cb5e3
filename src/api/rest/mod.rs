//! REST API module for HTTP endpoints
//!
//! Every handler answers with an [`ApiResponse`] envelope or, on failure, an
//! [`ApiError`] body whose status follows the error kind.

pub mod announcements;
pub mod conferences;
pub mod discovery;
pub mod profile;
pub mod sessions;
pub mod wishlist;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::ConferenceError;
use crate::query::RawFilter;
use crate::types::EntityKey;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Total count (for list responses)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data, total: None }
    }

    pub fn with_total(data: T, total: usize) -> Self {
        Self {
            data,
            total: Some(total),
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// Wrap a list, reporting its length as the total
    pub fn list(data: Vec<T>) -> Self {
        let total = data.len();
        Self::with_total(data, total)
    }
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl From<&ConferenceError> for ApiError {
    fn from(e: &ConferenceError) -> Self {
        Self {
            error: e.to_string(),
            code: e.code().to_string(),
        }
    }
}

/// HTTP status for each error kind
pub fn status_for(e: &ConferenceError) -> StatusCode {
    match e {
        ConferenceError::NotFound(_) => StatusCode::NOT_FOUND,
        ConferenceError::Conflict(_) => StatusCode::CONFLICT,
        ConferenceError::InvalidFilter(_)
        | ConferenceError::MultipleInequalityFields { .. }
        | ConferenceError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ConferenceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        ConferenceError::Forbidden(_) => StatusCode::FORBIDDEN,
        ConferenceError::Transaction(_) | ConferenceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ConferenceError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (status, Json(ApiError::from(&self))).into_response()
    }
}

/// Result type of every handler
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ConferenceError>;

/// Body of the filter query endpoints
#[derive(Debug, Default, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub filters: Vec<RawFilter>,
}

/// Parse a key taken from the URL path
pub(crate) fn path_key(raw: &str) -> Result<EntityKey, ConferenceError> {
    EntityKey::from_websafe(raw)
}

//! HTTP API for Conference Central
//!
//! JSON endpoints over the conference services, authenticated with bearer
//! tokens where an operation acts on behalf of a user.

pub mod extract;
pub mod http;
pub mod rest;

use std::sync::Arc;

use crate::auth::JwtAuth;
use crate::central::ConferenceCentral;

/// Shared application state for all handlers
pub struct AppState {
    pub central: Arc<ConferenceCentral>,
    pub auth: Arc<JwtAuth>,
}

impl AppState {
    pub fn new(central: Arc<ConferenceCentral>, auth: Arc<JwtAuth>) -> Self {
        Self { central, auth }
    }
}

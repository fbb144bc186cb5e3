//! Error taxonomy shared by the store, the query layer and the services

use thiserror::Error;

/// Result type for conference operations
pub type ConferenceResult<T> = Result<T, ConferenceError>;

/// Errors surfaced by every conference operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConferenceError {
    /// A referenced key does not resolve to an entity
    #[error("{0}")]
    NotFound(String),

    /// A state precondition was violated (duplicate registration, no seats,
    /// concurrent transaction collision)
    #[error("{0}")]
    Conflict(String),

    /// Unknown filter field or operator
    #[error("Filter contains invalid field or operator: {0}")]
    InvalidFilter(String),

    /// A second inequality field appeared in one query
    #[error("Inequality filter is allowed on only one field (got '{first}' and '{second}')")]
    MultipleInequalityFields { first: String, second: String },

    /// Malformed scalar input (number, date, time, key, required field)
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    /// The transaction touched more entity groups than it was allowed to
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Snapshot persistence failed
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ConferenceError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    /// Stable machine-readable code used by the HTTP layer
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::InvalidFilter(_) => "INVALID_FILTER",
            Self::MultipleInequalityFields { .. } => "MULTIPLE_INEQUALITY_FIELDS",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Transaction(_) => "TRANSACTION_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }
}

impl From<crate::utils::atomic::AtomicError> for ConferenceError {
    fn from(e: crate::utils::atomic::AtomicError) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for ConferenceError {
    fn from(e: serde_json::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<std::io::Error> for ConferenceError {
    fn from(e: std::io::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

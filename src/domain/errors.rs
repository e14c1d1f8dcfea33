//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.

use std::fmt;

#[derive(Debug)]
pub enum DomainError {
    /// Resource not found
    NotFound,
    /// Validation error with message
    Validation(String),
    /// State conflict (duplicate slug, immutable record, ...)
    Conflict(String),
    /// Credentials or OAuth state rejected
    Unauthorized(String),
    /// A third-party integration is missing credentials or a connection
    NotConfigured(String),
    /// Database/persistence error
    Database(String),
    /// External service error
    External(String),
    /// Generic internal error
    Internal(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::NotFound => write!(f, "Resource not found"),
            DomainError::Validation(msg) => write!(f, "Validation error: {}", msg),
            DomainError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            DomainError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            DomainError::NotConfigured(msg) => write!(f, "Not configured: {}", msg),
            DomainError::Database(msg) => write!(f, "Database error: {}", msg),
            DomainError::External(msg) => write!(f, "External service error: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

// Conversion from SeaORM errors (used in infrastructure layer)
impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Database(e.to_string())
    }
}

impl From<reqwest::Error> for DomainError {
    fn from(e: reqwest::Error) -> Self {
        DomainError::External(e.to_string())
    }
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    pub fn external(msg: impl Into<String>) -> Self {
        DomainError::External(msg.into())
    }
}

//! Typed failures returned by the domain services.
//!
//! Business-rule failures carry a human readable message that is shown to
//! the caller as-is. Infrastructure failures are wrapped in `Internal` and
//! only ever surface as a generic error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// Entity is absent, or the caller is not allowed to see it
    #[error("{entity} matching query does not exist")]
    NotFound { entity: &'static str },

    /// Business-rule violation
    #[error("{0}")]
    Conflict(String),

    /// The occurrence has no free places left
    #[error("{0}")]
    CapacityExceeded(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl DomainError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        Self::Internal(err.into())
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

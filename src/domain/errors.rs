//! Domain errors for the Tasklane backend.

use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors that can occur in the Tasklane system.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Task not found: {0}")]
    TaskNotFound(Uuid),

    #[error("Email already registered: {0}")]
    EmailAlreadyRegistered(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Credential hashing error: {0}")]
    CredentialError(String),

    #[error("Token issuing error: {0}")]
    TokenError(String),
}

impl DomainError {
    /// Whether the error stems from infrastructure and must not leak to callers.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::DatabaseError(_)
                | Self::CacheError(_)
                | Self::SerializationError(_)
                | Self::CredentialError(_)
                | Self::TokenError(_)
        )
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

impl From<redis::RedisError> for DomainError {
    fn from(err: redis::RedisError) -> Self {
        DomainError::CacheError(err.to_string())
    }
}

impl From<deadpool_redis::PoolError> for DomainError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        DomainError::CacheError(err.to_string())
    }
}

use thiserror::Error;

/// Error taxonomy shared by every workflow operation.
///
/// `Validation` and `Conflict` are caller-fixable, `Authorization` is fatal
/// to the attempted action, `Transient` is safe to retry. Retries are the
/// caller's responsibility; no operation retries internally.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found")]
    NotFound,

    #[error("Transient error: {0}")]
    Transient(String),

    #[error("Cache error: {0}")]
    Cache(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Whether the caller may retry the operation unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Transient(_))
    }
}

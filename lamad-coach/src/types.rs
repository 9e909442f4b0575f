//! Error and result types for the coach.

use crate::store::StoreError;

/// Error types for the coach pipeline.
///
/// Only `InvalidQuery` ever reaches a pipeline caller; the other variants
/// are produced inside stages and recovered there.
#[derive(Debug, thiserror::Error)]
pub enum CoachError {
    /// Query text was empty
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Completion capability failed or returned unusable output
    #[error("Capability error: {0}")]
    CapabilityError(String),

    /// Content store unavailable
    #[error("Retrieval error: {0}")]
    RetrievalError(StoreError),

    /// Record could not be written
    #[error("Persistence error: {0}")]
    PersistenceError(StoreError),

    /// Configuration could not be parsed
    #[error("Config error: {0}")]
    ConfigError(#[from] serde_yaml::Error),
}

impl From<lamad_agent::ServiceError> for CoachError {
    fn from(e: lamad_agent::ServiceError) -> Self {
        CoachError::CapabilityError(e.to_string())
    }
}

impl From<serde_json::Error> for CoachError {
    fn from(e: serde_json::Error) -> Self {
        CoachError::CapabilityError(format!("invalid JSON: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, CoachError>;

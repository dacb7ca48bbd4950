//! Persistence error types.

use domain::models::RecordId;
use thiserror::Error;

use crate::record::RecordKind;

/// Errors returned by stores and gateways.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Rejected before any backend call.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("{kind} not found: {id}")]
    NotFound { kind: RecordKind, id: RecordId },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote store error ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Invalid response from remote store: {0}")]
    InvalidResponse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),
}

impl StoreError {
    pub fn not_found(kind: RecordKind, id: &RecordId) -> Self {
        StoreError::NotFound {
            kind,
            id: id.clone(),
        }
    }

    /// True for failures that happened before reaching any backend.
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }
}

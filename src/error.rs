//! Error taxonomy

use crate::models::{EntityId, EntityKind};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("Remote error: HTTP {status}")]
    Remote { status: u16 },

    #[error("Not found: {kind} with id {id}")]
    NotFound { kind: EntityKind, id: EntityId },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Malformed response: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Decode(err.to_string())
    }
}

impl From<ureq::Error> for CatalogError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(status) => CatalogError::Remote { status },
            other => CatalogError::Transport(other.to_string()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage encoding error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Storage quota exceeded")]
    QuotaExceeded,
}

/// Outcome of a write whose failure is intentionally ignored by callers
pub type BestEffort = Result<(), StorageError>;

use thiserror::Error;

use dispo_core::DomainError;
use dispo_import::ImportErrors;

use crate::document_store::StoreError;

/// Error returned by every service operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Rejected by a domain rule; nothing was written.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// An uploaded workbook failed validation; nothing was written.
    #[error(transparent)]
    Import(#[from] ImportErrors),

    /// Persistence failed.
    #[error(transparent)]
    Store(StoreError),

    /// The write succeeded but journaling did not (strict journal only).
    #[error("journal append failed after write: {0}")]
    Journal(String),
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Concurrency(msg) => ServiceError::Domain(DomainError::conflict(msg)),
            other => ServiceError::Store(other),
        }
    }
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::Domain(e) if e.is_not_found())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ServiceError::Domain(e) if e.is_validation())
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ServiceError::Domain(DomainError::Conflict(_)))
    }

    /// Human readable rejection reason for domain errors.
    pub fn reason(&self) -> Option<&str> {
        match self {
            ServiceError::Domain(e) => Some(e.reason()),
            _ => None,
        }
    }
}

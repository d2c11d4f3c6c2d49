//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// missing inventory, duplicate keys). Storage failures belong to the infra
/// layer. Every variant carries the human-readable reason shown to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input was malformed or violates a business rule.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The requested inventory item, company or material does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A unique key is already taken, or a conditional replace lost a race.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// The reason string without the category prefix.
    pub fn reason(&self) -> &str {
        match self {
            DomainError::Validation(msg)
            | DomainError::InvalidId(msg)
            | DomainError::NotFound(msg)
            | DomainError::Conflict(msg) => msg,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, DomainError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_category_and_reason() {
        let err = DomainError::not_found("No inventory available");
        assert_eq!(err.to_string(), "not found: No inventory available");
        assert_eq!(err.reason(), "No inventory available");
        assert!(err.is_not_found());
    }

    #[test]
    fn validation_is_distinct_from_not_found() {
        let err = DomainError::validation("Can not repair more than damaged");
        assert!(err.is_validation());
        assert!(!err.is_not_found());
    }
}

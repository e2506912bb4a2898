//! Domain-level errors.
//!
//! These errors represent business rule violations and domain logic failures.
//! They are independent of infrastructure concerns (database, job runner).

use thiserror::Error;
use uuid::Uuid;

/// Domain-specific errors for business rule violations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Validation failed for a field or input
    #[error("Validation error: {0}")]
    Validation(String),

    /// A categorization rule cannot be used as configured
    #[error("Rule configuration error: {0}")]
    RuleConfiguration(String),

    /// A stored record violates a data invariant (e.g. non-positive goal target)
    #[error("Invalid {entity} {id}: {reason}")]
    Integrity {
        entity: &'static str,
        id: Uuid,
        reason: String,
    },

    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal domain error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    /// Create a rule configuration error
    pub fn rule_configuration(msg: impl Into<String>) -> Self {
        DomainError::RuleConfiguration(msg.into())
    }

    /// Create a data integrity error for a stored record
    pub fn integrity(entity: &'static str, id: Uuid, reason: impl Into<String>) -> Self {
        DomainError::Integrity {
            entity,
            id,
            reason: reason.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>) -> Self {
        DomainError::NotFound(entity.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        DomainError::Internal(msg.into())
    }

    /// Check if this is a data integrity error
    pub fn is_integrity(&self) -> bool {
        matches!(self, DomainError::Integrity { .. })
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrity_display() {
        let id = Uuid::nil();
        let err = DomainError::integrity("savings goal", id, "target amount must be positive");
        assert_eq!(
            err.to_string(),
            format!("Invalid savings goal {}: target amount must be positive", id)
        );
        assert!(err.is_integrity());
    }

    #[test]
    fn test_rule_configuration_is_not_integrity() {
        let err = DomainError::rule_configuration("bad pattern");
        assert!(!err.is_integrity());
        assert_eq!(err.to_string(), "Rule configuration error: bad pattern");
    }
}

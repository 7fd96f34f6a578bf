//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// The event kind has no default action; it must never reach a policy
    #[error("No default action defined for {kind} events")]
    NoDefaultAction { kind: String },

    /// Invalid entity identifier
    #[error("Invalid entity id: {0}")]
    InvalidEntityId(String),

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl DomainError {
    /// Create a no-default-action error for the given event kind
    pub fn no_default_action(kind: impl Into<String>) -> Self {
        Self::NoDefaultAction { kind: kind.into() }
    }
}

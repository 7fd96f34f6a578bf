//! Application-level errors

use domain::DomainError;
use thiserror::Error;

use crate::ports::QueueError;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Time-bounded queue rejected an item
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// A configuration parameter has an invalid value
    #[error("Invalid parameter {key}: {reason}")]
    InvalidParameter { key: String, reason: String },

    /// Configuration could not be read
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No exploration policy with this name exists
    #[error("Unknown explore policy: {0}")]
    UnknownPolicy(String),

    /// An internal contract was broken; callers must treat this as fatal
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// No async runtime is available to host background tasks
    #[error("Runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    /// The engine stopped after a fatal error
    #[error("Engine failed: {0}")]
    EngineFailed(String),

    /// The engine has been shut down
    #[error("Engine is shut down")]
    EngineStopped,

    /// History storage error
    #[error("History storage error: {0}")]
    Storage(String),
}

impl ApplicationError {
    /// Create an invalid parameter error
    pub fn invalid_parameter(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Whether the caller must stop using the engine after this error
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Domain(_)
                | Self::Queue(_)
                | Self::InvariantViolation(_)
                | Self::EngineFailed(_)
                | Self::EngineStopped
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn invalid_parameter_message() {
        let err = ApplicationError::invalid_parameter("faultActionProbability", "must be in [0, 1]");
        assert_eq!(
            err.to_string(),
            "Invalid parameter faultActionProbability: must be in [0, 1]"
        );
    }

    #[test]
    fn domain_error_is_transparent() {
        let err: ApplicationError = DomainError::no_default_action("LogEvent").into();
        assert_eq!(err.to_string(), "No default action defined for LogEvent events");
        assert!(err.is_fatal());
    }

    #[test]
    fn queue_error_converts() {
        let err: ApplicationError = QueueError::InvalidBounds {
            min: Duration::from_millis(2),
            max: Duration::from_millis(1),
        }
        .into();
        assert!(matches!(err, ApplicationError::Queue(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn configuration_errors_are_recoverable() {
        assert!(!ApplicationError::invalid_parameter("k", "r").is_fatal());
        assert!(!ApplicationError::Configuration("x".to_string()).is_fatal());
        assert!(!ApplicationError::UnknownPolicy("dumb".to_string()).is_fatal());
    }
}

//! Error types for upload runs
//!
//! Only the errors here abort a run. Per-batch and per-row failures are
//! reported as events and counted instead.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::contacts::ContactsError;
use crate::mapping::MappingError;

/// Errors that stop an upload run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Bad input detected before any write
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration problem
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Contact file problem
    #[error(transparent)]
    Contacts(#[from] ContactsError),

    /// Column mapping problem
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// The initial token exchange failed
    #[error("Authentication failed")]
    Auth(#[source] ApiError),

    /// The target list could not be created or found
    #[error("List resolution failed")]
    ListResolution(#[source] ApiError),

    /// A read call needed before the run failed
    #[error("Provider API error")]
    Api(#[source] ApiError),
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

impl PipelineError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Validation(msg) => {
                format!("Invalid input: {msg}\n\nHint: Nothing was sent to the provider.")
            }
            PipelineError::Config(e) => e.user_message(),
            PipelineError::Contacts(e) => e.user_message(),
            PipelineError::Mapping(e) => e.user_message(),
            PipelineError::Auth(e) | PipelineError::Api(e) => e.user_message(),
            PipelineError::ListResolution(e) => {
                format!("{}\n\nHint: No contacts were uploaded.", e.user_message())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_sources_are_chained() {
        let err = PipelineError::Auth(ApiError::Auth("HTTP 400".to_string()));
        assert_eq!(err.to_string(), "Authentication failed");
        assert!(err.source().unwrap().to_string().contains("HTTP 400"));
        assert!(err.user_message().contains("Hint:"));
    }

    #[test]
    fn test_validation_message() {
        let err = PipelineError::validation("list name cannot be empty");
        assert!(err.to_string().contains("list name"));
        assert!(err.user_message().contains("Nothing was sent"));
    }

    #[test]
    fn test_from_mapping_error() {
        let err: PipelineError = MappingError::MissingEmailColumn.into();
        assert!(matches!(err, PipelineError::Mapping(_)));
        assert!(err.user_message().contains("--email-column"));
    }
}

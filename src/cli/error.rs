//! CLI error type

use std::path::PathBuf;
use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::contacts::ContactsError;
use crate::mapping::MappingError;
use crate::pipeline::PipelineError;

/// Errors surfaced by CLI commands
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to write file {0}: {1}")]
    FileWriteError(PathBuf, String),

    #[error("Terminal I/O error: {0}")]
    Io(String),

    #[error("Cancelled")]
    Cancelled,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Contacts(#[from] ContactsError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io(err.to_string())
    }
}

impl CliError {
    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            CliError::Config(e) => e.user_message(),
            CliError::Contacts(e) => e.user_message(),
            CliError::Mapping(e) => e.user_message(),
            CliError::Api(e) => e.user_message(),
            CliError::Pipeline(e) => e.user_message(),
            _ => self.to_string(),
        }
    }
}

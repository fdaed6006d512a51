//! Error types for configuration loading

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file {}: {message}", path.display())]
    Read { path: PathBuf, message: String },

    /// Config file is not valid TOML
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// One or more credentials are blank
    #[error("Missing credentials: {}", .0.join(", "))]
    MissingCredentials(Vec<String>),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            ConfigError::Read { path, message } => format!(
                "Cannot read config file {}: {message}\n\nHint: Check the --config path.",
                path.display()
            ),
            ConfigError::MissingCredentials(names) => format!(
                "Missing credentials: {}\n\nHint: Export them as environment variables, put them in a .env file, or add a [credentials] section to campaign-loader.toml.",
                names.join(", ")
            ),
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_display() {
        let err = ConfigError::MissingCredentials(vec![
            "ZOHO_CLIENT_ID".to_string(),
            "ZOHO_REFRESH_TOKEN".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Missing credentials: ZOHO_CLIENT_ID, ZOHO_REFRESH_TOKEN"
        );
        assert!(err.user_message().contains("Hint:"));
    }
}

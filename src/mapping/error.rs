//! Error types for column mapping

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building or loading a column mapping
#[derive(Error, Debug)]
pub enum MappingError {
    /// No email column was chosen or detected
    #[error("No email column selected")]
    MissingEmailColumn,

    /// A slot or extra points at a column the file does not have
    #[error("{slot} is mapped to unknown column '{column}'")]
    UnknownColumn { slot: String, column: String },

    /// Two extras target the same provider field
    #[error("Provider field(s) mapped more than once: {}", .0.join(", "))]
    DuplicateTargets(Vec<String>),

    /// Mapping file could not be read
    #[error("Failed to read mapping file: {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Mapping file is not valid TOML or has a bad entry
    #[error("Failed to parse mapping: {0}")]
    Parse(String),
}

/// Result type for mapping operations
pub type MappingResult<T> = Result<T, MappingError>;

impl MappingError {
    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            MappingError::MissingEmailColumn => "No email column selected.\n\nHint: Pass --email-column or name a column 'Email' / 'Work Email'.".to_string(),
            MappingError::UnknownColumn { slot, column } => format!(
                "{slot} is mapped to '{column}', which is not a column in the CSV.\n\nHint: Run 'campaign-loader preview' to list the columns."
            ),
            MappingError::DuplicateTargets(fields) => format!(
                "Provider field(s) mapped more than once: {}\n\nHint: Each extra field can only be filled from one column.",
                fields.join(", ")
            ),
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MappingError::DuplicateTargets(vec!["Company".to_string(), "Phone".to_string()]);
        assert_eq!(
            err.to_string(),
            "Provider field(s) mapped more than once: Company, Phone"
        );

        let err = MappingError::UnknownColumn {
            slot: "First Name".to_string(),
            column: "nombre".to_string(),
        };
        assert!(err.to_string().contains("nombre"));
        assert!(err.user_message().contains("Hint:"));
    }
}

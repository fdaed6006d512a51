//! Error types for contact input

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a contact file
#[derive(Error, Debug)]
pub enum ContactsError {
    /// File could not be opened or read
    #[error("Failed to read {}: {message}", path.display())]
    Read { path: PathBuf, message: String },

    /// Malformed CSV
    #[error("CSV parse error at record {record}: {message}")]
    Parse { record: u64, message: String },

    /// The file has no header row
    #[error("CSV has no header row")]
    MissingHeaders,
}

/// Result type for contact input operations
pub type ContactsResult<T> = Result<T, ContactsError>;

impl ContactsError {
    /// Get a user-friendly error message for CLI output
    pub fn user_message(&self) -> String {
        match self {
            ContactsError::Read { path, message } => format!(
                "Cannot read contact file {}: {message}\n\nHint: Check that the file exists and is readable.",
                path.display()
            ),
            ContactsError::MissingHeaders => {
                "The CSV file is empty or has no header row.\n\nHint: The first line must name the columns.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

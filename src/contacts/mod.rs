//! Contact input
//!
//! A contact export is read into a [`ContactTable`]: ordered headers plus
//! ordered rows. Every cell is trimmed text and a missing cell reads as "".

mod error;
mod reader;

use std::collections::HashMap;

pub use error::{ContactsError, ContactsResult};
pub use reader::{CsvReader, TextEncoding};

/// One input record, keyed by column name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactRow {
    values: HashMap<String, String>,
}

impl ContactRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from (column, value) pairs; values are trimmed
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.as_ref().trim().to_string()))
                .collect(),
        }
    }

    /// Cell value, or "" when the column is absent
    pub fn get(&self, column: &str) -> &str {
        self.values.get(column).map(String::as_str).unwrap_or("")
    }

    /// Cell value for an optional column binding
    pub fn get_opt(&self, column: Option<&str>) -> &str {
        column.map(|c| self.get(c)).unwrap_or("")
    }
}

/// Ordered headers plus ordered rows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactTable {
    pub headers: Vec<String>,
    pub rows: Vec<ContactRow>,
    /// Encoding the source was decoded with
    pub encoding: TextEncoding,
}

impl ContactTable {
    pub fn new(headers: Vec<String>, rows: Vec<ContactRow>) -> Self {
        Self {
            headers,
            rows,
            encoding: TextEncoding::Utf8,
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Trimmed values of `column` that look like email addresses, in row order
    pub fn valid_emails(&self, column: &str) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.get(column))
            .filter(|email| is_valid_email(email))
            .map(str::to_string)
            .collect()
    }
}

/// Whether a cell can be sent as an email address
///
/// The only check is non-empty after trimming and containing "@".
pub fn is_valid_email(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value.contains('@')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("  a@b  "));
        assert!(is_valid_email("@"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("   "));
        assert!(!is_valid_email("not-an-email"));
    }

    #[test]
    fn test_row_missing_column_reads_empty() {
        let row = ContactRow::from_pairs([("Email", "  a@b.com ")]);
        assert_eq!(row.get("Email"), "a@b.com");
        assert_eq!(row.get("Missing"), "");
        assert_eq!(row.get_opt(None), "");
        assert_eq!(row.get_opt(Some("Email")), "a@b.com");
    }

    #[test]
    fn test_valid_emails_preserve_order() {
        let table = ContactTable::new(
            vec!["Email".to_string()],
            vec![
                ContactRow::from_pairs([("Email", "x@y.com")]),
                ContactRow::from_pairs([("Email", "broken")]),
                ContactRow::from_pairs([("Email", "")]),
                ContactRow::from_pairs([("Email", " a@b.com")]),
            ],
        );
        assert_eq!(table.valid_emails("Email"), vec!["x@y.com", "a@b.com"]);
    }
}

//! CSV reader with encoding fallback

use std::collections::HashMap;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use encoding_rs::WINDOWS_1252;

use super::{ContactRow, ContactTable, ContactsError, ContactsResult};

/// Text encoding a file was decoded with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextEncoding {
    #[default]
    Utf8,
    /// Latin-1 superset used when the bytes are not valid UTF-8
    Windows1252,
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextEncoding::Utf8 => write!(f, "UTF-8"),
            TextEncoding::Windows1252 => write!(f, "Latin-1"),
        }
    }
}

/// Reads contact exports into a [`ContactTable`]
#[derive(Debug, Clone)]
pub struct CsvReader {
    delimiter: u8,
}

impl Default for CsvReader {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Read a CSV file
    pub fn read_path(&self, path: &Path) -> ContactsResult<ContactTable> {
        let bytes = std::fs::read(path).map_err(|e| ContactsError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let table = self.read_bytes(&bytes)?;
        tracing::info!(
            path = %path.display(),
            rows = table.len(),
            columns = table.headers.len(),
            encoding = %table.encoding,
            "Read contact file"
        );
        Ok(table)
    }

    /// Parse raw CSV bytes, trying UTF-8 before Latin-1
    pub fn read_bytes(&self, bytes: &[u8]) -> ContactsResult<ContactTable> {
        let (text, encoding) = decode(bytes);
        let mut table = self.read_str(&text)?;
        table.encoding = encoding;
        Ok(table)
    }

    /// Parse CSV text
    pub fn read_str(&self, text: &str) -> ContactsResult<ContactTable> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(text.as_bytes());

        let raw_headers = reader
            .headers()
            .map_err(|e| ContactsError::Parse {
                record: 0,
                message: e.to_string(),
            })?
            .clone();
        if raw_headers.is_empty() {
            return Err(ContactsError::MissingHeaders);
        }
        let headers = unique_headers(raw_headers.iter());

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| ContactsError::Parse {
                record: index as u64 + 1,
                message: e.to_string(),
            })?;
            let row = ContactRow::from_pairs(
                headers
                    .iter()
                    .enumerate()
                    .map(|(i, h)| (h.clone(), record.get(i).unwrap_or(""))),
            );
            rows.push(row);
        }

        Ok(ContactTable::new(headers, rows))
    }
}

fn decode(bytes: &[u8]) -> (String, TextEncoding) {
    match std::str::from_utf8(bytes) {
        Ok(text) => (text.to_string(), TextEncoding::Utf8),
        Err(_) => {
            tracing::debug!("Input is not valid UTF-8, decoding as Latin-1");
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            (text.into_owned(), TextEncoding::Windows1252)
        }
    }
}

/// Name blank headers by position and suffix repeated ones with `.N`
fn unique_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    raw.enumerate()
        .map(|(i, h)| {
            let base = if h.is_empty() {
                format!("column {}", i + 1)
            } else {
                h.to_string()
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{}.{}", base, count)
            };
            *count += 1;
            name
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_trims_and_fills_missing_cells() {
        let table = CsvReader::new()
            .read_str("Email , First Name,Last Name\n a@b.com ,Ann\nc@d.com,Bob,Lee\n")
            .unwrap();
        assert_eq!(table.headers, vec!["Email", "First Name", "Last Name"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].get("Email"), "a@b.com");
        assert_eq!(table.rows[0].get("Last Name"), "");
        assert_eq!(table.rows[1].get("Last Name"), "Lee");
    }

    #[test]
    fn test_strips_bom() {
        let table = CsvReader::new().read_str("\u{feff}email\nx@y.z\n").unwrap();
        assert_eq!(table.headers, vec!["email"]);
    }

    #[test]
    fn test_latin1_fallback() {
        // "Nombre\nJosé\n" with é as 0xE9
        let bytes = b"email,Nombre\nj@x.es,Jos\xe9\n";
        let table = CsvReader::new().read_bytes(bytes).unwrap();
        assert_eq!(table.encoding, TextEncoding::Windows1252);
        assert_eq!(table.rows[0].get("Nombre"), "José");
    }

    #[test]
    fn test_utf8_preferred() {
        let table = CsvReader::new()
            .read_bytes("email,name\nz@z.z,Zoë\n".as_bytes())
            .unwrap();
        assert_eq!(table.encoding, TextEncoding::Utf8);
        assert_eq!(table.rows[0].get("name"), "Zoë");
    }

    #[test]
    fn test_duplicate_and_blank_headers() {
        let table = CsvReader::new().read_str("email,,email\na@b,x,c@d\n").unwrap();
        assert_eq!(table.headers, vec!["email", "column 2", "email.1"]);
        assert_eq!(table.rows[0].get("email.1"), "c@d");
    }

    #[test]
    fn test_semicolon_delimiter() {
        let table = CsvReader::new()
            .with_delimiter(b';')
            .read_str("email;name\na@b.c;Al\n")
            .unwrap();
        assert_eq!(table.rows[0].get("name"), "Al");
    }

    #[test]
    fn test_empty_input_has_no_headers() {
        assert!(matches!(
            CsvReader::new().read_str(""),
            Err(ContactsError::MissingHeaders)
        ));
    }

    #[test]
    fn test_read_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Email,Name").unwrap();
        writeln!(file, "a@b.com,Ann").unwrap();
        let table = CsvReader::new().read_path(file.path()).unwrap();
        assert_eq!(table.len(), 1);

        let missing = CsvReader::new().read_path(Path::new("/nonexistent/contacts.csv"));
        assert!(matches!(missing, Err(ContactsError::Read { .. })));
    }
}

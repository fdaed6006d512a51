//! Preview command: inspect a contact file offline

use clap::Args;
use std::path::PathBuf;

use super::{parse_delimiter, read_table};
use crate::api::{FallbackReason, FieldCatalog};
use crate::cli::error::CliError;
use crate::cli::output::{format_draft, format_preview};
use crate::contacts::ContactTable;
use crate::mapping::{CONTACT_EMAIL, detect_mapping};

/// Arguments for the preview command
#[derive(Args, Debug, Clone)]
pub struct PreviewArgs {
    /// CSV file to inspect
    pub csv: PathBuf,

    /// Number of rows to show
    #[arg(long, short = 'n', default_value_t = 5)]
    pub rows: usize,

    /// Field delimiter
    #[arg(long, short = 'd', default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,
}

/// Preview text: table, detected mapping and valid email count
pub fn render_preview(table: &ContactTable, rows: usize) -> String {
    let draft = detect_mapping(&table.headers, &FieldCatalog::fallback(FallbackReason::Offline));
    let mut output = format_preview(table, rows);
    output.push_str("\nDetected mapping:\n");
    output.push_str(&format_draft(&draft));
    match &draft.email {
        Some(column) => output.push_str(&format!(
            "{} row(s) with a valid {}\n",
            table.valid_emails(column).len(),
            CONTACT_EMAIL
        )),
        None => output.push_str("No email column detected\n"),
    }
    output
}

/// Handle the preview command
pub fn handle_preview(args: &PreviewArgs) -> Result<(), CliError> {
    let table = read_table(&args.csv, args.delimiter)?;
    print!("{}", render_preview(&table, args.rows));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::CsvReader;

    #[test]
    fn test_render_preview() {
        let table = CsvReader::new()
            .with_delimiter(b';')
            .read_str("Email;Nombre\na@x.com;Ana\nbroken;Luis\n")
            .unwrap();
        let output = render_preview(&table, 5);
        assert!(output.contains("Email      <- Email"));
        assert!(output.contains("First Name <- Nombre"));
        assert!(output.contains("1 row(s) with a valid Contact Email"));
    }

    #[test]
    fn test_render_preview_without_email() {
        let table = CsvReader::new().read_str("name\nAna\n").unwrap();
        assert!(render_preview(&table, 5).contains("No email column detected"));
    }
}

//! CLI command implementations

pub mod fields;
pub mod interactive;
pub mod lists;
pub mod preview;
pub mod templates;
pub mod upload;

use std::path::Path;
use std::sync::Arc;

use super::error::CliError;
use super::progress::Spinner;
use crate::api::{CampaignsClient, HttpTransport};
use crate::auth::{TokenProvider, TokenSession};
use crate::config::LoaderConfig;
use crate::contacts::{ContactTable, CsvReader};

/// Authenticate and build a client, without fetching the field catalog
pub(crate) fn connect_client(
    config: &LoaderConfig,
) -> Result<(CampaignsClient, TokenSession), CliError> {
    config.validate()?;
    let transport = Arc::new(HttpTransport::new(config.endpoints.auth_scheme.clone())?);

    let spinner = Spinner::new("Authenticating...");
    let provider = TokenProvider::new(
        transport.clone(),
        &config.endpoints,
        config.credentials.clone(),
    )
    .with_timeout(config.upload.read_timeout());
    let session = TokenSession::start(provider);
    spinner.finish();

    let client = CampaignsClient::new(transport, &config.endpoints, &config.upload);
    Ok((client, session?))
}

/// Read a contact file
pub(crate) fn read_table(path: &Path, delimiter: u8) -> Result<ContactTable, CliError> {
    Ok(CsvReader::new().with_delimiter(delimiter).read_path(path)?)
}

/// Parse a one-character delimiter argument
pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "\\t" | "tab" => Ok(b'\t'),
        v if v.len() == 1 && v.is_ascii() => Ok(v.as_bytes()[0]),
        _ => Err(format!("delimiter must be a single ASCII character, got '{}'", value)),
    }
}

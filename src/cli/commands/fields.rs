//! Fields command implementation

use super::connect_client;
use crate::cli::error::CliError;
use crate::cli::output::format_catalog;
use crate::config::LoaderConfig;

/// Handle the fields command
pub fn handle_fields(config: &LoaderConfig) -> Result<(), CliError> {
    let (client, session) = connect_client(config)?;
    let catalog = client.field_catalog(session.token())?;
    print!("{}", format_catalog(&catalog));
    Ok(())
}

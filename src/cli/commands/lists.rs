//! Lists command implementation

use clap::Args;

use super::connect_client;
use crate::cli::error::CliError;
use crate::cli::output::format_lists;
use crate::config::LoaderConfig;

/// Arguments for the lists command
#[derive(Args, Debug, Clone)]
pub struct ListsArgs {
    /// 1-based index of the first list
    #[arg(long, default_value_t = 1)]
    pub start: u32,

    /// Number of lists to fetch
    #[arg(long, default_value_t = 200)]
    pub range: u32,
}

/// Handle the lists command
pub fn handle_lists(args: &ListsArgs, config: &LoaderConfig) -> Result<(), CliError> {
    if args.start == 0 || args.range == 0 {
        return Err(CliError::InvalidArgument(
            "--start and --range must be at least 1".to_string(),
        ));
    }
    let (client, session) = connect_client(config)?;
    let lists = client.list_all(session.token(), args.start, args.range)?;
    print!("{}", format_lists(&lists));
    Ok(())
}

//! campaign-loader: upload CSV contacts into Zoho Campaigns lists
//!
//! ```bash
//! campaign-loader upload contacts.csv --create "Spring leads"
//! campaign-loader upload contacts.csv --list-key 3z1 --extra "Company=Organisation"
//! campaign-loader upload contacts.csv --list-name Leads --dry-run
//! campaign-loader interactive
//! campaign-loader lists
//! ```
//!
//! Credentials are read from `ZOHO_CLIENT_ID`, `ZOHO_CLIENT_SECRET` and
//! `ZOHO_REFRESH_TOKEN` (a `.env` file is honoured) or from the config file.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use campaign_loader::cli::CliError;
use campaign_loader::cli::commands::fields::handle_fields;
use campaign_loader::cli::commands::interactive::{InteractiveArgs, handle_interactive};
use campaign_loader::cli::commands::lists::{ListsArgs, handle_lists};
use campaign_loader::cli::commands::preview::{PreviewArgs, handle_preview};
use campaign_loader::cli::commands::templates::{TemplatesArgs, handle_templates};
use campaign_loader::cli::commands::upload::{UploadArgs, handle_upload};
use campaign_loader::config::LoaderConfig;

#[derive(Parser, Debug)]
#[command(name = "campaign-loader", version)]
#[command(about = "Upload CSV contact exports into Zoho Campaigns mailing lists")]
struct Cli {
    /// Config file (defaults to campaign-loader.toml when present)
    #[arg(long, short = 'c', global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a CSV file to a new or existing list
    Upload(UploadArgs),
    /// Step-by-step upload with prompts
    Interactive(InteractiveArgs),
    /// Show mailing lists and their keys
    Lists(ListsArgs),
    /// Show the contact fields of the account
    Fields,
    /// List email templates or print one as HTML
    Templates(TemplatesArgs),
    /// Show a CSV file and the detected mapping, offline
    Preview(PreviewArgs),
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), CliError> {
    if let Command::Preview(args) = &cli.command {
        return handle_preview(args);
    }

    let config = LoaderConfig::load(cli.config.as_deref())?;
    match &cli.command {
        Command::Upload(args) => handle_upload(args, &config),
        Command::Interactive(args) => handle_interactive(args, &config),
        Command::Lists(args) => handle_lists(args, &config),
        Command::Fields => handle_fields(&config),
        Command::Templates(args) => handle_templates(args, &config),
        Command::Preview(args) => handle_preview(args),
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Cancelled) => {
            eprintln!("Cancelled.");
            ExitCode::from(130)
        }
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

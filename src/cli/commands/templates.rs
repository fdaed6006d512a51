//! Templates command implementation

use clap::Args;
use std::path::PathBuf;

use super::connect_client;
use crate::cli::error::CliError;
use crate::cli::output::format_templates;
use crate::config::LoaderConfig;

/// Arguments for the templates command
#[derive(Args, Debug, Clone)]
pub struct TemplatesArgs {
    /// Print the HTML of this template instead of listing
    #[arg(long, value_name = "ID")]
    pub id: Option<String>,

    /// Write the HTML to a file instead of stdout
    #[arg(long, short = 'o', value_name = "FILE", requires = "id")]
    pub output: Option<PathBuf>,

    /// 1-based index of the first template
    #[arg(long, default_value_t = 1)]
    pub start: u32,

    /// 1-based index of the last template, inclusive
    #[arg(long, default_value_t = 50)]
    pub end: u32,
}

/// Handle the templates command
pub fn handle_templates(args: &TemplatesArgs, config: &LoaderConfig) -> Result<(), CliError> {
    if args.start == 0 || args.end < args.start {
        return Err(CliError::InvalidArgument(format!(
            "invalid template range {}..{}",
            args.start, args.end
        )));
    }
    let (client, session) = connect_client(config)?;

    let Some(id) = &args.id else {
        let templates = client.list_templates(session.token(), args.start, args.end)?;
        print!("{}", format_templates(&templates));
        return Ok(());
    };

    let html = client.template_html(session.token(), id)?;
    if html.is_empty() {
        eprintln!("Template {} has no HTML content", id);
        return Ok(());
    }
    match &args.output {
        Some(path) => {
            std::fs::write(path, &html)
                .map_err(|e| CliError::FileWriteError(path.clone(), e.to_string()))?;
            eprintln!("Wrote {} byte(s) to {}", html.len(), path.display());
        }
        None => println!("{}", html),
    }
    Ok(())
}

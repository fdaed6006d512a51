//! Interactive upload wizard

use clap::Args;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use super::{parse_delimiter, read_table};
use crate::api::Visibility;
use crate::cli::error::CliError;
use crate::cli::output::{
    VISIBILITY_NOTE, format_draft, format_error_warning, format_lists, format_report_line,
};
use crate::cli::progress::BarSink;
use crate::cli::prompt::Prompter;
use crate::config::LoaderConfig;
use crate::contacts::ContactTable;
use crate::mapping::{ExtraFieldMapping, FieldMapping, MappingDraft, detect_mapping, save_mapping};
use crate::pipeline::{ListTarget, ProgressSink, UploadPipeline, UploadReport};

/// Arguments for the interactive command
#[derive(Args, Debug, Clone)]
pub struct InteractiveArgs {
    /// CSV file; asked for when omitted
    pub csv: Option<PathBuf>,

    /// Field delimiter
    #[arg(long, short = 'd', default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,

    /// Save the chosen mapping to this file
    #[arg(long, value_name = "FILE")]
    pub save_mapping: Option<PathBuf>,
}

/// Handle the interactive command
pub fn handle_interactive(args: &InteractiveArgs, config: &LoaderConfig) -> Result<(), CliError> {
    let stdin = std::io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), std::io::stderr());

    let csv = match &args.csv {
        Some(path) => path.clone(),
        None => PathBuf::from(prompter.ask_required("Path to the CSV file")?),
    };
    let table = read_table(&csv, args.delimiter)?;

    let mut pipeline = UploadPipeline::connect_http(config)?;
    let report = run_wizard(
        &mut prompter,
        &mut pipeline,
        &table,
        config.fixed_list_key(),
        args.save_mapping.as_deref(),
        &mut BarSink::new(),
    )?;

    report.print_summary();
    if let Some(warning) = format_error_warning(&report) {
        eprintln!("{}", warning);
    }
    eprintln!("{}", VISIBILITY_NOTE);
    println!("{}", format_report_line(&report));
    Ok(())
}

/// Walk the user through mapping, target and confirmation, then run
pub fn run_wizard<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    pipeline: &mut UploadPipeline,
    table: &ContactTable,
    fixed_list_key: Option<&str>,
    save_to: Option<&Path>,
    sink: &mut dyn ProgressSink,
) -> Result<UploadReport, CliError> {
    prompter.say(format!(
        "{} row(s). Columns: {}",
        table.len(),
        table.headers.join(", ")
    ))?;

    let mapping = choose_mapping(prompter, pipeline, table)?;
    if let Some(path) = save_to {
        save_mapping(path, &mapping.to_draft())?;
        prompter.say(format!("Mapping saved to {}", path.display()))?;
    }

    let target = choose_target(prompter, pipeline, fixed_list_key)?;

    let plan = pipeline.plan(table, &mapping, &target)?;
    prompter.say(format!(
        "{} valid email(s), {} row(s) skipped, {} bulk batch(es)",
        plan.valid_rows(),
        plan.skipped_rows,
        plan.batches.len()
    ))?;
    if !prompter.confirm("Start the upload?", true)? {
        return Err(CliError::Cancelled);
    }

    Ok(pipeline.run(table, &mapping, &target, sink)?)
}

fn choose_mapping<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    pipeline: &UploadPipeline,
    table: &ContactTable,
) -> Result<FieldMapping, CliError> {
    let mut draft = detect_mapping(&table.headers, pipeline.catalog());
    prompter.say("Detected mapping:")?;
    prompter.say(format_draft(&draft).trim_end())?;

    let mut edit = !prompter.confirm("Use this mapping?", true)?;
    loop {
        if edit {
            draft = edit_draft(prompter, pipeline, table, draft)?;
        }
        match draft.clone().validate(&table.headers) {
            Ok(mapping) => return Ok(mapping),
            Err(e) => {
                prompter.say(format!("  {}", e.user_message()))?;
                edit = true;
            }
        }
    }
}

fn edit_draft<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    pipeline: &UploadPipeline,
    table: &ContactTable,
    draft: MappingDraft,
) -> Result<MappingDraft, CliError> {
    prompter.say("Enter a column name, '-' for none, or press Enter to keep the default.")?;
    let email = ask_column(prompter, table, "Email column", draft.email.as_deref())?;
    let first_name = ask_column(prompter, table, "First name column", draft.first_name.as_deref())?;
    let last_name = ask_column(prompter, table, "Last name column", draft.last_name.as_deref())?;
    let full_name = ask_column(prompter, table, "Full name column", draft.full_name.as_deref())?;

    let mut extras = draft.extras;
    if !extras.is_empty() && !prompter.confirm("Keep the extra fields above?", true)? {
        extras.clear();
    }

    let catalog = pipeline.catalog();
    prompter.say(format!("Provider fields: {}", catalog.names().join(", ")))?;
    loop {
        let answer = prompter.ask("Extra field as 'Provider Field=column' (Enter to finish)", None)?;
        if answer.is_empty() {
            break;
        }
        match ExtraFieldMapping::parse(&answer) {
            Ok(extra) if !table.has_column(extra.column.trim()) => {
                prompter.say(format!("  Unknown column '{}'", extra.column.trim()))?;
            }
            Ok(extra) => {
                if !catalog.contains(extra.provider_field.trim()) {
                    prompter.say(format!(
                        "  '{}' is not in the field catalog; sending it anyway",
                        extra.provider_field.trim()
                    ))?;
                }
                extras.retain(|e| e.provider_field.trim() != extra.provider_field.trim());
                extras.push(extra);
            }
            Err(e) => prompter.say(format!("  {}", e))?,
        }
    }

    Ok(MappingDraft {
        email,
        first_name,
        last_name,
        full_name,
        extras,
    })
}

/// Ask for a column until the answer is a header, `-` or the default
fn ask_column<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    table: &ContactTable,
    question: &str,
    default: Option<&str>,
) -> Result<Option<String>, CliError> {
    loop {
        let answer = prompter.ask(question, Some(default.unwrap_or("-")))?;
        if answer == "-" {
            return Ok(None);
        }
        if table.has_column(&answer) {
            return Ok(Some(answer));
        }
        prompter.say(format!("  Unknown column '{}'", answer))?;
    }
}

fn choose_target<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    pipeline: &UploadPipeline,
    fixed_list_key: Option<&str>,
) -> Result<ListTarget, CliError> {
    if let Some(key) = fixed_list_key {
        prompter.say(format!("Using the configured list {}", key))?;
        return Ok(ListTarget::existing(key));
    }

    prompter.say("1) Create a new list")?;
    prompter.say("2) Use an existing list")?;
    let mode = loop {
        match prompter.ask("Choice", Some("2"))?.as_str() {
            "1" => break 1,
            "2" => break 2,
            _ => prompter.say("  Please answer 1 or 2.")?,
        }
    };

    if mode == 1 {
        let name = prompter.ask_required("New list name")?;
        let description = prompter.ask("Description", Some(""))?;
        let visibility = if prompter.confirm("Make the list public?", false)? {
            prompter.say(VISIBILITY_NOTE)?;
            Visibility::Public
        } else {
            Visibility::Private
        };
        return Ok(ListTarget::CreateNew {
            name,
            description,
            visibility,
        });
    }

    let lists = pipeline.client().list_all(pipeline.token(), 1, 200)?;
    if lists.is_empty() {
        prompter.say("No mailing lists found.")?;
        return Ok(ListTarget::existing(prompter.ask_required("List key")?));
    }
    prompter.say(format_lists(&lists).trim_end())?;
    let key = match prompter.choose("List number, or paste a list key", lists.len())? {
        Ok(index) => lists[index].key.clone(),
        Err(pasted) => pasted,
    };
    Ok(ListTarget::existing(key))
}

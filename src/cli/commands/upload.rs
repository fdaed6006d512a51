//! Upload command implementation

use clap::Args;
use std::path::PathBuf;

use super::{parse_delimiter, read_table};
use crate::api::{FallbackReason, FieldCatalog, Visibility, find_by_name};
use crate::cli::error::CliError;
use crate::cli::output::{
    VISIBILITY_NOTE, format_error_warning, format_mapping, format_plan, format_report_line,
};
use crate::cli::progress::BarSink;
use crate::config::LoaderConfig;
use crate::contacts::ContactTable;
use crate::mapping::{ExtraFieldMapping, FieldMapping, MappingDraft, detect_mapping, load_mapping};
use crate::pipeline::{ListTarget, LogSink, ProgressSink, UploadPipeline, UploadPlan, UploadReport};

/// Arguments for the upload command
#[derive(Args, Debug, Clone, Default)]
pub struct UploadArgs {
    /// CSV file with one contact per row
    pub csv: PathBuf,

    /// Field delimiter
    #[arg(long, short = 'd', default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,

    /// Mapping file (TOML) applied on top of detected columns
    #[arg(long, short = 'm', value_name = "FILE")]
    pub mapping: Option<PathBuf>,

    /// Column holding the email address
    #[arg(long, value_name = "COLUMN")]
    pub email_column: Option<String>,

    #[arg(long, value_name = "COLUMN")]
    pub first_name_column: Option<String>,

    #[arg(long, value_name = "COLUMN")]
    pub last_name_column: Option<String>,

    #[arg(long, value_name = "COLUMN")]
    pub full_name_column: Option<String>,

    /// Extra field mapping, as `Provider Field=column` (repeatable)
    #[arg(long = "extra", value_name = "FIELD=COLUMN")]
    pub extras: Vec<String>,

    /// Do not guess columns from header names
    #[arg(long)]
    pub no_detect: bool,

    /// Create a new list with this name
    #[arg(long, value_name = "NAME", conflicts_with_all = ["list_key", "list_name"])]
    pub create: Option<String>,

    /// Description for a new list
    #[arg(long, default_value = "", requires = "create")]
    pub description: String,

    /// Make a new list public
    #[arg(long, requires = "create")]
    pub public: bool,

    /// Key of an existing list
    #[arg(long, value_name = "KEY", conflicts_with = "list_name")]
    pub list_key: Option<String>,

    /// Name of an existing list
    #[arg(long, value_name = "NAME")]
    pub list_name: Option<String>,

    /// Print the plan without contacting the provider
    #[arg(long)]
    pub dry_run: bool,

    /// Log progress instead of drawing bars
    #[arg(long)]
    pub no_progress: bool,
}

/// Where the user asked contacts to go, before any lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetChoice {
    Create {
        name: String,
        description: String,
        visibility: Visibility,
    },
    Key(String),
    Name(String),
}

impl TargetChoice {
    /// Pick the target from the arguments, falling back to the configured list key
    pub fn from_args(args: &UploadArgs, config: &LoaderConfig) -> Result<Self, CliError> {
        let non_blank = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        if let Some(name) = non_blank(&args.create) {
            let visibility = if args.public {
                Visibility::Public
            } else {
                Visibility::Private
            };
            return Ok(TargetChoice::Create {
                name,
                description: args.description.clone(),
                visibility,
            });
        }
        if let Some(key) = non_blank(&args.list_key) {
            return Ok(TargetChoice::Key(key));
        }
        if let Some(name) = non_blank(&args.list_name) {
            return Ok(TargetChoice::Name(name));
        }
        if let Some(key) = config.fixed_list_key() {
            return Ok(TargetChoice::Key(key.to_string()));
        }
        Err(CliError::InvalidArgument(
            "no target list: pass --create, --list-key or --list-name, or set fixed_list_key"
                .to_string(),
        ))
    }

    /// Target for planning; a name stands in for the key it will resolve to
    fn planning_target(&self) -> ListTarget {
        match self {
            TargetChoice::Create {
                name,
                description,
                visibility,
            } => ListTarget::CreateNew {
                name: name.clone(),
                description: description.clone(),
                visibility: *visibility,
            },
            TargetChoice::Key(key) => ListTarget::existing(key.clone()),
            TargetChoice::Name(name) => ListTarget::existing(format!("named '{}'", name)),
        }
    }
}

/// Combine detection, the mapping file and column flags, in that order
pub fn build_draft(
    args: &UploadArgs,
    headers: &[String],
    catalog: &FieldCatalog,
) -> Result<MappingDraft, CliError> {
    let mut draft = if args.no_detect {
        MappingDraft::new()
    } else {
        detect_mapping(headers, catalog)
    };

    if let Some(path) = &args.mapping {
        draft = draft.merge(load_mapping(path)?);
    }

    let mut flags = MappingDraft {
        email: args.email_column.clone(),
        first_name: args.first_name_column.clone(),
        last_name: args.last_name_column.clone(),
        full_name: args.full_name_column.clone(),
        extras: Vec::new(),
    };
    for spec in &args.extras {
        flags.extras.push(ExtraFieldMapping::parse(spec)?);
    }

    Ok(draft.merge(flags))
}

/// Print the plan for a run without any network access
pub fn dry_run(
    args: &UploadArgs,
    config: &LoaderConfig,
    table: &ContactTable,
) -> Result<String, CliError> {
    let catalog = FieldCatalog::fallback(FallbackReason::Offline);
    let mapping = build_draft(args, &table.headers, &catalog)?.validate(&table.headers)?;
    let target = TargetChoice::from_args(args, config)?.planning_target();
    let plan = UploadPlan::build(table, &mapping, &target, config.upload.batch_size)?;
    Ok(format_plan(&plan, &target, &mapping))
}

/// Resolve the target and run the upload on a connected pipeline
pub fn run_upload(
    args: &UploadArgs,
    config: &LoaderConfig,
    pipeline: &mut UploadPipeline,
    table: &ContactTable,
    sink: &mut dyn ProgressSink,
) -> Result<UploadReport, CliError> {
    let mapping: FieldMapping =
        build_draft(args, &table.headers, pipeline.catalog())?.validate(&table.headers)?;

    let target = match TargetChoice::from_args(args, config)? {
        TargetChoice::Name(name) => {
            let lists = pipeline.client().list_all(pipeline.token(), 1, 200)?;
            let list = find_by_name(&lists, &name).ok_or_else(|| {
                CliError::InvalidArgument(format!("no mailing list named '{}'", name))
            })?;
            ListTarget::existing(list.key.clone())
        }
        other => other.planning_target(),
    };

    eprintln!("Mapping:\n{}", format_mapping(&mapping));
    Ok(pipeline.run(table, &mapping, &target, sink)?)
}

/// Handle the upload command
pub fn handle_upload(args: &UploadArgs, config: &LoaderConfig) -> Result<(), CliError> {
    let table = read_table(&args.csv, args.delimiter)?;

    if args.dry_run {
        print!("{}", dry_run(args, config, &table)?);
        return Ok(());
    }

    let mut pipeline = UploadPipeline::connect_http(config)?;
    let report = if args.no_progress {
        run_upload(args, config, &mut pipeline, &table, &mut LogSink)?
    } else {
        run_upload(args, config, &mut pipeline, &table, &mut BarSink::new())?
    };

    report.print_summary();
    if let Some(warning) = format_error_warning(&report) {
        eprintln!("{}", warning);
    }
    eprintln!("{}", VISIBILITY_NOTE);
    println!("{}", format_report_line(&report));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contacts::CsvReader;

    fn args() -> UploadArgs {
        UploadArgs {
            csv: PathBuf::from("contacts.csv"),
            delimiter: b',',
            ..Default::default()
        }
    }

    #[test]
    fn test_target_priority() {
        let config = LoaderConfig::new().with_fixed_list_key("fixed");
        let mut a = args();
        assert_eq!(
            TargetChoice::from_args(&a, &config).unwrap(),
            TargetChoice::Key("fixed".to_string())
        );

        a.list_name = Some("Leads".to_string());
        assert_eq!(
            TargetChoice::from_args(&a, &config).unwrap(),
            TargetChoice::Name("Leads".to_string())
        );

        a.list_key = Some("3z1".to_string());
        assert_eq!(
            TargetChoice::from_args(&a, &config).unwrap(),
            TargetChoice::Key("3z1".to_string())
        );

        a.create = Some("New".to_string());
        a.public = true;
        assert_eq!(
            TargetChoice::from_args(&a, &config).unwrap(),
            TargetChoice::Create {
                name: "New".to_string(),
                description: String::new(),
                visibility: Visibility::Public,
            }
        );
    }

    #[test]
    fn test_missing_target_is_an_error() {
        let result = TargetChoice::from_args(&args(), &LoaderConfig::new());
        assert!(matches!(result, Err(CliError::InvalidArgument(_))));
    }

    #[test]
    fn test_flags_override_detection() {
        let headers = vec!["Email".to_string(), "backup".to_string(), "Org".to_string()];
        let catalog = FieldCatalog::from_names(["Company Name"]);
        let mut a = args();
        a.email_column = Some("backup".to_string());
        a.extras = vec!["Company Name=Org".to_string()];

        let mapping = build_draft(&a, &headers, &catalog)
            .unwrap()
            .validate(&headers)
            .unwrap();
        assert_eq!(mapping.email_column(), "backup");
        assert_eq!(mapping.extras().len(), 1);
        assert_eq!(mapping.extras()[0].column, "Org");
    }

    #[test]
    fn test_no_detect_requires_explicit_email() {
        let headers = vec!["Email".to_string()];
        let mut a = args();
        a.no_detect = true;
        let draft = build_draft(&a, &headers, &FieldCatalog::from_names(["Job Title"])).unwrap();
        assert!(draft.validate(&headers).is_err());
    }

    #[test]
    fn test_dry_run_is_offline() {
        let table = CsvReader::new()
            .read_str("Email,First Name\na@x.com,Ann\nnope,Bob\n")
            .unwrap();
        let mut a = args();
        a.create = Some("Spring leads".to_string());

        let output = dry_run(&a, &LoaderConfig::new(), &table).unwrap();
        assert!(output.starts_with("DRY RUN"));
        assert!(output.contains("new private list 'Spring leads'"));
        assert!(output.contains("Sent with list creation: 1 email(s)"));
        assert!(output.contains("1 skipped"));
    }
}

#![forbid(unsafe_code)]

mod records;
mod render;
mod selection;

use std::path::PathBuf;
use std::process::ExitCode as ProcessExitCode;
use std::sync::Arc;

use adops_core::{
    resolve_adops_config_path, ConfigPathScope, ExitCode, MachineError, ENV_ADOPS_LOG_JSON,
    ENV_ADOPS_LOG_LEVEL,
};
use adops_model::{
    Campaign, DeliveryLine, DynRecord, ExportFormat, Organization, ReportTemplate, Tabular,
    UpdateRequest,
};
use adops_query::{FilterSpec, SortSpec, ViewQuery};
use adops_view::{
    screen_catalog, CompletionReport, FieldInfo, ScreenKind, ScreenPreset, ViewConfig, ViewError,
    ViewModel,
};
use clap::{error::ErrorKind, ArgAction, Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::records::{read_config_file, read_schema, JsonFileSource};
use crate::render::{aggregate_lines, emit_ok, table, OutputMode};

pub use selection::ParseError;

const ADOPS_HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
Usage: {usage}

Options:
{options}

Commands:
{subcommands}
{after-help}";

#[derive(Parser)]
#[command(name = "adops", version)]
#[command(about = "Filter, sort and aggregate ad-ops list screens")]
#[command(help_template = ADOPS_HELP_TEMPLATE)]
#[command(
    after_help = "Environment:\n  ADOPS_LOG_LEVEL   Log filter override\n  ADOPS_LOG_JSON    Emit logs as JSON lines\n  ADOPS_CONFIG      Config file path"
)]
struct Cli {
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[arg(long, global = true, default_value_t = false)]
    quiet: bool,
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in screens with their default sort and stat cards.
    Screens,
    /// List the fields a screen declares.
    Fields {
        #[arg(long)]
        screen: String,
        /// Describe records with a JSON schema instead of a built-in screen.
        #[arg(long)]
        schema: Option<PathBuf>,
    },
    /// Load a record file into a screen and print the visible rows.
    Query(QueryArgs),
    /// Print the resolved config path and the effective view settings.
    Config,
}

#[derive(Args)]
struct QueryArgs {
    #[arg(long)]
    screen: String,
    #[arg(long)]
    records: PathBuf,
    #[arg(long)]
    schema: Option<PathBuf>,
    #[arg(long)]
    search: Option<String>,
    /// field=v1,v2 (any of)
    #[arg(long = "filter", value_parser = selection::any_of)]
    filters: Vec<FilterSpec>,
    /// field=value
    #[arg(long = "equals", value_parser = selection::equals)]
    equals: Vec<FilterSpec>,
    /// field=START..END
    #[arg(long = "date-range", value_parser = selection::date_range)]
    date_ranges: Vec<FilterSpec>,
    /// field=true|false|any
    #[arg(long = "toggle", value_parser = selection::toggle)]
    toggles: Vec<FilterSpec>,
    /// field[:asc|desc]
    #[arg(long, value_parser = selection::sort)]
    sort: Option<SortSpec>,
    /// Report the export batch for excel, pdf or csv.
    #[arg(long)]
    export: Option<ExportFormat>,
}

impl QueryArgs {
    fn filter_specs(&self) -> Vec<FilterSpec> {
        let search = self.search.iter().map(FilterSpec::search);
        search
            .chain(self.filters.iter().cloned())
            .chain(self.equals.iter().cloned())
            .chain(self.date_ranges.iter().cloned())
            .chain(self.toggles.iter().cloned())
            .collect()
    }
}

#[derive(Clone, Copy)]
struct LogFlags {
    quiet: bool,
    verbose: u8,
}

#[derive(Debug)]
struct CliError {
    exit_code: ExitCode,
    machine: MachineError,
}

impl CliError {
    fn usage(message: &str) -> Self {
        Self {
            exit_code: ExitCode::Usage,
            machine: MachineError::from_exit(ExitCode::Usage, message),
        }
    }

    fn internal(message: String) -> Self {
        Self {
            exit_code: ExitCode::Internal,
            machine: MachineError::from_exit(ExitCode::Internal, &message),
        }
    }

    fn dependency(message: String) -> Self {
        Self {
            exit_code: ExitCode::DependencyFailure,
            machine: MachineError::from_exit(ExitCode::DependencyFailure, &message),
        }
    }
}

impl From<ViewError> for CliError {
    fn from(value: ViewError) -> Self {
        Self {
            exit_code: value.exit_code(),
            machine: value.to_machine_error(),
        }
    }
}

pub fn main_entry() -> ProcessExitCode {
    let wants_json = std::env::args().any(|arg| arg == "--json");
    match run() {
        Ok(()) => ProcessExitCode::from(ExitCode::Success as u8),
        Err(err) => {
            emit_error(&err, wants_json);
            ProcessExitCode::from(err.exit_code as u8)
        }
    }
}

fn run() -> Result<(), CliError> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{err}");
                return Ok(());
            }
            _ => {
                return Err(CliError {
                    exit_code: ExitCode::Usage,
                    machine: MachineError::from_exit(ExitCode::Usage, "invalid command line arguments")
                        .with_detail("error", &err.to_string()),
                });
            }
        },
    };
    init_tracing(LogFlags {
        quiet: cli.quiet,
        verbose: cli.verbose,
    });
    let output_mode = OutputMode {
        json: cli.json,
        quiet: cli.quiet,
    };
    let command = cli
        .command
        .ok_or_else(|| CliError::usage("missing command; see --help"))?;

    match command {
        Commands::Screens => emit_screens(output_mode),
        Commands::Fields { screen, schema } => emit_fields(&screen, schema, output_mode),
        Commands::Query(args) => run_query(&args, output_mode),
        Commands::Config => emit_config(output_mode),
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

fn init_tracing(flags: LogFlags) {
    let fallback = if flags.quiet {
        "error"
    } else {
        match flags.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter = std::env::var(ENV_ADOPS_LOG_LEVEL)
        .ok()
        .and_then(|level| EnvFilter::try_new(level).ok())
        .unwrap_or_else(|| EnvFilter::new(fallback));
    let registry = tracing_subscriber::registry().with(filter);
    // A subscriber may already be installed when embedded; keep it.
    let _ = if env_bool(ENV_ADOPS_LOG_JSON, false) {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
}

fn emit_error(error: &CliError, machine_json: bool) {
    if machine_json {
        match serde_json::to_string(&error.machine) {
            Ok(payload) => eprintln!("{payload}"),
            Err(_) => eprintln!(
                "{{\"code\":\"internal_error\",\"message\":\"failed to encode structured error\",\"details\":{{}}}}"
            ),
        }
    } else {
        eprintln!("{}", error.machine.message);
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, CliError> {
    serde_json::to_value(value).map_err(|e| CliError::internal(e.to_string()))
}

fn emit_screens(output_mode: OutputMode) -> Result<(), CliError> {
    let catalog = screen_catalog()?;
    if output_mode.json {
        return emit_ok(output_mode, &json!({ "screens": to_value(&catalog)? }))
            .map_err(CliError::internal);
    }
    if !output_mode.quiet {
        for info in &catalog {
            println!(
                "{:<14} sort={:<10} stats={}",
                info.screen,
                info.default_sort.as_deref().unwrap_or("-"),
                info.aggregates.join(",")
            );
        }
    }
    Ok(())
}

fn emit_fields(screen: &str, schema: Option<PathBuf>, output_mode: OutputMode) -> Result<(), CliError> {
    let fields = match schema {
        Some(path) => {
            let schema = read_schema(&path).map_err(CliError::dependency)?;
            let registry = schema
                .registry()
                .map_err(|err| CliError::from(ViewError::validation(err.to_string())))?;
            registry
                .fields()
                .map(|d| FieldInfo {
                    name: d.name().to_string(),
                    kind: d.kind().as_str(),
                    searchable: d.searchable(),
                })
                .collect()
        }
        None => screen.parse::<ScreenKind>()?.info()?.fields,
    };
    if output_mode.json {
        return emit_ok(
            output_mode,
            &json!({ "screen": screen, "fields": to_value(&fields)? }),
        )
        .map_err(CliError::internal);
    }
    if !output_mode.quiet {
        for field in &fields {
            let marker = if field.searchable { " (searchable)" } else { "" };
            println!("{:<24} {}{marker}", field.name, field.kind);
        }
    }
    Ok(())
}

fn emit_config(output_mode: OutputMode) -> Result<(), CliError> {
    let (config, loaded) = cli_config()?;
    config.validate()?;
    let payload = json!({
        "user_config": resolve_adops_config_path(ConfigPathScope::User).display().to_string(),
        "workspace_config": resolve_adops_config_path(ConfigPathScope::Workspace).display().to_string(),
        "loaded": loaded.iter().map(|p| p.display().to_string()).collect::<Vec<_>>(),
        "view": {
            "load_latency_ms": u64::try_from(config.load_latency.as_millis()).unwrap_or(u64::MAX),
            "save_latency_ms": u64::try_from(config.save_latency.as_millis()).unwrap_or(u64::MAX),
            "load_timeout_ms": u64::try_from(config.load_timeout.as_millis()).unwrap_or(u64::MAX),
            "limits": to_value(&config.limits)?,
        },
    });
    emit_ok(output_mode, &payload).map_err(CliError::internal)
}

/// Immediate latencies, then the user file, then the workspace file, then
/// the environment. Nothing in a one-shot command should wait unless asked
/// to. Also returns the files that were read.
fn cli_config() -> Result<(ViewConfig, Vec<PathBuf>), CliError> {
    let mut paths = vec![resolve_adops_config_path(ConfigPathScope::User)];
    let workspace = resolve_adops_config_path(ConfigPathScope::Workspace);
    if !paths.contains(&workspace) {
        paths.push(workspace);
    }
    let mut config = ViewConfig::immediate();
    let mut loaded = Vec::new();
    for path in paths {
        let file = read_config_file(&path).map_err(|msg| CliError::from(ViewError::validation(msg)))?;
        if let Some(file) = file {
            tracing::debug!(path = %path.display(), "config file applied");
            config = config.with_file(&file);
            loaded.push(path);
        }
    }
    Ok((config.with_overrides(|name| std::env::var(name).ok()), loaded))
}

fn run_query(args: &QueryArgs, output_mode: OutputMode) -> Result<(), CliError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|e| CliError::internal(e.to_string()))?;
    let (config, _) = cli_config()?;
    config.validate()?;
    tracing::info!(screen = %args.screen, records = %args.records.display(), "query started");
    runtime.block_on(async {
        if let Some(path) = &args.schema {
            let schema = read_schema(path).map_err(CliError::dependency)?;
            let registry = schema
                .registry()
                .map_err(|err| CliError::from(ViewError::validation(err.to_string())))?;
            let view =
                ViewModel::<DynRecord>::new(args.screen.as_str(), registry, ViewQuery::new(), config)?;
            return query_view(view, args, output_mode).await;
        }
        match args.screen.parse::<ScreenKind>()? {
            ScreenKind::Campaigns => query_screen::<Campaign>(config, args, output_mode).await,
            ScreenKind::Delivery => query_screen::<DeliveryLine>(config, args, output_mode).await,
            ScreenKind::UpdateRequests => {
                query_screen::<UpdateRequest>(config, args, output_mode).await
            }
            ScreenKind::Organizations => {
                query_screen::<Organization>(config, args, output_mode).await
            }
            ScreenKind::Reports => query_screen::<ReportTemplate>(config, args, output_mode).await,
        }
    })
}

async fn query_screen<R>(
    config: ViewConfig,
    args: &QueryArgs,
    output_mode: OutputMode,
) -> Result<(), CliError>
where
    R: ScreenPreset + Serialize + DeserializeOwned,
{
    let view = ViewModel::<R>::for_screen(config)?;
    query_view(view, args, output_mode).await
}

async fn query_view<R>(
    mut view: ViewModel<R>,
    args: &QueryArgs,
    output_mode: OutputMode,
) -> Result<(), CliError>
where
    R: Tabular + Serialize + DeserializeOwned,
{
    for spec in args.filter_specs() {
        view.set_filter(spec)?;
    }
    if let Some(sort) = &args.sort {
        view.set_sort(Some(sort.clone()))?;
    }
    view.start_load(Arc::new(JsonFileSource::new(&args.records)))?;
    match view.next_completion().await {
        Some(CompletionReport::Applied(_)) => {}
        Some(CompletionReport::Failed(_, err)) => return Err(err.into()),
        Some(CompletionReport::Stale(_)) | None => {
            return Err(CliError::internal("load finished without records".to_string()));
        }
    }

    let visible = view.visible_records();
    let export = match args.export {
        Some(format) => {
            let batch = view.export(format)?;
            Some(json!({
                "format": format.as_str(),
                "file_name": batch.file_name(),
                "records": batch.len(),
            }))
        }
        None => None,
    };
    let errors: Vec<Value> = view
        .computation_errors()
        .iter()
        .map(|e| {
            json!({
                "stage": match e.stage {
                    adops_view::ComputeStage::Sort => "sort",
                    adops_view::ComputeStage::Aggregate => "aggregate",
                },
                "target": e.target,
                "message": e.message,
            })
        })
        .collect();

    if output_mode.json {
        let payload = json!({
            "screen": view.screen(),
            "query_hash": view.query_hash(),
            "total": view.records().len(),
            "visible": visible.len(),
            "records": to_value(&visible)?,
            "aggregates": to_value(view.aggregates())?,
            "errors": errors,
            "export": export,
        });
        return emit_ok(output_mode, &payload).map_err(CliError::internal);
    }
    if output_mode.quiet {
        return Ok(());
    }
    println!("{}", table(view.registry(), &visible));
    println!();
    println!("{} of {} records", visible.len(), view.records().len());
    if !view.aggregates().is_empty() {
        println!("{}", aggregate_lines(view.aggregates()));
    }
    for err in view.computation_errors() {
        eprintln!("warning: {} fell back to its default: {}", err.target, err.message);
    }
    if let Some(export) = export {
        println!("export: {export}");
    }
    Ok(())
}

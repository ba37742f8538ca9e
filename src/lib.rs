//! inferconv: convert Bayesian sampler output into inference data.
//!
//! inferconv takes the outputs of different sampling engines (Stan fits,
//! CmdStan CSV files, ensemble samplers, Pyro/NumPyro runs), raw arrays and
//! labeled datasets, and converts them into one canonical container of
//! grouped, dimension-labeled data.
//!
//! # Modules
//!
//! - [`ir`]: Container, datasets, dynamic input values and the per-engine extractors
//! - [`conversion`]: Input classification and the conversion dispatcher
//! - [`inspect`]: Container summaries
//! - [`separation`]: Separation plot data preparation
//! - [`config`]: Process-wide settings
//! - [`error`]: Error types for inferconv operations

pub mod config;
pub mod conversion;
pub mod error;
pub mod inspect;
pub mod ir;
pub mod separation;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use walkdir::WalkDir;

pub use conversion::{convert_to_container, convert_to_dataset, ConvertArgs, Converter};
pub use error::InferConvError;

use config::Settings;
use ir::io_cmdstan_csv::CSV_EXTENSION;
use ir::{Coords, Dims, GroupName, InferenceData, Value};

/// The inferconv CLI application.
#[derive(Parser)]
#[command(name = "inferconv")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Settings file (YAML).
    #[arg(long, global = true, env = "INFERCONV_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Convert sampler output into a container file.
    Convert(ConvertCmdArgs),
    /// Summarize the groups and variables of a container file.
    Inspect(InspectArgs),
    /// Compute separation plot data from a container file.
    Separation(SeparationCmdArgs),
}

/// Arguments for the convert subcommand.
#[derive(clap::Args)]
struct ConvertCmdArgs {
    /// Input paths. Several paths (or a directory of CSV files) are read as
    /// one CmdStan run, one file per chain.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output container file.
    #[arg(short, long)]
    output: PathBuf,

    /// Group to place the input under.
    #[arg(long, default_value = "posterior")]
    group: String,

    /// JSON file mapping dimension names to coordinate labels.
    #[arg(long)]
    coords: Option<PathBuf>,

    /// JSON file mapping variable names to dimension names.
    #[arg(long)]
    dims: Option<PathBuf>,

    /// Read the single input as a serialized value document.
    #[arg(long)]
    value: bool,

    /// Report format ('text' or 'json').
    #[arg(long, default_value = "text")]
    report: String,
}

/// Arguments for the inspect subcommand.
#[derive(clap::Args)]
struct InspectArgs {
    /// Container file to inspect.
    input: PathBuf,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,

    /// Maximum number of variables listed per group.
    #[arg(long, default_value_t = 10)]
    top: usize,
}

/// Arguments for the separation subcommand.
#[derive(clap::Args)]
struct SeparationCmdArgs {
    /// Container file holding observed data and posterior predictive samples.
    input: PathBuf,

    /// Observed variable in `observed_data`.
    #[arg(long)]
    y: String,

    /// Predicted variable in `posterior_predictive` (defaults to `--y`).
    #[arg(long = "y-hat")]
    y_hat: Option<String>,

    /// Plotting backend (defaults to the configured backend).
    #[arg(long)]
    backend: Option<String>,

    /// Include the sorted prediction line.
    #[arg(long = "y-hat-line")]
    y_hat_line: bool,

    /// Include the expected event count marker.
    #[arg(long = "expected-events")]
    expected_events: bool,
}

/// Run the inferconv CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), InferConvError> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config {
        let settings = Settings::from_yaml_file(path)?;
        tracing::debug!(path = %path.display(), "loaded settings");
        config::init(settings);
    }

    match cli.command {
        Some(Commands::Convert(args)) => run_convert(args),
        Some(Commands::Inspect(args)) => run_inspect(args),
        Some(Commands::Separation(args)) => run_separation(args),
        None => {
            println!("inferconv {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Convert Bayesian sampler output into inference data.");
            println!();
            println!("Run 'inferconv --help' for usage information.");
            Ok(())
        }
    }
}

/// Rendering of a subcommand's report on stdout.
#[derive(Clone, Copy, Debug)]
enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    fn parse(format: &str, what: &str) -> Result<Self, InferConvError> {
        match format {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(InferConvError::UnsupportedFormat(format!(
                "'{}' {} (supported: text, json)",
                other, what
            ))),
        }
    }
}

/// Execute the convert subcommand.
fn run_convert(args: ConvertCmdArgs) -> Result<(), InferConvError> {
    let format = ReportFormat::parse(&args.report, "report")?;
    let group: GroupName = args.group.parse()?;
    let value = input_value(&args.inputs, args.value)?;
    let coords: Option<Coords> = args.coords.as_deref().map(read_json_file).transpose()?;
    let dims: Option<Dims> = args.dims.as_deref().map(read_json_file).transpose()?;

    let mut request = ConvertArgs::new().group(group);
    request.coords = coords;
    request.dims = dims;

    let (idata, report) = Converter::default().convert_with_report(value, request)?;
    idata.to_file(&args.output)?;

    match format {
        ReportFormat::Json => println!("{}", to_json(&report)?),
        ReportFormat::Text => {
            println!("Converted to {}", args.output.display());
            print!("{}", report);
        }
    }
    Ok(())
}

/// Execute the inspect subcommand.
fn run_inspect(args: InspectArgs) -> Result<(), InferConvError> {
    let format = ReportFormat::parse(&args.output, "output")?;
    let idata = InferenceData::from_file(&args.input)?;
    let opts = inspect::InspectOptions {
        top_variables: args.top,
        ..Default::default()
    };
    let report = inspect::inspect_container(&idata, &opts);

    match format {
        ReportFormat::Json => println!("{}", to_json(&report)?),
        ReportFormat::Text => print!("{}", report),
    }
    Ok(())
}

/// Execute the separation subcommand.
fn run_separation(args: SeparationCmdArgs) -> Result<(), InferConvError> {
    let idata = InferenceData::from_file(&args.input)?;
    let layout = separation::prepare(
        separation::SeparationArgs {
            idata: Some(&idata),
            y: Some(separation::Series::Name(args.y)),
            y_hat: args.y_hat.map(separation::Series::Name),
            y_hat_line: args.y_hat_line,
            expected_events: args.expected_events,
            backend: args.backend,
        },
        config::global(),
    )?;
    println!("{}", to_json(&layout)?);
    Ok(())
}

/// Turns the command-line inputs into the value to convert.
///
/// A value document is read as is. A single file is passed as a path; a
/// directory expands to the CSV files under it, sorted by name; several
/// paths become a list.
fn input_value(inputs: &[PathBuf], value_document: bool) -> Result<Value, InferConvError> {
    if value_document {
        return match inputs {
            [path] => ir::io_json::read_value_json(path),
            _ => Err(InferConvError::UnsupportedFormat(
                "--value takes exactly one input".to_string(),
            )),
        };
    }

    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            paths.extend(csv_files_in(input)?);
        } else {
            paths.push(input.clone());
        }
    }

    let mut values: Vec<Value> = paths
        .iter()
        .map(|p| Value::Str(p.to_string_lossy().into_owned()))
        .collect();
    match (inputs.len(), inputs.first()) {
        (1, Some(only)) if !only.is_dir() => Ok(values.remove(0)),
        _ => Ok(Value::List(values)),
    }
}

fn csv_files_in(dir: &Path) -> Result<Vec<PathBuf>, InferConvError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| InferConvError::Io(e.into()))?;
        if entry.file_type().is_file()
            && entry.file_name().to_string_lossy().ends_with(CSV_EXTENSION)
        {
            files.push(entry.into_path());
        }
    }
    tracing::debug!(dir = %dir.display(), files = files.len(), "collected chain files");
    Ok(files)
}

fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, InferConvError> {
    let text = std::fs::read_to_string(path)?;
    serde_json::from_str(&text).map_err(|source| InferConvError::ValueJsonParse {
        path: path.to_path_buf(),
        source,
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, InferConvError> {
    serde_json::to_string_pretty(value).map_err(|e| InferConvError::Io(e.into()))
}

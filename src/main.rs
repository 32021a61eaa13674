use clap::{Parser, Subcommand};
use mapstyle::{LoadOptions, LoadWarning, Map, MapError, Symbolizer, load_map_into, save_map};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Map(#[from] MapError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("style '{0}' not found")]
    StyleNotFound(String),

    #[error("style '{0}' has no raster colorizer")]
    NoColorizer(String),

    #[error("{0} validation error(s)")]
    Invalid(usize),
}

/// Inspect and normalize map style documents.
#[derive(Parser, Debug)]
#[command(name = "mapstyle", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct LoadArgs {
    /// Map document to load.
    file: PathBuf,

    /// Fail on unknown attributes and validation problems instead of warning.
    #[arg(long)]
    strict: bool,

    /// Directory for relative paths. Defaults to the document's directory.
    #[arg(long)]
    base: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load and validate a document.
    Check {
        #[command(flatten)]
        load: LoadArgs,
    },
    /// Load a document and save it again in normalized form.
    Convert {
        #[command(flatten)]
        load: LoadArgs,

        /// Output file. Writes to stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write attributes even when they hold their default value.
        #[arg(long)]
        explicit_defaults: bool,
    },
    /// Print the loaded map model as JSON.
    Dump {
        #[command(flatten)]
        load: LoadArgs,
    },
    /// Classify values through the first raster colorizer of a style.
    Classify {
        #[command(flatten)]
        load: LoadArgs,

        #[arg(long)]
        style: String,

        #[arg(required = true, allow_negative_numbers = true)]
        values: Vec<f64>,
    },
}

fn load_document(args: &LoadArgs) -> Result<(Map, Vec<LoadWarning>), CliError> {
    let text = std::fs::read_to_string(&args.file)?;
    let base = args
        .base
        .clone()
        .or_else(|| args.file.parent().map(Path::to_path_buf));
    let options = LoadOptions {
        strict: args.strict,
        base_path: base,
    };
    let mut map = Map::default();
    let warnings = load_map_into(&mut map, &text, &options)?;
    log::debug!("loaded {}", args.file.display());
    Ok((map, warnings))
}

fn check(args: &LoadArgs) -> Result<(), CliError> {
    let (map, warnings) = load_document(args)?;
    println!(
        "{}: {} styles, {} fontsets, {} layers",
        args.file.display(),
        map.styles().count(),
        map.fontsets().count(),
        map.layers().len()
    );
    // Lenient loads already report validation problems as warnings.
    for warning in &warnings {
        println!("warning: {}", warning);
    }
    match map.validate().len() {
        0 => Ok(()),
        n => Err(CliError::Invalid(n)),
    }
}

fn convert(args: &LoadArgs, output: Option<&Path>, explicit_defaults: bool) -> Result<(), CliError> {
    let (map, _) = load_document(args)?;
    match output {
        Some(path) => {
            save_map(&map, path, explicit_defaults)?;
            log::info!("wrote {}", path.display());
        }
        None => print!("{}", mapstyle::save_map_to_string(&map, explicit_defaults)?),
    }
    Ok(())
}

fn classify(args: &LoadArgs, style_name: &str, values: &[f64]) -> Result<(), CliError> {
    let (map, _) = load_document(args)?;
    let style = map
        .find_style(style_name)
        .ok_or_else(|| CliError::StyleNotFound(style_name.to_string()))?;
    let colorizer = style
        .rules
        .iter()
        .flat_map(|rule| &rule.symbolizers)
        .find_map(|symbolizer| match symbolizer {
            Symbolizer::Raster(raster) => raster.colorizer.as_ref(),
            _ => None,
        })
        .ok_or_else(|| CliError::NoColorizer(style_name.to_string()))?;
    for value in values {
        println!("{}\t{}", value, colorizer.classify(*value).to_css_string());
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Check { load } => check(&load),
        Command::Convert {
            load,
            output,
            explicit_defaults,
        } => convert(&load, output.as_deref(), explicit_defaults),
        Command::Dump { load: args } => {
            let (map, _) = load_document(&args)?;
            println!("{}", serde_json::to_string_pretty(&map)?);
            Ok(())
        }
        Command::Classify {
            load,
            style,
            values,
        } => classify(&load, &style, &values),
    }
}

fn main() -> ExitCode {
    env_logger::init();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

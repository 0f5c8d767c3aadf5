//! Panformat: pluggable data-format conversion around a canonical value model.
//!
//! External content (JSON text, CSV tables, native Rust values) is read into
//! a single canonical [`Value`] tree by a format plugin, and canonical values
//! are written back out as typed [`Document`]s by another plugin. Plugins are
//! looked up by identifier or media type in a [`PluginRegistry`].
//!
//! # Modules
//!
//! - [`value`]: The canonical value model and its JSON primitives
//! - [`document`]: Documents, media types and host objects
//! - [`plugin`]: The format plugin contract and the builtin plugins
//! - [`registry`]: Identifier → plugin resolution
//! - [`conversion`]: Read-then-write pipeline with lossiness reporting
//! - [`error`]: Error types for panformat operations
//!
//! # Example
//!
//! ```
//! use panformat::{Document, MediaType, Params, PluginRegistry};
//!
//! let registry = PluginRegistry::with_builtins();
//! let input = Document::text(r#"[{"name":"gizmo"}]"#, MediaType::parse("json")?);
//!
//! let value = registry.resolve("application/json")?.read(&input, &Params::new())?;
//! let csv = registry
//!     .resolve("csv")?
//!     .write(&value, &Params::new(), &MediaType::parse("text/csv")?)?;
//!
//! assert_eq!(csv.as_text(), Some("name\ngizmo\n"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod conversion;
pub mod document;
pub mod error;
pub mod plugin;
pub mod registry;
pub mod value;

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

pub use document::{Content, Document, HostObject, MediaType};
pub use error::{FormatError, PanformatError, UnsupportedFormatError};
pub use plugin::{FormatPlugin, Params};
pub use registry::PluginRegistry;
pub use value::Value;

use conversion::{ConversionRequest, ConversionReport};

/// The panformat CLI application.
#[derive(Parser)]
#[command(name = "panformat")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Log filter (e.g. 'warn', 'panformat=debug').
    #[arg(long, global = true, env = "PANFORMAT_LOG", default_value = "warn")]
    log: String,

    /// Enable debug logging (overrides --log).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Convert a file from one format to another.
    Convert(ConvertArgs),
    /// List registered formats and their parameters.
    Formats(FormatsArgs),
}

/// Arguments for the convert subcommand.
#[derive(clap::Args)]
struct ConvertArgs {
    /// Input file to convert.
    input: PathBuf,

    /// Input format identifier or media type (e.g. 'json', 'text/csv').
    #[arg(long)]
    from: String,

    /// Output format identifier or media type.
    #[arg(long)]
    to: String,

    /// Read parameter as NAME=VALUE (repeatable).
    #[arg(long = "read-param", value_name = "NAME=VALUE")]
    read_params: Vec<String>,

    /// Write parameter as NAME=VALUE (repeatable).
    #[arg(long = "write-param", value_name = "NAME=VALUE")]
    write_params: Vec<String>,

    /// Output file (stdout if omitted).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the conversion report to stderr ('text' or 'json').
    #[arg(long, value_name = "FORMAT")]
    report: Option<String>,
}

/// Arguments for the formats subcommand.
#[derive(clap::Args)]
struct FormatsArgs {
    /// Output format for the listing ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Run the panformat CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), PanformatError> {
    let cli = Cli::parse();
    init_tracing(if cli.verbose { "debug" } else { cli.log.as_str() });

    match cli.command {
        Some(Commands::Convert(args)) => run_convert(args),
        Some(Commands::Formats(args)) => run_formats(args),
        None => {
            println!("panformat {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Pluggable data-format conversion.");
            println!();
            println!("Run 'panformat --help' for usage information.");
            Ok(())
        }
    }
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be installed when run() is embedded.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

/// Parses repeated `NAME=VALUE` arguments into parameters.
fn parse_params(raw: &[String]) -> Result<Params, PanformatError> {
    raw.iter()
        .map(|assignment| {
            assignment
                .split_once('=')
                .filter(|(name, _)| !name.trim().is_empty())
                .map(|(name, value)| (name.trim().to_string(), value.to_string()))
                .ok_or_else(|| {
                    PanformatError::InvalidArgument(format!(
                        "parameter '{assignment}' is not of the form NAME=VALUE"
                    ))
                })
        })
        .collect()
}

/// Execute the convert subcommand.
fn run_convert(args: ConvertArgs) -> Result<(), PanformatError> {
    let registry = PluginRegistry::with_builtins();

    let bytes = fs::read(&args.input)?;
    let input = Document::binary(bytes, MediaType::parse(&args.from)?);
    let request = ConversionRequest::new(args.to.clone())
        .from(args.from.clone())
        .with_read_params(parse_params(&args.read_params)?)
        .with_write_params(parse_params(&args.write_params)?);

    let conversion = conversion::convert(&registry, &input, &request)?;

    let payload: &[u8] = match conversion.document.content() {
        Content::Text(text) => text.as_bytes(),
        Content::Binary(bytes) => bytes,
        Content::Object(_) => {
            return Err(PanformatError::UnprintableDocument {
                media_type: conversion.document.media_type().to_string(),
            })
        }
    };

    match &args.output {
        Some(path) => fs::write(path, payload)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(payload)?;
            stdout.flush()?;
        }
    }

    if let Some(format) = args.report.as_deref() {
        print_report(&conversion.report, format)?;
    }
    Ok(())
}

fn print_report(report: &ConversionReport, format: &str) -> Result<(), PanformatError> {
    match format {
        "json" => {
            let json = serde_json::to_string_pretty(report).map_err(|e| {
                PanformatError::InvalidArgument(format!("cannot render report: {e}"))
            })?;
            eprintln!("{json}");
        }
        "text" => eprint!("{report}"),
        other => {
            return Err(PanformatError::InvalidArgument(format!(
                "unknown report format '{other}' (supported: text, json)"
            )))
        }
    }
    Ok(())
}

/// Execute the formats subcommand.
fn run_formats(args: FormatsArgs) -> Result<(), PanformatError> {
    let registry = PluginRegistry::with_builtins();
    let descriptors = registry.descriptors();

    match args.output.as_str() {
        "json" => {
            let listing: Vec<_> = descriptors
                .iter()
                .map(|d| {
                    serde_json::json!({
                        "plugin_id": d.plugin_id(),
                        "identifiers": d.supported_identifiers(),
                        "read_parameters": d.read_parameters(),
                        "write_parameters": d.write_parameters(),
                    })
                })
                .collect();
            let json = serde_json::to_string_pretty(&listing).map_err(|e| {
                PanformatError::InvalidArgument(format!("cannot render listing: {e}"))
            })?;
            println!("{json}");
        }
        "text" => {
            for d in &descriptors {
                println!("{} ({})", d.plugin_id(), d.supported_identifiers().join(", "));
                let sections = [
                    ("read", d.read_parameters()),
                    ("write", d.write_parameters()),
                ];
                for (direction, params) in sections {
                    for (name, description) in params {
                        println!("  {direction} {name}: {description}");
                    }
                }
            }
        }
        other => {
            return Err(PanformatError::InvalidArgument(format!(
                "unknown listing format '{other}' (supported: text, json)"
            )))
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_params() {
        let params = parse_params(&["UseHeader=false".to_string(), "Headers=a,b=c".to_string()])
            .expect("valid params");
        assert_eq!(params.get_bool("UseHeader").unwrap(), Some(false));
        assert_eq!(params.get_str("Headers").unwrap(), Some("a,b=c"));
    }

    #[test]
    fn test_parse_params_rejects_missing_name() {
        assert!(parse_params(&["novalue".to_string()]).is_err());
        assert!(parse_params(&["=x".to_string()]).is_err());
    }
}

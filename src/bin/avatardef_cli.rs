//! AvatarDef CLI - Bridge interface for renderers and build scripts
//!
//! Commands: definition, options
//! Outputs the validation report as JSON to stdout
//! Exit codes: 0 valid, 2 invalid, 1 on I/O, parse or config errors

use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{prelude::*, EnvFilter};

use avatardef_core::{Gate, ValidatorConfig};

#[derive(Parser)]
#[command(name = "avatardef-cli")]
#[command(about = "AvatarDef CLI - Avatar definition and options validator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a JSON validator configuration (resource limits)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an avatar definition document
    Definition(Input),

    /// Validate a flat options map
    Options(Input),
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct Input {
    /// Read the JSON input from a file
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Inline JSON input
    #[arg(short, long)]
    payload: Option<String>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    // Use JSON format when RUST_LOG_FORMAT=json
    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn fail(message: String) -> ExitCode {
    println!("{}", json!({"valid": false, "error": message}));
    ExitCode::FAILURE
}

fn load_config(path: Option<&Path>) -> Result<ValidatorConfig, String> {
    let Some(path) = path else {
        return Ok(ValidatorConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
    ValidatorConfig::from_json_str(&text).map_err(|e| e.to_string())
}

fn load_input(input: &Input) -> Result<Value, String> {
    let text = match (&input.file, &input.payload) {
        (Some(path), _) => std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?,
        (None, Some(payload)) => payload.clone(),
        (None, None) => return Err("Either --file or --payload is required".into()),
    };
    serde_json::from_str(&text).map_err(|e| format!("Invalid JSON input: {}", e))
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let gate = match load_config(cli.config.as_deref()) {
        Ok(config) => match Gate::new(config) {
            Ok(gate) => gate,
            Err(e) => return fail(e.to_string()),
        },
        Err(e) => return fail(e),
    };

    let (input, is_definition) = match &cli.command {
        Commands::Definition(input) => (input, true),
        Commands::Options(input) => (input, false),
    };
    let value = match load_input(input) {
        Ok(v) => v,
        Err(e) => return fail(e),
    };

    let report = if is_definition {
        gate.check_definition(&value)
    } else {
        gate.check_options(&value)
    };

    match serde_json::to_string_pretty(&report) {
        Ok(text) => println!("{}", text),
        Err(e) => return fail(format!("Failed to serialize report: {}", e)),
    }

    if report.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2) // Validation failure
    }
}

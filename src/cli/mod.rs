//! The `appsync-sdl` command-line interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the core library functions.

use std::{path::Path, process};

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::args::{AppSyncArgs, BindingFormat, Command};
use crate::engine::{print_error, GenerateRequest, PipelineError, SchemaPipeline};

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = AppSyncArgs::parse();
    init_tracing(args.verbose);

    let result = match args.command {
        Command::Extract { path, out, format } => handle_extract(&path, &out, format),
        Command::Print { path, diff } => handle_print(&path, diff),
        Command::Validate { path } => handle_validate(&path),
        Command::Generate {
            service_path,
            config,
            service_role,
            templates,
        } => handle_generate(GenerateRequest {
            service_path,
            config_file: config,
            service_role,
            templates,
        }),
    };

    if let Err(e) = result {
        print_error(e);
        process::exit(1);
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed when run in-process.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

// ============================================================================
// COMMAND HANDLERS
// ============================================================================

fn handle_extract(
    path: &Path,
    out: &Path,
    format: BindingFormat,
) -> Result<(), PipelineError> {
    let (_, extraction) = SchemaPipeline::process_schema(path)?;
    let rendered = output::format_bindings(&extraction.bindings, format)?;
    SchemaPipeline::write_schema(out, &extraction.schema)?;
    println!("{}", rendered.trim_end());
    Ok(())
}

fn handle_print(path: &Path, diff: bool) -> Result<(), PipelineError> {
    let (schema, extraction) = SchemaPipeline::process_schema(path)?;
    if diff {
        let before = SchemaPipeline::reprint(&schema)?;
        output::print_schema_diff(&before, &extraction.schema);
    } else {
        print!("{}", extraction.schema);
    }
    Ok(())
}

fn handle_validate(path: &Path) -> Result<(), PipelineError> {
    let (schema, extraction) = SchemaPipeline::process_schema(path)?;
    output::print_success(&format!(
        "{} is valid: {} @AWSLambda binding(s) across {} file(s)",
        schema.name,
        extraction.bindings.len(),
        schema.fragments.len()
    ));
    Ok(())
}

fn handle_generate(request: GenerateRequest) -> Result<(), PipelineError> {
    let generated = SchemaPipeline::generate_service(&request)?;
    let yaml = generated.config.to_yaml_string()?;
    print!("{}", yaml);
    output::print_notice(&format!(
        "wrote {} ({} binding(s))",
        generated.schema_path.display(),
        generated.extraction.bindings.len()
    ));
    Ok(())
}

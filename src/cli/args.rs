//! Command-line arguments and subcommands for the `appsync-sdl` binary.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::CLEAN_SCHEMA_FILE;

#[derive(Debug, Parser)]
#[command(
    name = "appsync-sdl",
    version,
    about = "Extract @AWSLambda resolver bindings from GraphQL SDL and emit a clean schema."
)]
pub struct AppSyncArgs {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write the clean schema and print the extracted bindings.
    Extract {
        /// A schema file, or a directory of .graphql fragments.
        #[arg(required = true)]
        path: PathBuf,
        /// Where to write the clean schema.
        #[arg(short, long, default_value = CLEAN_SCHEMA_FILE)]
        out: PathBuf,
        /// How to print the bindings.
        #[arg(short, long, value_enum, default_value_t = BindingFormat::Json)]
        format: BindingFormat,
    },
    /// Print the clean schema.
    Print {
        #[arg(required = true)]
        path: PathBuf,
        /// Show a colored diff against the reprinted input instead.
        #[arg(long)]
        diff: bool,
    },
    /// Check that a schema parses and its directives are well-formed.
    Validate {
        #[arg(required = true)]
        path: PathBuf,
    },
    /// Run the whole pipeline from a serverless service configuration.
    Generate {
        /// Service directory; configuration and schema paths are relative to it.
        #[arg(long, default_value = ".")]
        service_path: PathBuf,
        /// Configuration file name inside the service directory.
        #[arg(long)]
        config: Option<PathBuf>,
        /// IAM role referenced by the generated data sources.
        #[arg(long)]
        service_role: Option<String>,
        /// Directory holding request.vtl and response.vtl.
        #[arg(long)]
        templates: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BindingFormat {
    Json,
    Yaml,
}

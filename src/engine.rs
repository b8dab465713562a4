use std::{
    fs, io,
    path::{Path, PathBuf},
};

use miette::{Diagnostic, NamedSource, Report};
use thiserror::Error;

use crate::{
    config::{ConfigError, ServiceConfig, CLEAN_SCHEMA_FILE, DEFAULT_CONFIG_FILE},
    discovery::{AssembledSchema, AssemblyError, SchemaSource},
    errors::SchemaError,
    extract::{extract_from_schema, Extraction},
    generate::{Artifacts, GenerateOptions, DEFAULT_TEMPLATES_DIR},
    syntax,
};

// ============================================================================
// PIPELINE ERRORS
// ============================================================================

#[derive(Debug, Error, Diagnostic)]
pub enum PipelineError {
    #[error(transparent)]
    #[diagnostic(code(appsync_sdl::config))]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(code(appsync_sdl::assembly))]
    Assembly(#[from] AssemblyError),

    /// A schema failed to parse or extract. Carries the text so the report
    /// can point into it.
    #[error("{error}")]
    #[diagnostic(code(appsync_sdl::schema))]
    Schema {
        name: String,
        text: String,
        error: SchemaError,
    },

    #[error("Failed to write '{}': {source}", path.display())]
    #[diagnostic(code(appsync_sdl::io))]
    Write { path: PathBuf, source: io::Error },

    #[error("Failed to serialize output: {0}")]
    #[diagnostic(code(appsync_sdl::serialize))]
    Serialize(String),
}

impl PipelineError {
    /// The underlying schema error, when there is one.
    pub fn schema_error(&self) -> Option<&SchemaError> {
        match self {
            PipelineError::Schema { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Builds a report, attaching the schema text to schema errors.
    pub fn into_report(self) -> Report {
        match self {
            PipelineError::Schema { name, text, error } => {
                Report::new(error).with_source_code(NamedSource::new(name, text))
            }
            other => Report::new(other),
        }
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(error: serde_json::Error) -> Self {
        PipelineError::Serialize(error.to_string())
    }
}

impl From<serde_yaml::Error> for PipelineError {
    fn from(error: serde_yaml::Error) -> Self {
        PipelineError::Serialize(error.to_string())
    }
}

/// Prints a pipeline error with full miette diagnostics.
pub fn print_error(error: PipelineError) {
    let report = error.into_report();
    eprintln!("{report:?}");
}

// ============================================================================
// GENERATE REQUEST
// ============================================================================

/// Inputs of [`SchemaPipeline::generate_service`]. Unset fields fall back to
/// the service configuration, then to built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub service_path: PathBuf,
    pub config_file: Option<PathBuf>,
    pub service_role: Option<String>,
    pub templates: Option<String>,
}

impl GenerateRequest {
    pub fn config_path(&self) -> PathBuf {
        self.service_path.join(
            self.config_file
                .as_deref()
                .unwrap_or(Path::new(DEFAULT_CONFIG_FILE)),
        )
    }
}

/// Result of a successful `generate` run.
#[derive(Debug, Clone)]
pub struct GeneratedService {
    pub config: ServiceConfig,
    pub schema_path: PathBuf,
    pub extraction: Extraction,
}

// ============================================================================
// SCHEMA PIPELINE
// ============================================================================

/// File-level services for the CLI: assembly, extraction and writing.
pub struct SchemaPipeline;

impl SchemaPipeline {
    /// Reads a schema file, or assembles a directory of fragments.
    pub fn load_schema(path: &Path) -> Result<AssembledSchema, PipelineError> {
        Ok(SchemaSource::from_path(path).load()?)
    }

    /// Runs extraction over already loaded schema text.
    pub fn extract_assembled(schema: &AssembledSchema) -> Result<Extraction, PipelineError> {
        extract_from_schema(&schema.text).map_err(|error| schema_error(schema, error))
    }

    /// Parses and reprints schema text without touching its directives.
    pub fn reprint(schema: &AssembledSchema) -> Result<String, PipelineError> {
        syntax::parse(&schema.text)
            .map(|document| syntax::print(&document))
            .map_err(|error| schema_error(schema, error))
    }

    /// Loads `path` and extracts it; nothing is written.
    pub fn process_schema(path: &Path) -> Result<(AssembledSchema, Extraction), PipelineError> {
        let schema = Self::load_schema(path)?;
        let extraction = Self::extract_assembled(&schema)?;
        Ok((schema, extraction))
    }

    pub fn write_schema(path: &Path, text: &str) -> Result<(), PipelineError> {
        fs::write(path, text).map_err(|source| PipelineError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "wrote clean schema");
        Ok(())
    }

    /// Full pipeline driven by the service configuration.
    ///
    /// The clean schema is written to `<service>/.serverless_schema.graphql`
    /// only once every earlier step has succeeded.
    pub fn generate_service(request: &GenerateRequest) -> Result<GeneratedService, PipelineError> {
        let mut config = ServiceConfig::load(&request.config_path())?;
        let source = config.schema_source(&request.service_path)?;
        tracing::debug!(source = %source.path().display(), "resolved schema source");

        let schema = source.load()?;
        let extraction = Self::extract_assembled(&schema)?;

        let options = GenerateOptions {
            service_role: request
                .service_role
                .clone()
                .unwrap_or_else(|| config.service_role().to_string()),
            templates: request
                .templates
                .clone()
                .unwrap_or_else(|| DEFAULT_TEMPLATES_DIR.to_string()),
        };
        let artifacts = Artifacts::from_bindings(&extraction.bindings, &options);
        if artifacts.is_empty() {
            tracing::warn!("schema has no @AWSLambda fields; nothing to generate");
        }
        artifacts.apply(&mut config)?;

        let schema_path = request.service_path.join(CLEAN_SCHEMA_FILE);
        Self::write_schema(&schema_path, &extraction.schema)?;

        Ok(GeneratedService {
            config,
            schema_path,
            extraction,
        })
    }
}

fn schema_error(schema: &AssembledSchema, error: SchemaError) -> PipelineError {
    PipelineError::Schema {
        name: schema.name.clone(),
        text: schema.text.clone(),
        error,
    }
}

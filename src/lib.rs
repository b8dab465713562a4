//! Extraction of `@AWSLambda` resolver bindings from GraphQL SDL.
//!
//! [`extract_from_schema`] parses a schema, collects one [`Binding`] per
//! annotated field and prints the schema back without the directive. The
//! remaining modules wire that core into schema assembly, serverless
//! configuration and the `appsync-sdl` command line.

pub use crate::errors::{LocalizedError, SchemaError};
pub use crate::extract::{extract_from_schema, Binding, Extraction};

pub mod arguments;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod errors;
pub mod extract;
pub mod generate;
pub mod syntax;

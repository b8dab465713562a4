//! Serverless service configuration.
//!
//! Only the keys this tool reads or writes are typed; everything else in the
//! file is kept in flattened mappings and written back untouched.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use thiserror::Error;

use crate::discovery::SchemaSource;

pub const DEFAULT_CONFIG_FILE: &str = "serverless.yml";

/// File the clean schema is written to, relative to the service path.
pub const CLEAN_SCHEMA_FILE: &str = ".serverless_schema.graphql";

pub const DEFAULT_SERVICE_ROLE: &str = "AppSyncServiceRole";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to parse configuration '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("Invalid configuration: neither \"schemaDir\" nor \"schema\" config was found")]
    MissingSchema,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(flatten)]
    pub rest: Mapping,
    #[serde(default, skip_serializing_if = "Mapping::is_empty")]
    pub functions: Mapping,
    #[serde(default)]
    pub custom: CustomConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomConfig {
    #[serde(rename = "appSync", default)]
    pub app_sync: AppSyncConfig,
    #[serde(flatten)]
    pub rest: Mapping,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSyncConfig {
    #[serde(flatten)]
    pub rest: Mapping,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_role: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_sources: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mapping_templates: Vec<Value>,
}

impl ServiceConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Resolves where the schema lives. `schemaDir` takes precedence over
    /// `schema`; both are relative to `service_path`.
    pub fn schema_source(&self, service_path: &Path) -> Result<SchemaSource, ConfigError> {
        let app_sync = &self.custom.app_sync;
        if let Some(dir) = &app_sync.schema_dir {
            return Ok(SchemaSource::Directory(service_path.join(dir)));
        }
        if let Some(file) = &app_sync.schema {
            return Ok(SchemaSource::File(service_path.join(file)));
        }
        Err(ConfigError::MissingSchema)
    }

    /// The configured service role, or [`DEFAULT_SERVICE_ROLE`].
    pub fn service_role(&self) -> &str {
        self.custom
            .app_sync
            .service_role
            .as_deref()
            .unwrap_or(DEFAULT_SERVICE_ROLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICE: &str = r#"
service: todo-api
provider:
  name: aws
functions:
  existing:
    handler: src/existing.default
custom:
  stage: dev
  appSync:
    name: todo
    schemaDir: schema
    schema: schema.graphql
    dataSources:
      - name: Table
        type: AMAZON_DYNAMODB
"#;

    #[test]
    fn test_unknown_keys_survive_a_round_trip() {
        let config = ServiceConfig::from_yaml_str(SERVICE).unwrap();
        assert_eq!(config.custom.app_sync.data_sources.len(), 1);
        assert!(config.rest.contains_key("service"));
        assert!(config.custom.rest.contains_key("stage"));
        assert!(config.custom.app_sync.rest.contains_key("name"));

        let reparsed = ServiceConfig::from_yaml_str(&config.to_yaml_string().unwrap()).unwrap();
        assert_eq!(reparsed, config);
    }

    #[test]
    fn test_schema_dir_wins_over_schema() {
        let config = ServiceConfig::from_yaml_str(SERVICE).unwrap();
        assert_eq!(
            config.schema_source(Path::new("/svc")).unwrap(),
            SchemaSource::Directory(PathBuf::from("/svc/schema"))
        );
    }

    #[test]
    fn test_single_file_schema_is_read_from_schema_key() {
        let config =
            ServiceConfig::from_yaml_str("custom:\n  appSync:\n    schema: api.graphql\n").unwrap();
        assert_eq!(
            config.schema_source(Path::new("svc")).unwrap(),
            SchemaSource::File(PathBuf::from("svc/api.graphql"))
        );
        assert_eq!(config.service_role(), DEFAULT_SERVICE_ROLE);
    }

    #[test]
    fn test_missing_schema_settings() {
        let config = ServiceConfig::from_yaml_str("service: bare\n").unwrap();
        let err = config.schema_source(Path::new(".")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration: neither \"schemaDir\" nor \"schema\" config was found"
        );
    }
}

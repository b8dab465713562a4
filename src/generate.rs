//! Deployment artifacts derived from extracted bindings.

use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::config::{ServiceConfig, CLEAN_SCHEMA_FILE, DEFAULT_SERVICE_ROLE};
use crate::extract::Binding;

pub const LAMBDA_DATA_SOURCE: &str = "AWS_LAMBDA";
pub const DEFAULT_TEMPLATES_DIR: &str = "mapping-templates";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionEntry {
    pub name: String,
    pub handler: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataSource {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub config: DataSourceConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceConfig {
    pub function_name: String,
    pub service_role_arn: GetAtt,
}

/// CloudFormation `Fn::GetAtt` reference to a resource attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetAtt {
    #[serde(rename = "Fn::GetAtt")]
    pub target: [String; 2],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingTemplate {
    pub data_source: String,
    #[serde(rename = "type")]
    pub parent_type: String,
    pub field: String,
    pub request: String,
    pub response: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    pub service_role: String,
    /// Directory holding `request.vtl` and `response.vtl`.
    pub templates: String,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            service_role: DEFAULT_SERVICE_ROLE.to_string(),
            templates: DEFAULT_TEMPLATES_DIR.to_string(),
        }
    }
}

/// Everything generated for a set of bindings, one entry of each kind per binding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Artifacts {
    pub functions: Vec<FunctionEntry>,
    pub data_sources: Vec<DataSource>,
    pub mapping_templates: Vec<MappingTemplate>,
}

impl Artifacts {
    pub fn from_bindings(bindings: &[Binding], options: &GenerateOptions) -> Self {
        let mut artifacts = Artifacts::default();
        for binding in bindings {
            let name = binding.qualified_name().to_string();

            artifacts.functions.push(FunctionEntry {
                name: name.clone(),
                handler: binding.handler().to_string(),
            });
            artifacts.data_sources.push(DataSource {
                name: name.clone(),
                kind: LAMBDA_DATA_SOURCE.to_string(),
                config: DataSourceConfig {
                    function_name: name.clone(),
                    service_role_arn: GetAtt {
                        target: [options.service_role.clone(), "Arn".to_string()],
                    },
                },
            });
            artifacts.mapping_templates.push(MappingTemplate {
                data_source: name,
                parent_type: binding.parent_type().to_string(),
                field: binding.field_name().to_string(),
                request: format!("{}/request.vtl", options.templates),
                response: format!("{}/response.vtl", options.templates),
            });
        }
        artifacts
    }

    /// Merges the artifacts into `config`, keeping what is already there.
    pub fn apply(&self, config: &mut ServiceConfig) -> Result<(), serde_yaml::Error> {
        config.functions.extend(functions_mapping(self)?);

        let app_sync = &mut config.custom.app_sync;
        for source in &self.data_sources {
            app_sync.data_sources.push(serde_yaml::to_value(source)?);
        }
        for template in &self.mapping_templates {
            app_sync.mapping_templates.push(serde_yaml::to_value(template)?);
        }
        app_sync.schema = Some(CLEAN_SCHEMA_FILE.to_string());
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// The `functions` block for these artifacts alone.
pub fn functions_mapping(artifacts: &Artifacts) -> Result<Mapping, serde_yaml::Error> {
    let mut mapping = Mapping::new();
    for function in &artifacts.functions {
        mapping.insert(
            Value::String(function.name.clone()),
            serde_yaml::to_value(function)?,
        );
    }
    Ok(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings() -> Vec<Binding> {
        vec![
            Binding::new("Query", "GetTodo", "Controllers/Todo/GetTodo.default"),
            Binding::new("Todo", "author", "Controllers/Todo/Author.default"),
        ]
    }

    #[test]
    fn test_one_entry_of_each_kind_per_binding() {
        let artifacts = Artifacts::from_bindings(&bindings(), &GenerateOptions::default());
        assert_eq!(artifacts.functions.len(), 2);
        assert_eq!(artifacts.data_sources.len(), 2);
        assert_eq!(artifacts.mapping_templates.len(), 2);

        let template = &artifacts.mapping_templates[1];
        assert_eq!(template.data_source, "Todo_author");
        assert_eq!(template.parent_type, "Todo");
        assert_eq!(template.field, "author");
        assert_eq!(template.request, "mapping-templates/request.vtl");
    }

    #[test]
    fn test_data_source_serializes_get_att() {
        let options = GenerateOptions {
            service_role: "Role".into(),
            ..GenerateOptions::default()
        };
        let artifacts = Artifacts::from_bindings(&bindings()[..1], &options);
        let yaml = serde_yaml::to_value(&artifacts.data_sources[0]).unwrap();
        let expected: Value = serde_yaml::from_str(
            "name: Query_GetTodo\n\
             type: AWS_LAMBDA\n\
             config:\n  functionName: Query_GetTodo\n  serviceRoleArn:\n    Fn::GetAtt: [Role, Arn]\n",
        )
        .unwrap();
        assert_eq!(yaml, expected);
    }

    #[test]
    fn test_apply_appends_and_points_at_clean_schema() {
        let mut config = ServiceConfig::from_yaml_str(
            "functions:\n  existing:\n    handler: a.b\n\
             custom:\n  appSync:\n    schemaDir: schema\n    dataSources:\n      - name: Table\n",
        )
        .unwrap();

        Artifacts::from_bindings(&bindings(), &GenerateOptions::default())
            .apply(&mut config)
            .unwrap();

        assert_eq!(config.functions.len(), 3);
        assert!(config.functions.contains_key("Query_GetTodo"));
        assert_eq!(config.custom.app_sync.data_sources.len(), 3);
        assert_eq!(config.custom.app_sync.mapping_templates.len(), 2);
        assert_eq!(config.custom.app_sync.schema.as_deref(), Some(CLEAN_SCHEMA_FILE));
        assert_eq!(config.custom.app_sync.schema_dir.as_deref(), Some("schema"));
    }

    #[test]
    fn test_functions_mapping_is_keyed_by_qualified_name() {
        let artifacts = Artifacts::from_bindings(&bindings(), &GenerateOptions::default());
        let mapping = functions_mapping(&artifacts).unwrap();
        let entry = mapping.get("Todo_author").unwrap();
        assert_eq!(
            entry.get("handler").and_then(Value::as_str),
            Some("Controllers/Todo/Author.default")
        );
    }
}

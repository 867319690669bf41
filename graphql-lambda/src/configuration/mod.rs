//! Logic for loading configuration in to an object model
use std::path::Path;
use std::path::PathBuf;

use displaydoc::Display;
use schemars::JsonSchema;
use schemars::r#gen::SchemaSettings;
use schemars::schema::RootSchema;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::engine::ResolverMap;
use crate::json_ext::Object;


/// Configuration error.
#[derive(Debug, Error, Display)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// {0} is required
    MissingOption(&'static str),
    /// could not read {path}: {error}
    CannotReadFile { path: String, error: std::io::Error },
    /// could not deserialize configuration: {0}
    DeserializeConfigError(serde_yaml::Error),
}

/// The configuration of a GraphQL Lambda.
///
/// Can be created through `serde::Deserialize` from YAML,
/// or inline in Rust code with `serde_json::json!` and `serde_json::from_value`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct Configuration {
    /// The schema, as GraphQL SDL.
    pub schema: Option<String>,

    /// Path of a file holding the schema, relative to the configuration file.
    /// Ignored when `schema` is set.
    pub schema_path: Option<PathBuf>,

    /// Logging options.
    pub logging: Logging,

    /// Static data for the fields of the query root type.
    #[schemars(with = "serde_json::Map<String, serde_json::Value>")]
    pub query: Object,

    /// Static data for the fields of the mutation root type.
    #[schemars(with = "serde_json::Map<String, serde_json::Value>")]
    pub mutation: Object,
}

/// Logging options.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, default)]
pub struct Logging {
    /// Output format of log lines.
    pub format: LogFormat,

    /// Log level filter, in `RUST_LOG` syntax (off|error|warn|info|debug|trace, per target).
    pub level: String,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: "info".to_string(),
        }
    }
}

/// Output format of log lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human readable text.
    Text,
    /// One JSON object per line, for CloudWatch Logs Insights.
    #[default]
    Json,
}

impl Configuration {
    /// Parse a configuration from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigurationError> {
        serde_yaml::from_str(yaml).map_err(ConfigurationError::DeserializeConfigError)
    }

    /// Read and parse a configuration file.
    ///
    /// A relative `schema_path` is resolved against the directory of the file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigurationError> {
        let mut configuration = Self::from_yaml(&read(path)?)?;
        if let (Some(schema_path), Some(parent)) = (&configuration.schema_path, path.parent()) {
            if schema_path.is_relative() {
                configuration.schema_path = Some(parent.join(schema_path));
            }
        }
        Ok(configuration)
    }

    /// The schema SDL, read from `schema_path` when not given inline.
    pub fn load_schema(&self) -> Result<String, ConfigurationError> {
        match (&self.schema, &self.schema_path) {
            (Some(schema), _) => Ok(schema.clone()),
            (None, Some(path)) => read(path),
            (None, None) => Err(ConfigurationError::MissingOption("schema")),
        }
    }

    /// Resolvers serving the configured static data.
    pub fn resolvers(&self) -> ResolverMap {
        ResolverMap::from_data(self.query.clone(), self.mutation.clone())
    }
}

fn read(path: &Path) -> Result<String, ConfigurationError> {
    std::fs::read_to_string(path).map_err(|error| ConfigurationError::CannotReadFile {
        path: path.display().to_string(),
        error,
    })
}

/// Generate a JSON schema for the configuration.
pub fn generate_config_schema() -> RootSchema {
    let settings = SchemaSettings::draft07().with(|s| {
        s.option_nullable = true;
        s.option_add_null_type = false;
        s.inline_subschemas = true;
    });
    let generator = settings.into_generator();
    generator.into_root_schema_for::<Configuration>()
}

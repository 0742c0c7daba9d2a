use std::path::Path;

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

use crate::catalog::DEFAULT_SCHEMA;

pub const ENV_PREFIX: &str = "SCHEMASPY";

#[derive(Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct SchemaspyConfig {
    pub catalog: Catalog,
    #[serde(default)]
    pub misc: Misc,
}

#[derive(Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct Catalog {
    pub dsn: String,
    #[serde(default = "default_schema")]
    pub schema: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

fn default_max_connections() -> u32 {
    4
}

#[derive(Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(default)]
pub struct Misc {
    /// Used when RUST_LOG isn't set.
    pub log_level: String,
}

impl Default for Misc {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

pub fn validate_config(config: SchemaspyConfig) -> Result<SchemaspyConfig, ConfigError> {
    if config.catalog.dsn.trim().is_empty() {
        return Err(ConfigError::Message(
            "catalog.dsn must point to a PostgreSQL database".to_string(),
        ));
    }
    if config.catalog.max_connections == 0 {
        return Err(ConfigError::Message(
            "catalog.max_connections must be greater than 0".to_string(),
        ));
    }
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<SchemaspyConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path))
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    config.build()?.try_deserialize().and_then(validate_config)
}

// Load a config from a string (to test our structs are defined correctly)
pub fn load_config_from_string(
    config_str: &str,
    skip_validation: bool,
) -> Result<SchemaspyConfig, ConfigError> {
    let config =
        Config::builder().add_source(File::from_str(config_str, FileFormat::Toml));

    if skip_validation {
        config.build()?.try_deserialize()
    } else {
        config.build()?.try_deserialize().and_then(validate_config)
    }
}

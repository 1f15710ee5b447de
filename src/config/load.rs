//! Loading graph configuration from YAML

use super::schema::GraphConfig;
use super::validate::validate_config;
use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

impl GraphConfig {
    /// Parse and validate a configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: GraphConfig = serde_yaml::from_str(yaml)
            .map_err(|e| Error::ConfigError(format!("Failed to parse YAML config: {}", e)))?;

        validate_config(&config).map_err(|e| Error::ConfigError(format!("Invalid config: {}", e)))?;

        Ok(config)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::Serialization(e.to_string()))
    }
}

/// Load graph configuration from a YAML file
///
/// # Example
///
/// ```no_run
/// use picograd::{config::load_config, Graph};
///
/// let graph = Graph::with_config(load_config("graph.yaml")?);
/// # Ok::<(), picograd::Error>(())
/// ```
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<GraphConfig> {
    let yaml_content = fs::read_to_string(config_path.as_ref()).map_err(|e| {
        Error::ConfigError(format!(
            "Failed to read config file {}: {}",
            config_path.as_ref().display(),
            e
        ))
    })?;

    GraphConfig::from_yaml_str(&yaml_content)
}

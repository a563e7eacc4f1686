use crate::error::{Error, Result};
use crate::registry::RegistrationPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Renderer configuration, usually read from a TOML file.
///
/// ```toml
/// [registry]
/// on_duplicate = "reject"
///
/// [output]
/// pretty = true
/// default_media_type = "application/ld+json"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// What happens when a model type is registered twice.
    #[serde(default)]
    pub on_duplicate: RegistrationPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Pretty-print rendered bodies.
    #[serde(default)]
    pub pretty: bool,
    /// Media type used when a request names none, or only a wildcard.
    #[serde(default = "default_media_type")]
    pub default_media_type: String,
}

fn default_media_type() -> String {
    "application/json".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: false,
            default_media_type: default_media_type(),
        }
    }
}

impl Config {
    /// Load config from `path`, falling back to defaults when it does not exist.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}

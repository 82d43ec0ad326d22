//! Tool configuration
//!
//! The configuration file is TOML. Parsing and environment overrides are pure;
//! reading the file is left to the caller.
//!
//! ```toml
//! backend = "gpt-3"
//!
//! [[filesets]]
//! name = "app1"
//! files = ["examples/app1/*.yaml"]
//!
//! [openai]
//! api_key = "sk-..."
//! ```

use crate::backend::{BloomConfig, GptJConfig, OpenAiConfig, OptConfig};
use serde::{Deserialize, Serialize};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".copilot-ops.toml";

pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_ORG_ID: &str = "OPENAI_ORG_ID";
pub const ENV_HUGGINGFACE_API_KEY: &str = "HUGGINGFACE_API_KEY";

/// Error type for configuration parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(String),

    #[error("fileset '{0}' is not defined in the configuration")]
    UnknownFileset(String),
}

/// A named group of file globs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fileset {
    pub name: String,
    #[serde(default)]
    pub files: Vec<String>,
}

/// One optional section per backend, plus the default backend and filesets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: Option<String>,
    #[serde(default)]
    pub filesets: Vec<Fileset>,
    #[serde(default)]
    pub openai: Option<OpenAiConfig>,
    #[serde(default)]
    pub gptj: Option<GptJConfig>,
    #[serde(default)]
    pub bloom: Option<BloomConfig>,
    #[serde(default)]
    pub opt: Option<OptConfig>,
}

impl Config {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply secrets from the environment through `lookup`.
    ///
    /// API keys create the matching section when it is absent and replace the
    /// key when it is present.
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(api_key) = non_empty(ENV_OPENAI_API_KEY) {
            match self.openai.as_mut() {
                Some(openai) => openai.api_key = api_key,
                None => self.openai = Some(OpenAiConfig::with_api_key(api_key)),
            }
        }

        if let Some(org_id) = non_empty(ENV_OPENAI_ORG_ID) {
            if let Some(openai) = self.openai.as_mut() {
                openai.org_id = Some(org_id);
            }
        }

        if let Some(api_key) = non_empty(ENV_HUGGINGFACE_API_KEY) {
            match self.bloom.as_mut() {
                Some(bloom) => bloom.api_key = api_key,
                None => self.bloom = Some(BloomConfig::with_api_key(api_key)),
            }
        }

        self
    }

    pub fn fileset(&self, name: &str) -> Result<&Fileset, ConfigError> {
        self.filesets
            .iter()
            .find(|fileset| fileset.name == name)
            .ok_or_else(|| ConfigError::UnknownFileset(name.to_string()))
    }
}

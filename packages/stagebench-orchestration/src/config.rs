//! Configuration (YAML file + environment overrides)
//!
//! ```yaml
//! version: 1
//! log_filter: "stagebench_orchestration=debug"
//! classification:
//!   failure_marker: error
//!   execution_marker: execution result
//! assistant:
//!   model: mistralai/Mixtral-8x7B-Instruct-v0.1
//!   temperature: 0.3
//! engine:
//!   program: ./build/engine
//! ```

use crate::classify::{DEFAULT_EXECUTION_MARKER, DEFAULT_FAILURE_MARKER};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const SUPPORTED_VERSIONS: &[u32] = &[1];
pub const ENV_LOG_FILTER: &str = "STAGEBENCH_LOG";
pub const ENV_ENGINE_PROGRAM: &str = "STAGEBENCH_ENGINE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing 'version' field in configuration file. Add 'version: 1' to the top of your YAML file.")]
    MissingVersion,

    #[error("Unsupported configuration version {found}. Supported versions: {}", SUPPORTED_VERSIONS.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", "))]
    UnsupportedVersion { found: u32 },

    #[error("Invalid range for field '{field}': {value} not in {min}..={max}")]
    Range {
        field: &'static str,
        value: String,
        min: String,
        max: String,
    },

    #[error("Classification marker '{0}' must not be empty")]
    EmptyMarker(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassificationConfig {
    pub failure_marker: String,
    pub execution_marker: String,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            failure_marker: DEFAULT_FAILURE_MARKER.to_string(),
            execution_marker: DEFAULT_EXECUTION_MARKER.to_string(),
        }
    }
}

/// Sampling settings for the code assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssistantConfig {
    pub model: String,
    pub system_prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: "mistralai/Mixtral-8x7B-Instruct-v0.1".to_string(),
            system_prompt: "You are a helpful assistant who writes C code.".to_string(),
            temperature: 0.3,
            max_tokens: 512,
            top_p: 0.95,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// External engine executable driven by `CommandEngine`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StagebenchConfig {
    pub version: u32,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub classification: ClassificationConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for StagebenchConfig {
    fn default() -> Self {
        Self {
            version: 1,
            log_filter: default_log_filter(),
            classification: ClassificationConfig::default(),
            assistant: AssistantConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl StagebenchConfig {
    /// Load from YAML file (v1 schema), validated
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        debug!("Loading configuration from {}", path.display());
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        // Check the version on the raw document first so a missing field gets
        // a clearer message than serde's "missing field"
        let raw: serde_yaml::Value = serde_yaml::from_str(content)?;
        let version = raw
            .get("version")
            .and_then(serde_yaml::Value::as_u64)
            .ok_or(ConfigError::MissingVersion)?;
        let version = u32::try_from(version).unwrap_or(u32::MAX);
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ConfigError::UnsupportedVersion { found: version });
        }

        let config: Self = serde_yaml::from_value(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Apply `STAGEBENCH_LOG` and `STAGEBENCH_ENGINE` when set
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(filter) = lookup(ENV_LOG_FILTER).filter(|v| !v.trim().is_empty()) {
            self.log_filter = filter;
        }
        if let Some(program) = lookup(ENV_ENGINE_PROGRAM).filter(|v| !v.trim().is_empty()) {
            self.engine.program = Some(PathBuf::from(program));
        }
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.classification.failure_marker.is_empty() {
            return Err(ConfigError::EmptyMarker("failure_marker"));
        }
        if self.classification.execution_marker.is_empty() {
            return Err(ConfigError::EmptyMarker("execution_marker"));
        }

        let assistant = &self.assistant;
        check_range("assistant.temperature", assistant.temperature, 0.0, 2.0)?;
        check_range("assistant.top_p", assistant.top_p, 0.0, 1.0)?;
        check_range("assistant.max_tokens", assistant.max_tokens, 1, 32_768)?;
        Ok(())
    }
}

fn check_range<T: PartialOrd + ToString>(
    field: &'static str,
    value: T,
    min: T,
    max: T,
) -> ConfigResult<()> {
    if value < min || value > max {
        return Err(ConfigError::Range {
            field,
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(())
}

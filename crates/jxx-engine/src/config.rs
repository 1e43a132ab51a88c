//! Translator configuration
//!
//! Loaded from `jxx.toml`. Every section and key is optional; missing keys
//! take the defaults below.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "jxx.toml";

/// Errors that can occur when loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// `[output]`
    pub output: OutputConfig,
    /// `[translate]`
    pub translate: TranslateConfig,
    /// `[log]`
    pub log: LogConfig,
}

/// Where and under which names the artifacts are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory
    pub directory: PathBuf,
    /// Header file name
    pub header: String,
    /// Implementation file name
    pub implementation: String,
    /// Runtime header included by the generated header
    pub runtime_header: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            header: "output.h".to_string(),
            implementation: "output.cc".to_string(),
            runtime_header: "java_lang.h".to_string(),
        }
    }
}

/// Translation switches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateConfig {
    /// Dotted name of the class whose `main` is the entry point
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_class: Option<String>,
    /// Emit `int main` forwarding to the Java entry point
    pub emit_main: bool,
    /// Reject private members used outside their class
    pub access_checks: bool,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            main_class: None,
            emit_main: true,
            access_checks: true,
        }
    }
}

/// Logging defaults, overridden by `JXX_LOG` and `--verbose`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing` filter directive
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl TranslatorConfig {
    /// Load and validate a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse and validate configuration text.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: TranslatorConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let output = &self.output;
        for (key, value) in [
            ("output.header", &output.header),
            ("output.implementation", &output.implementation),
            ("output.runtime_header", &output.runtime_header),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!("{} must not be empty", key)));
            }
        }
        if output.header == output.implementation {
            return Err(ConfigError::ValidationError(format!(
                "output.header and output.implementation are both '{}'",
                output.header
            )));
        }
        if let Some(main) = &self.translate.main_class {
            if main.is_empty() || main.split('.').any(str::is_empty) {
                return Err(ConfigError::ValidationError(format!(
                    "translate.main_class '{}' is not a qualified class name",
                    main
                )));
            }
        }
        Ok(())
    }
}

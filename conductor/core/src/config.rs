//! TOML Configuration File Support
//!
//! Centralized configuration loading for Nexus, from a TOML file at
//! `~/.config/nexus/config.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! The Gemini API key is only ever read from the environment
//! (`GEMINI_API_KEY`, falling back to `API_KEY`).
//!
//! # Example Configuration
//!
//! ```toml
//! [backend]
//! provider = "gemini"
//! model = "gemini-2.5-flash"
//! timeout_secs = 120
//!
//! [ollama]
//! host = "localhost"
//! port = 11434
//!
//! [generation]
//! concept_temperature = 0.8
//! script_temperature = 0.4
//!
//! [export]
//! output_dir = "~/nexus-builds"
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::{BackendConfig, GEMINI_BASE_URL};
use crate::concept::CONCEPT_TEMPERATURE;
use crate::conductor::{ConductorConfig, DEFAULT_MODEL};
use crate::script::SCRIPT_TEMPERATURE;

/// Default model when talking to Ollama
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// Provider
// =============================================================================

/// Which AI service to talk to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Google Gemini
    #[default]
    Gemini,
    /// Local Ollama server
    Ollama,
}

impl Provider {
    /// Model used when none is configured
    #[must_use]
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Gemini => DEFAULT_MODEL,
            Self::Ollama => DEFAULT_OLLAMA_MODEL,
        }
    }
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            other => Err(ConfigError::ValidationError(format!(
                "unknown provider '{other}' (expected 'gemini' or 'ollama')"
            ))),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::Ollama => write!(f, "ollama"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Backend section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendToml {
    /// `gemini` or `ollama`
    pub provider: Option<Provider>,

    /// Model identifier
    pub model: Option<String>,

    /// Gemini API base URL
    pub base_url: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Ollama section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaToml {
    /// Ollama host
    pub host: Option<String>,

    /// Ollama port
    pub port: Option<u16>,
}

/// Generation section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationToml {
    /// Temperature for the concept call
    pub concept_temperature: Option<f32>,

    /// Temperature for the script call
    pub script_temperature: Option<f32>,
}

/// Export section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportToml {
    /// Directory exported scripts are written to
    pub output_dir: Option<PathBuf>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NexusToml {
    /// Backend configuration section
    pub backend: BackendToml,

    /// Ollama configuration section
    pub ollama: OllamaToml,

    /// Generation configuration section
    pub generation: GenerationToml,

    /// Export configuration section
    pub export: ExportToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Resolved configuration
///
/// Use [`load_config`] to load configuration with proper priority handling.
#[derive(Clone, Debug)]
pub struct NexusConfig {
    /// AI service
    pub provider: Provider,

    /// Model override (provider default when `None`)
    pub model: Option<String>,

    /// Gemini API base URL
    pub base_url: String,

    /// Gemini API key (environment only)
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Ollama host
    pub ollama_host: String,

    /// Ollama port
    pub ollama_port: u16,

    /// Temperature for the concept call
    pub concept_temperature: f32,

    /// Temperature for the script call
    pub script_temperature: f32,

    /// Directory exported scripts are written to
    pub output_dir: PathBuf,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for NexusConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Gemini,
            model: None,
            base_url: GEMINI_BASE_URL.to_string(),
            api_key: None,
            timeout_secs: 120,
            ollama_host: "localhost".to_string(),
            ollama_port: 11434,
            concept_temperature: CONCEPT_TEMPERATURE,
            script_temperature: SCRIPT_TEMPERATURE,
            output_dir: PathBuf::from("."),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl NexusConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// The model that will actually be used
    #[must_use]
    pub fn effective_model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// Backend connection settings
    #[must_use]
    pub fn backend_config(&self) -> BackendConfig {
        match self.provider {
            Provider::Gemini => BackendConfig::Gemini {
                api_key: self.api_key.clone(),
                base_url: self.base_url.clone(),
                timeout_secs: self.timeout_secs,
            },
            Provider::Ollama => BackendConfig::Ollama {
                host: self.ollama_host.clone(),
                port: self.ollama_port,
                timeout_secs: self.timeout_secs,
            },
        }
    }

    /// Conductor settings
    #[must_use]
    pub fn conductor_config(&self) -> ConductorConfig {
        ConductorConfig {
            model: self.effective_model().to_string(),
            concept_temperature: self.concept_temperature,
            script_temperature: self.script_temperature,
            output_dir: self.output_dir.clone(),
        }
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("concept_temperature", self.concept_temperature),
            ("script_temperature", self.script_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be between 0.0 and 2.0, got {value}"
                )));
            }
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.model.as_deref().is_some_and(|m| m.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "model must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/nexus/config.toml` or
/// `~/.config/nexus/config.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("nexus").join("config.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
/// A missing config file is not an error (defaults are used).
pub fn load_config() -> Result<NexusConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<NexusConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration using `env` to look up environment variables
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_with_env<F>(path: Option<PathBuf>, env: F) -> Result<NexusConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = NexusConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: NexusToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env)?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut NexusConfig, toml: &NexusToml) {
    if let Some(provider) = toml.backend.provider {
        config.provider = provider;
    }
    if toml.backend.model.is_some() {
        config.model = toml.backend.model.clone();
    }
    if let Some(ref url) = toml.backend.base_url {
        config.base_url = url.clone();
    }
    if let Some(timeout) = toml.backend.timeout_secs {
        config.timeout_secs = timeout;
    }

    if let Some(ref host) = toml.ollama.host {
        config.ollama_host = host.clone();
    }
    if let Some(port) = toml.ollama.port {
        config.ollama_port = port;
    }

    if let Some(temperature) = toml.generation.concept_temperature {
        config.concept_temperature = temperature;
    }
    if let Some(temperature) = toml.generation.script_temperature {
        config.script_temperature = temperature;
    }

    if let Some(ref dir) = toml.export.output_dir {
        config.output_dir = expand_home(dir);
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config<F>(config: &mut NexusConfig, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    config.api_key = env("GEMINI_API_KEY")
        .or_else(|| env("API_KEY"))
        .filter(|k| !k.trim().is_empty());

    if let Some(provider) = env("NEXUS_PROVIDER") {
        config.provider = provider.parse()?;
        config.source = ConfigSource::Env;
    }
    if let Some(model) = env("NEXUS_MODEL") {
        config.model = Some(model);
        config.source = ConfigSource::Env;
    }
    if let Some(dir) = env("NEXUS_OUTPUT_DIR") {
        config.output_dir = expand_home(&PathBuf::from(dir));
        config.source = ConfigSource::Env;
    }
    if let Some(timeout) = env("NEXUS_TIMEOUT_SECS") {
        if let Ok(secs) = timeout.parse::<u64>() {
            config.timeout_secs = secs;
            config.source = ConfigSource::Env;
        } else {
            tracing::warn!(value = %timeout, "Ignoring non-numeric NEXUS_TIMEOUT_SECS");
        }
    }
    if let Some(host) = env("OLLAMA_HOST") {
        config.ollama_host = host;
        config.source = ConfigSource::Env;
    }
    if let Some(port) = env("OLLAMA_PORT") {
        if let Ok(p) = port.parse::<u16>() {
            config.ollama_port = p;
            config.source = ConfigSource::Env;
        } else {
            tracing::warn!(value = %port, "Ignoring invalid OLLAMA_PORT");
        }
    }

    Ok(())
}

/// Expand a leading `~` to the home directory
fn expand_home(path: &std::path::Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir().map_or_else(|| path.to_path_buf(), |home| home.join(rest)),
        Err(_) => path.to_path_buf(),
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Provider override
    pub provider: Option<Provider>,

    /// Model override
    pub model: Option<String>,

    /// Output directory override
    pub output_dir: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set provider override
    #[must_use]
    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set model override
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set output directory override
    #[must_use]
    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = Some(dir);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut NexusConfig) {
        if self.provider.is_some() || self.model.is_some() || self.output_dir.is_some() {
            config.source = ConfigSource::Cli;
        }

        if let Some(provider) = self.provider {
            config.provider = provider;
        }
        if let Some(ref model) = self.model {
            config.model = Some(model.clone());
        }
        if let Some(ref dir) = self.output_dir {
            config.output_dir = dir.clone();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Configuration system for the filter translation engine
//!
//! Loads configuration from:
//! 1. config.yaml - operational settings (model, cache, validation, logging)
//! 2. .env file - secrets (API keys)
//!
//! Environment variables always override config.yaml values.

use crate::locale::Locale;
use nlfilter_predicate::{FilterOperator, OperatorSet};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
}

/// Model backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model identifier sent to the backend
    pub model: String,

    /// Sampling temperature; low by default for structured output
    pub temperature: f32,

    /// Maximum output tokens per completion
    pub max_tokens: u32,

    /// Request timeout; an elapsed timeout counts as a provider failure
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.1,
            max_tokens: 500,
            timeout_secs: 30,
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,

    /// Time-to-live for cached predicate lists, in seconds
    pub ttl_secs: u64,

    /// Namespace prefix for cache keys
    pub prefix: String,

    /// Capacity bound for the bundled in-memory store
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 3600,
            prefix: "filament_nl_filter".to_string(),
            max_entries: 10_000,
        }
    }
}

/// Query validation rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Minimum query length in Unicode characters
    pub min_length: usize,

    /// Maximum query length in Unicode characters
    pub max_length: usize,

    /// Optional operator subset; `None` enables the full vocabulary
    #[serde(default)]
    pub enabled_operators: Option<Vec<FilterOperator>>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_length: 3,
            max_length: 500,
            enabled_operators: None,
        }
    }
}

impl ValidationConfig {
    /// The operator set used both to instruct the model and to validate
    /// its output.
    pub fn operator_set(&self) -> OperatorSet {
        match &self.enabled_operators {
            Some(subset) => OperatorSet::from_subset(subset),
            None => OperatorSet::all(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Master switch; when false no subscriber is installed
    pub enabled: bool,

    /// Log level (trace, debug, info, warn, error) or module-specific
    pub level: String,

    /// Output format: pretty, json, compact
    pub format: String,

    /// Output destination: stdout, file, both
    pub output: String,

    /// Directory for log files
    pub directory: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            format: "pretty".to_string(),
            output: "stdout".to_string(),
            directory: "./logs".to_string(),
        }
    }
}

/// Main engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Locale used when detection finds nothing in the query text
    #[serde(default)]
    pub default_locale: Locale,
}

impl Config {
    /// Load configuration from YAML file with environment variable overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Defaults plus environment variable overrides, for setups without a
    /// config file. Loads a `.env` file first if one is present, so
    /// `OPENAI_API_KEY` and `NL_FILTER_*` overrides defined there are
    /// visible.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(model) = std::env::var("NL_FILTER_MODEL") {
            self.model.model = model;
        }
        if let Ok(temperature) = std::env::var("NL_FILTER_TEMPERATURE") {
            if let Ok(value) = temperature.parse() {
                self.model.temperature = value;
            }
        }
        if let Ok(max_tokens) = std::env::var("NL_FILTER_MAX_TOKENS") {
            if let Ok(value) = max_tokens.parse() {
                self.model.max_tokens = value;
            }
        }
        if let Ok(timeout) = std::env::var("NL_FILTER_TIMEOUT_SECS") {
            if let Ok(value) = timeout.parse() {
                self.model.timeout_secs = value;
            }
        }

        if let Ok(enabled) = std::env::var("NL_FILTER_CACHE_ENABLED") {
            if let Ok(value) = enabled.parse() {
                self.cache.enabled = value;
            }
        }
        if let Ok(ttl) = std::env::var("NL_FILTER_CACHE_TTL") {
            if let Ok(value) = ttl.parse() {
                self.cache.ttl_secs = value;
            }
        }
        if let Ok(prefix) = std::env::var("NL_FILTER_CACHE_PREFIX") {
            self.cache.prefix = prefix;
        }

        if let Ok(min) = std::env::var("NL_FILTER_MIN_LENGTH") {
            if let Ok(value) = min.parse() {
                self.validation.min_length = value;
            }
        }
        if let Ok(max) = std::env::var("NL_FILTER_MAX_LENGTH") {
            if let Ok(value) = max.parse() {
                self.validation.max_length = value;
            }
        }

        if let Ok(tag) = std::env::var("NL_FILTER_LOCALE") {
            if let Some(locale) = Locale::from_tag(&tag) {
                self.default_locale = locale;
            }
        }

        if let Ok(enabled) = std::env::var("NL_FILTER_LOGGING") {
            if let Ok(value) = enabled.parse() {
                self.logging.enabled = value;
            }
        }
        if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Ok(output) = std::env::var("LOG_OUTPUT") {
            self.logging.output = output;
        }
        if let Ok(dir) = std::env::var("LOG_DIR") {
            self.logging.directory = dir;
        }
    }

    /// Get OpenAI API key from environment (must be in .env)
    pub fn openai_api_key() -> Result<String, ConfigError> {
        std::env::var("OPENAI_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))
    }
}

//! Configuration management for the `FoodMap` application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::FoodMapError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable the original deployment used for the interpreter key
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable the original deployment used for the geocoding token
pub const ENV_MAPBOX_TOKEN: &str = "MAPBOX_TOKEN";

/// Root configuration structure for the `FoodMap` application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodMapConfig {
    /// Text-understanding provider configuration
    #[serde(default)]
    pub interpreter: InterpreterConfig,
    /// Geocoding provider configuration
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Resource store configuration
    #[serde(default)]
    pub store: StoreConfig,
    /// Search behaviour
    #[serde(default)]
    pub search: SearchConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Text-understanding provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpreterConfig {
    /// API key, falls back to `OPENAI_API_KEY`
    pub api_key: Option<String>,
    /// Base URL of the chat-completions API
    #[serde(default = "default_interpreter_base_url")]
    pub base_url: String,
    /// Model used for query interpretation
    #[serde(default = "default_interpreter_model")]
    pub model: String,
    /// Request timeout in seconds
    #[serde(default = "default_interpreter_timeout")]
    pub timeout_seconds: u32,
    /// Transport-level retries for transient failures (0 disables retrying)
    #[serde(default)]
    pub max_retries: u32,
}

/// Geocoding provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Access token, falls back to `MAPBOX_TOKEN`
    pub access_token: Option<String>,
    /// Base URL of the geocoding API
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_geocoding_timeout")]
    pub timeout_seconds: u32,
    /// Transport-level retries for transient failures (0 disables retrying)
    #[serde(default)]
    pub max_retries: u32,
    /// Number of candidates requested from the provider
    #[serde(default = "default_geocoding_limit")]
    pub limit: u32,
}

/// Resource store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON file holding the food resources
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

/// Search orchestration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Timeout applied to each provider and store call
    #[serde(default = "default_search_timeout")]
    pub timeout_seconds: u32,
    /// Propagate geocoding failures instead of dropping coordinates
    #[serde(default)]
    pub strict_geocoding: bool,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Full OTLP/HTTP traces URL for span export, including the signal path,
    /// e.g. `http://localhost:4318/v1/traces`. The exporter posts to it as given.
    pub otlp_endpoint: Option<String>,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

// Default value functions
fn default_interpreter_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_interpreter_model() -> String {
    "gpt-4o".to_string()
}

fn default_interpreter_timeout() -> u32 {
    30
}

fn default_geocoding_base_url() -> String {
    "https://api.mapbox.com".to_string()
}

fn default_geocoding_timeout() -> u32 {
    10
}

fn default_geocoding_limit() -> u32 {
    1
}

fn default_store_path() -> PathBuf {
    PathBuf::from("food_items.json")
}

fn default_search_timeout() -> u32 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8080
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_interpreter_base_url(),
            model: default_interpreter_model(),
            timeout_seconds: default_interpreter_timeout(),
            max_retries: 0,
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            base_url: default_geocoding_base_url(),
            timeout_seconds: default_geocoding_timeout(),
            max_retries: 0,
            limit: default_geocoding_limit(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_search_timeout(),
            strict_geocoding: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            otlp_endpoint: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl InterpreterConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }
}

impl GeocodingConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }
}

impl SearchConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }
}

impl FoodMapConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // FOODMAP_GEOCODING__ACCESS_TOKEN style overrides
        builder = builder.add_source(
            Environment::with_prefix("FOODMAP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: FoodMapConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_credential_fallbacks();
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("foodmap").join("config.toml"))
    }

    /// Fill missing credentials from the plain provider environment variables
    pub fn apply_credential_fallbacks(&mut self) {
        if self.interpreter.api_key.is_none() {
            self.interpreter.api_key = env::var(ENV_OPENAI_API_KEY).ok();
        }
        if self.geocoding.access_token.is_none() {
            self.geocoding.access_token = env::var(ENV_MAPBOX_TOKEN).ok();
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.interpreter.base_url.is_empty() {
            self.interpreter.base_url = default_interpreter_base_url();
        }
        if self.interpreter.model.is_empty() {
            self.interpreter.model = default_interpreter_model();
        }
        if self.interpreter.timeout_seconds == 0 {
            self.interpreter.timeout_seconds = default_interpreter_timeout();
        }
        if self.geocoding.base_url.is_empty() {
            self.geocoding.base_url = default_geocoding_base_url();
        }
        if self.geocoding.timeout_seconds == 0 {
            self.geocoding.timeout_seconds = default_geocoding_timeout();
        }
        if self.geocoding.limit == 0 {
            self.geocoding.limit = default_geocoding_limit();
        }
        if self.search.timeout_seconds == 0 {
            self.search.timeout_seconds = default_search_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_credentials()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and tokens when they are provided
    pub fn validate_credentials(&self) -> Result<()> {
        if let Some(api_key) = &self.interpreter.api_key {
            if api_key.trim().is_empty() {
                return Err(FoodMapError::config(
                    "Interpreter API key cannot be empty if provided. Either remove it or provide a valid key.",
                )
                .into());
            }
        }

        if let Some(token) = &self.geocoding.access_token {
            if token.trim().is_empty() {
                return Err(FoodMapError::config(
                    "Geocoding access token cannot be empty if provided. Either remove it or provide a valid token.",
                )
                .into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        let timeouts = [
            ("Interpreter", self.interpreter.timeout_seconds),
            ("Geocoding", self.geocoding.timeout_seconds),
            ("Search", self.search.timeout_seconds),
        ];
        for (name, seconds) in timeouts {
            if seconds > 300 {
                return Err(FoodMapError::config(format!(
                    "{name} timeout cannot exceed 300 seconds"
                ))
                .into());
            }
        }

        if self.interpreter.max_retries > 10 || self.geocoding.max_retries > 10 {
            return Err(FoodMapError::config("Provider max retries cannot exceed 10").into());
        }

        if self.geocoding.limit > 10 {
            return Err(FoodMapError::config("Geocoding candidate limit cannot exceed 10").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(FoodMapError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(FoodMapError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let urls = [
            ("Interpreter", &self.interpreter.base_url),
            ("Geocoding", &self.geocoding.base_url),
        ];
        for (name, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(FoodMapError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        if let Some(endpoint) = &self.logging.otlp_endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(FoodMapError::config(
                    "OTLP endpoint must be a full HTTP or HTTPS traces URL",
                )
                .into());
            }
        }

        Ok(())
    }
}

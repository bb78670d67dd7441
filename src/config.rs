//! Configuration management for the weather assistant
//!
//! Handles loading configuration from files and environment variables,
//! and provides validation for all configuration settings.

use crate::WeatherAppError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "WEATHER_ASSISTANT_CONFIG";

/// Prefix for environment overrides, e.g. `WEATHER_ASSISTANT_SERVER__PORT=9000`
const ENV_PREFIX: &str = "WEATHER_ASSISTANT";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Open-Meteo endpoints and client settings
    pub upstream: UpstreamConfig,
    /// Unsplash photo search settings
    pub photos: PhotosConfig,
    /// Conversational model settings
    pub chat: ChatConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding a built frontend, served for non-API paths
    pub static_dir: Option<String>,
    /// Upper bound for handling one inbound request
    pub request_timeout_seconds: u32,
    /// Maximum accepted request body size
    pub max_body_bytes: usize,
    /// PEM certificate for TLS; TLS is enabled when both cert and key are set
    pub tls_cert: Option<String>,
    pub tls_key: Option<String>,
}

/// Open-Meteo endpoints and client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub geocoding_base_url: String,
    pub forecast_base_url: String,
    /// Timeout for every outbound call in seconds
    pub timeout_seconds: u32,
    pub user_agent: String,
}

/// Unsplash photo search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotosConfig {
    pub base_url: String,
    pub access_key: Option<String>,
}

/// Conversational model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    /// Upper bound on model/tool round trips for a single user message
    pub max_tool_rounds: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
    /// OTLP/HTTP collector endpoint; tracing export is off when unset
    pub otlp_endpoint: Option<String>,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_request_timeout() -> u32 {
    30
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_geocoding_base_url() -> String {
    "https://geocoding-api.open-meteo.com/v1".to_string()
}

fn default_forecast_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_upstream_timeout() -> u32 {
    10
}

fn default_user_agent() -> String {
    format!("weather-assistant/{}", crate::VERSION)
}

fn default_photos_base_url() -> String {
    "https://api.unsplash.com".to_string()
}

fn default_chat_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_chat_model() -> String {
    "claude-3-5-haiku-20241022".to_string()
}

fn default_chat_max_tokens() -> u32 {
    1024
}

fn default_max_tool_rounds() -> u32 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
            request_timeout_seconds: default_request_timeout(),
            max_body_bytes: default_max_body_bytes(),
            tls_cert: None,
            tls_key: None,
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            geocoding_base_url: default_geocoding_base_url(),
            forecast_base_url: default_forecast_base_url(),
            timeout_seconds: default_upstream_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for PhotosConfig {
    fn default() -> Self {
        Self {
            base_url: default_photos_base_url(),
            access_key: None,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: default_chat_base_url(),
            api_key: None,
            model: default_chat_model(),
            max_tokens: default_chat_max_tokens(),
            max_tool_rounds: default_max_tool_rounds(),
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

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        let explicit = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
        Self::load_from_path(explicit)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|p| p.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AppConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.apply_key_fallbacks();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weather-assistant").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.server.port == 0 {
            self.server.port = default_port();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        if self.server.max_body_bytes == 0 {
            self.server.max_body_bytes = default_max_body_bytes();
        }
        if self.upstream.geocoding_base_url.is_empty() {
            self.upstream.geocoding_base_url = default_geocoding_base_url();
        }
        if self.upstream.forecast_base_url.is_empty() {
            self.upstream.forecast_base_url = default_forecast_base_url();
        }
        if self.upstream.timeout_seconds == 0 {
            self.upstream.timeout_seconds = default_upstream_timeout();
        }
        if self.upstream.user_agent.is_empty() {
            self.upstream.user_agent = default_user_agent();
        }
        if self.photos.base_url.is_empty() {
            self.photos.base_url = default_photos_base_url();
        }
        if self.chat.base_url.is_empty() {
            self.chat.base_url = default_chat_base_url();
        }
        if self.chat.model.is_empty() {
            self.chat.model = default_chat_model();
        }
        if self.chat.max_tokens == 0 {
            self.chat.max_tokens = default_chat_max_tokens();
        }
        if self.chat.max_tool_rounds == 0 {
            self.chat.max_tool_rounds = default_max_tool_rounds();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Fill API keys from the conventional provider variables when not configured
    pub fn apply_key_fallbacks(&mut self) {
        if self.chat.api_key.is_none() {
            self.chat.api_key = non_empty_env("ANTHROPIC_API_KEY");
        }
        if self.photos.access_key.is_none() {
            self.photos.access_key = non_empty_env("UNSPLASH_ACCESS_KEY");
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Address the server binds to
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.upstream.timeout_seconds > 120 {
            return Err(
                WeatherAppError::config("Upstream timeout cannot exceed 120 seconds").into(),
            );
        }

        if self.server.request_timeout_seconds > 600 {
            return Err(
                WeatherAppError::config("Request timeout cannot exceed 600 seconds").into(),
            );
        }

        if self.chat.max_tool_rounds > 20 {
            return Err(WeatherAppError::config("Chat max tool rounds cannot exceed 20").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeatherAppError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WeatherAppError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let urls = [
            ("upstream.geocoding_base_url", &self.upstream.geocoding_base_url),
            ("upstream.forecast_base_url", &self.upstream.forecast_base_url),
            ("photos.base_url", &self.photos.base_url),
            ("chat.base_url", &self.chat.base_url),
        ];
        for (name, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(WeatherAppError::config(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        if self.server.tls_cert.is_some() != self.server.tls_key.is_some() {
            return Err(WeatherAppError::config(
                "server.tls_cert and server.tls_key must be set together",
            )
            .into());
        }

        Ok(())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

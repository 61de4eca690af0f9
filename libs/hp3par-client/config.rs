//! Session configuration
//!
//! Settings can be built in code or loaded from a YAML file, with a few
//! environment variables taking precedence over the file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Construction-time settings of a [`RestSession`](crate::RestSession)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// API root, e.g. `https://array:8080/api/v1`
    pub base_url: String,
    /// Skip TLS certificate validation
    #[serde(default)]
    pub insecure: bool,
    /// Overall per-request timeout in seconds (none when unset)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Exact timeout set through [`SessionConfig::timeout`]; wins over
    /// `timeout_secs`
    #[serde(skip)]
    timeout: Option<Duration>,
    /// Accepted for compatibility; timing is always recorded
    #[serde(default = "default_enable_timing")]
    pub enable_timing: bool,
    /// Emit every request and response at DEBUG level
    #[serde(default)]
    pub debug_logging: bool,
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_enable_timing() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl SessionConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            insecure: false,
            timeout_secs: None,
            timeout: None,
            enable_timing: true,
            debug_logging: false,
            log_level: default_log_level(),
        }
    }

    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    /// Set the per-request timeout, sub-second precision included
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self.timeout_secs = None;
        self
    }

    pub fn debug_logging(mut self, enabled: bool) -> Self {
        self.debug_logging = enabled;
        self
    }

    /// Per-request timeout, if configured
    pub fn request_timeout(&self) -> Option<Duration> {
        self.timeout.or_else(|| self.timeout_secs.map(Duration::from_secs))
    }

    /// Base URL with any trailing slashes removed
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Load configuration from a YAML file
    ///
    /// `HP3PAR_API_URL`, `HP3PAR_INSECURE` and `HP3PAR_DEBUG` override the
    /// corresponding file values when set.
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let yaml_content = std::fs::read_to_string(config_path)?;
        let mut config: SessionConfig = serde_yaml::from_str(&yaml_content)?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("HP3PAR_API_URL") {
            info!("Overriding API URL from environment variable");
            self.base_url = url;
        }
        if let Ok(flag) = std::env::var("HP3PAR_INSECURE") {
            self.insecure = parse_flag(&flag);
        }
        if let Ok(flag) = std::env::var("HP3PAR_DEBUG") {
            self.debug_logging = parse_flag(&flag);
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let url = self.normalized_base_url();
        if url.is_empty() {
            return Err(ConfigError::ValidationError(
                "base_url cannot be empty".to_string(),
            ));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "base_url must start with http:// or https://, got {}",
                url
            )));
        }

        if self.request_timeout() == Some(Duration::ZERO) {
            return Err(ConfigError::ValidationError(
                "timeout must be greater than 0".to_string(),
            ));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "log_level must be one of: {}",
                valid_levels.join(", ")
            )));
        }

        Ok(())
    }

    /// Log configuration summary
    pub fn log(&self) {
        info!("Configuration loaded:");
        info!("  API URL: {}", self.normalized_base_url());
        info!("  Insecure TLS: {}", self.insecure);
        match self.request_timeout() {
            Some(timeout) => info!("  Timeout: {:?}", timeout),
            None => info!("  Timeout: none"),
        }
        info!("  Debug logging: {}", self.debug_logging);
        info!("  Log level: {}", self.log_level);
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

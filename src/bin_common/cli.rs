//! CLI utilities for binaries
//!
//! Handles configuration path and credential lookup from environment
//! variables for all binary executables.

use hp3par_client::Credentials;
use std::path::PathBuf;

/// Type of configuration to load
#[derive(Debug, Clone)]
pub enum ConfigType {
    /// Session configuration (config/hp3par.yaml)
    Session,
    /// Custom path
    Custom(String),
}

impl ConfigType {
    /// Get the default path for this config type
    pub fn default_path(&self) -> &str {
        match self {
            ConfigType::Session => "config/hp3par.yaml",
            ConfigType::Custom(path) => path,
        }
    }

    /// Get the environment variable name for this config type
    pub fn env_var_name(&self) -> &str {
        "HP3PAR_CONFIG_PATH"
    }
}

/// Load configuration path from environment or use default
///
/// A `Custom` path always wins over the environment.
///
/// # Examples
/// ```
/// use hp3par_tools::bin_common::{load_config_from_env, ConfigType};
///
/// let path = load_config_from_env(ConfigType::Custom("array.yaml".to_string()));
/// assert_eq!(path.to_str(), Some("array.yaml"));
/// ```
pub fn load_config_from_env(config_type: ConfigType) -> PathBuf {
    if let ConfigType::Custom(path) = &config_type {
        return PathBuf::from(path);
    }

    std::env::var(config_type.env_var_name())
        .unwrap_or_else(|_| config_type.default_path().to_string())
        .into()
}

/// Read array credentials from `HP3PAR_USER` / `HP3PAR_PASSWORD`
///
/// Returns `None` unless both are set.
pub fn credentials_from_env() -> Option<Credentials> {
    let user = std::env::var("HP3PAR_USER").ok()?;
    let password = std::env::var("HP3PAR_PASSWORD").ok()?;
    Some(Credentials::new(user, password))
}

/// Parse command line arguments for a binary
///
/// Returns a vector of arguments (excluding the program name)
pub fn parse_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}

//! TOML configuration file I/O
//!
//! Handles loading and saving router configuration to/from TOML files
//! in the user's configuration directory.

use crate::config::RouterConfig;
use crate::error::{ConfigError, LuciError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Complete TOML configuration structure
///
/// Lists every router the client manages as `[[router]]` tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LuciConfig {
    /// Configured routers
    #[serde(rename = "router", default)]
    pub routers: Vec<RouterConfig>,
}

impl LuciConfig {
    /// Create a new configuration from a list of routers
    pub fn new(routers: Vec<RouterConfig>) -> Self {
        Self { routers }
    }

    /// Validate every router entry and reject duplicate hosts
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.routers.is_empty() {
            return Err(ConfigError::MissingField {
                field: "router".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for router in &self.routers {
            router.validate().map_err(|e| ConfigError::ValidationError {
                message: format!("router {:?}: {}", router.host, e),
            })?;

            if !seen.insert(router.host.as_str()) {
                return Err(ConfigError::ValidationError {
                    message: format!("duplicate router host: {}", router.host),
                });
            }
        }

        Ok(())
    }

    /// Find the configuration for a host
    pub fn router(&self, host: &str) -> Result<&RouterConfig, LuciError> {
        self.routers
            .iter()
            .find(|r| r.host == host)
            .ok_or_else(|| {
                LuciError::Config(ConfigError::UnknownHost {
                    host: host.to_string(),
                })
            })
    }

    /// Add a router, replacing any existing entry for the same host
    pub fn upsert_router(&mut self, router: RouterConfig) {
        match self.routers.iter_mut().find(|r| r.host == router.host) {
            Some(existing) => *existing = router,
            None => self.routers.push(router),
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, LuciError> {
        let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LuciError::Config(ConfigError::LoadFailed {
                path: path.to_string_lossy().to_string(),
            }),
            _ => LuciError::Config(ConfigError::IoError {
                message: format!("Failed to read config file: {}", e),
            }),
        })?;

        let config: LuciConfig = toml::from_str(&contents).map_err(|e| {
            LuciError::Config(ConfigError::ValidationError {
                message: format!("Failed to parse config file: {}", e),
            })
        })?;

        config.validate()?;

        for router in &config.routers {
            debug!(
                "Loaded router {}: use_ssl={}, verify_ssl={}, scan_interval={}s, timeout={}s",
                router.host,
                router.use_ssl,
                router.verify_ssl,
                router.scan_interval().as_secs(),
                router.timeout_secs
            );
        }

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &Path) -> Result<(), LuciError> {
        self.validate()?;

        let contents = toml::to_string_pretty(self)?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                LuciError::Config(ConfigError::IoError {
                    message: format!("Failed to create config directory: {}", e),
                })
            })?;
        }

        std::fs::write(path, contents).map_err(|_e| {
            LuciError::Config(ConfigError::SaveFailed {
                path: path.to_string_lossy().to_string(),
            })
        })?;

        info!("Saved {} router(s) to {:?}", self.routers.len(), path);
        Ok(())
    }
}

/// Default configuration file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Get the default configuration directory
///
/// Returns ~/.config/lucivpn, or LUCIVPN_CONFIG_DIR if set
pub fn get_config_dir() -> Result<PathBuf, LuciError> {
    // Allow tests to override config directory via environment variable
    if let Ok(config_dir) = std::env::var("LUCIVPN_CONFIG_DIR") {
        return Ok(PathBuf::from(config_dir));
    }

    let home = std::env::var("HOME").map_err(|_| {
        LuciError::Config(ConfigError::IoError {
            message: "HOME environment variable not set".to_string(),
        })
    })?;

    Ok(PathBuf::from(home).join(".config").join("lucivpn"))
}

/// Get the default configuration file path
pub fn get_config_path() -> Result<PathBuf, LuciError> {
    let config_dir = get_config_dir()?;
    Ok(config_dir.join(CONFIG_FILE_NAME))
}

/// Load configuration from the default TOML file
pub fn load_config() -> Result<LuciConfig, LuciError> {
    let config_path = get_config_path()?;
    LuciConfig::from_file(&config_path)
}

/// Save configuration to the default TOML file
pub fn save_config(config: &LuciConfig) -> Result<(), LuciError> {
    let config_path = get_config_path()?;
    config.to_file(&config_path)
}

/// Check if a configuration file exists
pub fn config_exists() -> Result<bool, LuciError> {
    let config_path = get_config_path()?;
    Ok(config_path.exists())
}

//! Configuration module
//!
//! Handles loading and saving router configuration from TOML files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod toml_config;

/// Shortest polling interval accepted, in seconds
pub const MIN_SCAN_INTERVAL_SECS: u64 = 60;

/// Polling interval used when none is configured, in seconds
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 600;

/// Request timeout used when none is configured, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Router connection configuration
///
/// One entry per OpenWRT router. The password is optional here; when absent
/// it is looked up in the system keyring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Router hostname or IP address, optionally with a port
    pub host: String,

    /// LuCI login user
    pub username: String,

    /// LuCI login password (prefer the keyring)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Talk to the router over https
    #[serde(default)]
    pub use_ssl: bool,

    /// Validate the router certificate when `use_ssl` is set
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,

    /// Seconds between polls
    #[serde(default = "default_scan_interval")]
    pub scan_interval_secs: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_verify_ssl() -> bool {
    true
}
fn default_scan_interval() -> u64 {
    DEFAULT_SCAN_INTERVAL_SECS
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl RouterConfig {
    /// Create a new router configuration with default options
    pub fn new(host: String, username: String) -> Self {
        Self {
            host,
            username,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("Host cannot be empty".to_string());
        }

        if !self
            .host
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '.' | '-' | ':' | '[' | ']'))
        {
            return Err("Host contains invalid characters".to_string());
        }

        if self.username.is_empty() {
            return Err("Username cannot be empty".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("Timeout cannot be zero".to_string());
        }

        Ok(())
    }

    /// Polling interval, clamped to the minimum
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs.max(MIN_SCAN_INTERVAL_SECS))
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            username: String::new(),
            password: None,
            use_ssl: false,
            verify_ssl: default_verify_ssl(),
            scan_interval_secs: DEFAULT_SCAN_INTERVAL_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

//! VPN instance state
//!
//! One OpenVPN section on a router, keyed by its UCI section name.

use chrono::{DateTime, Utc};

/// Last known state of one OpenVPN section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VpnInstance {
    name: String,
    enabled: bool,
    last_updated: DateTime<Utc>,
}

impl VpnInstance {
    /// Create an instance as first observed by a poll
    pub fn new(name: String, enabled: bool) -> Self {
        Self {
            name,
            enabled,
            last_updated: Utc::now(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// When the enabled flag was last written from router state
    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Record a state read from the router
    ///
    /// Returns `true` when the flag changed.
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        let changed = self.enabled != enabled;
        self.enabled = enabled;
        self.last_updated = Utc::now();
        changed
    }
}

impl std::fmt::Display for VpnInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = if self.enabled { "on" } else { "off" };
        write!(f, "{}: {}", self.name, state)
    }
}

/// Interpret a UCI `enabled` option value
///
/// Only the string `"1"` means enabled; anything else, including a missing
/// value, is disabled.
pub fn parse_enabled(value: Option<&serde_json::Value>) -> bool {
    matches!(value, Some(serde_json::Value::String(s)) if s == "1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_enabled() {
        assert!(parse_enabled(Some(&json!("1"))));
        assert!(!parse_enabled(Some(&json!("0"))));
        assert!(!parse_enabled(Some(&json!("yes"))));
        assert!(!parse_enabled(Some(&json!(1))));
        assert!(!parse_enabled(Some(&json!(null))));
        assert!(!parse_enabled(None));
    }

    #[test]
    fn test_set_enabled_reports_change() {
        let mut instance = VpnInstance::new("home".to_string(), false);
        assert!(instance.set_enabled(true));
        assert!(!instance.set_enabled(true));
        assert!(instance.is_enabled());
    }

    #[test]
    fn test_set_enabled_stamps_update() {
        let mut instance = VpnInstance::new("home".to_string(), false);
        let first = instance.last_updated();
        instance.set_enabled(false);
        assert!(instance.last_updated() >= first);
    }

    #[test]
    fn test_display() {
        assert_eq!(VpnInstance::new("home".to_string(), true).to_string(), "home: on");
        assert_eq!(VpnInstance::new("work".to_string(), false).to_string(), "work: off");
    }
}

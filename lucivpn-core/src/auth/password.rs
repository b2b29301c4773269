//! Router password resolution
//!
//! A password written in the config file wins; otherwise the keyring entry
//! for `username@host` is used.

use crate::auth::keyring;
use crate::config::RouterConfig;
use crate::error::LuciError;
use crate::types::RouterPassword;
use tracing::debug;

/// Resolve the login password for a router
///
/// # Errors
///
/// Returns `KeyringError::PasswordNotFound` when the config has no password
/// and the keyring holds none either.
pub fn resolve_password(config: &RouterConfig) -> Result<RouterPassword, LuciError> {
    if let Some(password) = &config.password {
        debug!("Using password from config file for {}", config.host);
        return Ok(RouterPassword::new(password.clone()));
    }

    debug!("Looking up password for {} in keyring", config.host);
    keyring::retrieve_password(&config.username, &config.host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_password_wins() {
        let mut config = RouterConfig::new("resolve-config.lan".to_string(), "root".to_string());
        config.password = Some("from-file".to_string());
        keyring::store_password("root", "resolve-config.lan", &RouterPassword::from("from-keyring"))
            .unwrap();

        assert_eq!(resolve_password(&config).unwrap().expose(), "from-file");
    }

    #[test]
    fn test_falls_back_to_keyring() {
        let config = RouterConfig::new("resolve-keyring.lan".to_string(), "root".to_string());
        keyring::store_password("root", "resolve-keyring.lan", &RouterPassword::from("stored"))
            .unwrap();

        assert_eq!(resolve_password(&config).unwrap().expose(), "stored");
    }

    #[test]
    fn test_missing_everywhere_is_error() {
        let config = RouterConfig::new("resolve-none.lan".to_string(), "root".to_string());
        assert!(resolve_password(&config).is_err());
    }
}

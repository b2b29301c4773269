//! Type definitions and wrappers for secure data handling
//!
//! This module provides type-safe wrappers for sensitive data using the
//! secrecy crate to prevent accidental exposure in logs or debug output.

use secrecy::{ExposeSecret, Secret};

/// Wrapper for the router login password
///
/// Held by the session for the lifetime of the client so the token can be
/// reacquired without asking the operator again.
#[derive(Clone, Debug)]
pub struct RouterPassword(Secret<String>);

impl RouterPassword {
    /// Create a new RouterPassword
    pub fn new(password: String) -> Self {
        Self(Secret::new(password))
    }

    /// Expose the password value (use with caution!)
    ///
    /// This should only be called when building the login request.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl From<String> for RouterPassword {
    fn from(password: String) -> Self {
        Self::new(password)
    }
}

impl From<&str> for RouterPassword {
    fn from(password: &str) -> Self {
        Self::new(password.to_string())
    }
}

/// Wrapper for the LuCI session token issued at login
#[derive(Clone, Debug)]
pub struct AuthToken(Secret<String>);

impl AuthToken {
    /// Create a new AuthToken from the login result
    pub fn new(token: String) -> Self {
        Self(Secret::new(token))
    }

    /// Expose the token value
    ///
    /// Only the RPC transport should need this, to attach it to a request.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

/// Keyring service name for router passwords
pub const KEYRING_SERVICE_ROUTER: &str = "lucivpn-router";

/// UCI config holding the OpenVPN sections
pub const OPENVPN_CONFIG: &str = "openvpn";

/// UCI option toggling an OpenVPN section
pub const ENABLED_OPTION: &str = "enabled";

/// Path of the LuCI login endpoint, relative to the router base URL
pub const LUCI_RPC_AUTH_PATH: &str = "/cgi-bin/luci/rpc/auth";

/// Path of the LuCI UCI endpoint, relative to the router base URL
pub const LUCI_RPC_UCI_PATH: &str = "/cgi-bin/luci/rpc/uci";

/// Build the keyring account name for a router login
pub fn keyring_account(username: &str, host: &str) -> String {
    format!("{}@{}", username, host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_debug_is_redacted() {
        let password = RouterPassword::from("hunter2");
        let debug = format!("{:?}", password);
        assert!(!debug.contains("hunter2"));
        assert_eq!(password.expose(), "hunter2");
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = AuthToken::new("0123abcd".to_string());
        assert!(!format!("{:?}", token).contains("0123abcd"));
    }

    #[test]
    fn test_keyring_account() {
        assert_eq!(keyring_account("root", "192.168.1.1"), "root@192.168.1.1");
    }
}

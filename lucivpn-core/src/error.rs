//! Error types for the lucivpn client
//!
//! This module defines all error types used throughout the application,
//! providing consistent error handling and user-friendly error messages.

use thiserror::Error;

/// Main error type for the lucivpn application
#[derive(Error, Debug)]
pub enum LuciError {
    /// Errors related to configuration loading/parsing
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Errors related to keyring operations
    #[error("Keyring error: {0}")]
    Keyring(#[from] KeyringError),

    /// Login or token refresh failures
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Failures of UCI calls against the router
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// The router has no OpenVPN section with this name
    #[error("No OpenVPN instance named {name} on {host}")]
    UnknownInstance { host: String, name: String },

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {path}")]
    LoadFailed { path: String },

    #[error("Failed to save configuration file: {path}")]
    SaveFailed { path: String },

    #[error("Missing required configuration field: {field}")]
    MissingField { field: String },

    #[error("Configuration validation error: {message}")]
    ValidationError { message: String },

    #[error("No router configured for host: {host}")]
    UnknownHost { host: String },

    #[error("I/O error: {message}")]
    IoError { message: String },
}

/// System keyring operation errors
#[derive(Error, Debug)]
pub enum KeyringError {
    #[error("Keyring service unavailable")]
    ServiceUnavailable,

    #[error("Failed to store credential in keyring")]
    StoreFailed,

    #[error("Router password not found in keyring")]
    PasswordNotFound,
}

/// Login and token refresh errors
///
/// Any of these is fatal for the affected router; nothing retries them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Login rejected by {host}: check username and password")]
    Rejected { host: String },

    #[error("Router {host} is unreachable: {reason}")]
    Unreachable { host: String, reason: String },

    #[error("LuCI RPC module missing on {host}: install luci-mod-rpc")]
    RpcModuleMissing { host: String },

    #[error("Unexpected login response from {host}: {reason}")]
    Protocol { host: String, reason: String },

    #[error("Invalid router address {host}: {reason}")]
    InvalidAddress { host: String, reason: String },

    #[error("Failed to build HTTP client: {reason}")]
    ClientBuild { reason: String },
}

/// UCI call errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    #[error("Router rejected the session token")]
    InvalidToken,

    #[error("Token refresh failed: {0}")]
    Refresh(#[from] AuthError),

    #[error("Router denied access to the UCI API")]
    Unauthorized,

    #[error("LuCI RPC module missing: install luci-mod-rpc")]
    RpcModuleMissing,

    #[error("Network error: {reason}")]
    Network { reason: String },

    #[error("Unexpected HTTP status {status}")]
    Status { status: u16 },

    #[error("Malformed response: {reason}")]
    MalformedResponse { reason: String },

    #[error("Router returned an error: {message}")]
    Remote { message: String },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, LuciError>;

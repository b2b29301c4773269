//! Keyring operations for secure credential storage
//!
//! Uses the system keyring (Secret Service on Linux) to store and retrieve
//! router passwords, keyed by `username@host`.

use crate::error::{KeyringError, LuciError};
use crate::types::{keyring_account, RouterPassword, KEYRING_SERVICE_ROUTER};
use keyring::Entry;

fn entry(username: &str, host: &str) -> Result<Entry, LuciError> {
    Entry::new(KEYRING_SERVICE_ROUTER, &keyring_account(username, host))
        .map_err(|_| LuciError::Keyring(KeyringError::ServiceUnavailable))
}

/// Store a router password in the system keyring
pub fn store_password(
    username: &str,
    host: &str,
    password: &RouterPassword,
) -> Result<(), LuciError> {
    entry(username, host)?
        .set_password(password.expose())
        .map_err(|_| LuciError::Keyring(KeyringError::StoreFailed))
}

/// Retrieve a router password from the system keyring
pub fn retrieve_password(username: &str, host: &str) -> Result<RouterPassword, LuciError> {
    entry(username, host)?
        .get_password()
        .map(RouterPassword::new)
        .map_err(|_| LuciError::Keyring(KeyringError::PasswordNotFound))
}

/// Check if a password exists in the keyring for the given router login
pub fn has_password(username: &str, host: &str) -> Result<bool, LuciError> {
    match entry(username, host)?.get_password() {
        Ok(_) => Ok(true),
        Err(_) => Ok(false),
    }
}

/// Delete a router password from the keyring
pub fn delete_password(username: &str, host: &str) -> Result<(), LuciError> {
    match entry(username, host)?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(_) => Err(LuciError::Keyring(KeyringError::ServiceUnavailable)),
    }
}

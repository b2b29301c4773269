//! Mock keyring implementation for testing
//!
//! Provides an in-memory keyring implementation that doesn't require
//! system keyring access. Used in CI environments and for testing.

use crate::error::{KeyringError, LuciError};
use crate::types::{keyring_account, RouterPassword, KEYRING_SERVICE_ROUTER};
use std::collections::HashMap;
use std::sync::Mutex;

lazy_static::lazy_static! {
    static ref MOCK_KEYRING: Mutex<HashMap<String, String>> = Mutex::new(HashMap::new());
}

/// Generate a key for the mock keyring
fn make_key(username: &str, host: &str) -> String {
    format!("{}:{}", KEYRING_SERVICE_ROUTER, keyring_account(username, host))
}

/// Store a router password in the mock keyring
pub fn store_password(
    username: &str,
    host: &str,
    password: &RouterPassword,
) -> Result<(), LuciError> {
    let mut keyring = MOCK_KEYRING
        .lock()
        .map_err(|_| LuciError::Keyring(KeyringError::StoreFailed))?;
    keyring.insert(make_key(username, host), password.expose().to_string());
    Ok(())
}

/// Retrieve a router password from the mock keyring
pub fn retrieve_password(username: &str, host: &str) -> Result<RouterPassword, LuciError> {
    let keyring = MOCK_KEYRING
        .lock()
        .map_err(|_| LuciError::Keyring(KeyringError::ServiceUnavailable))?;
    keyring
        .get(&make_key(username, host))
        .cloned()
        .map(RouterPassword::new)
        .ok_or(LuciError::Keyring(KeyringError::PasswordNotFound))
}

/// Check if a password exists in the mock keyring
pub fn has_password(username: &str, host: &str) -> Result<bool, LuciError> {
    let keyring = MOCK_KEYRING
        .lock()
        .map_err(|_| LuciError::Keyring(KeyringError::ServiceUnavailable))?;
    Ok(keyring.contains_key(&make_key(username, host)))
}

/// Delete a router password from the mock keyring
pub fn delete_password(username: &str, host: &str) -> Result<(), LuciError> {
    let mut keyring = MOCK_KEYRING
        .lock()
        .map_err(|_| LuciError::Keyring(KeyringError::StoreFailed))?;
    keyring.remove(&make_key(username, host));
    Ok(())
}

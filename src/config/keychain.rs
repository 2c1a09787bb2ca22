use keyring::Entry;
use tracing::{debug, info, warn};

use crate::error::SeraError;

pub const KEYCHAIN_SERVICE: &str = "sera-gemini-api";
pub const KEYCHAIN_USER: &str = "sera";
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

fn entry() -> Result<Entry, SeraError> {
    Entry::new(KEYCHAIN_SERVICE, KEYCHAIN_USER).map_err(|e| {
        warn!("Failed to create keyring entry for {}: {}", KEYCHAIN_SERVICE, e);
        SeraError::from(e)
    })
}

pub fn set_api_key(key: &str) -> Result<(), SeraError> {
    info!("Setting API key for service: {}", KEYCHAIN_SERVICE);
    entry()?.set_password(key).map_err(|e| {
        warn!("Failed to set password for {}: {}", KEYCHAIN_SERVICE, e);
        SeraError::from(e)
    })
}

pub fn get_api_key() -> Result<Option<String>, SeraError> {
    debug!("Getting API key for service: {}", KEYCHAIN_SERVICE);
    match entry()?.get_password() {
        Ok(password) => Ok(Some(password)),
        Err(keyring::Error::NoEntry) => {
            info!("No API key found for service: {}", KEYCHAIN_SERVICE);
            Ok(None)
        }
        Err(e) => {
            warn!("Failed to get password for {}: {}", KEYCHAIN_SERVICE, e);
            Err(e.into())
        }
    }
}

/// Remove the stored key. Removing a key that is not there succeeds.
pub fn delete_api_key() -> Result<(), SeraError> {
    info!("Deleting API key for service: {}", KEYCHAIN_SERVICE);
    match entry()?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => {
            warn!("Failed to delete credential for {}: {}", KEYCHAIN_SERVICE, e);
            Err(e.into())
        }
    }
}

/// Pick the first non-empty key from the environment, then the keychain.
fn first_key(
    env_value: Option<String>,
    keychain: impl FnOnce() -> Result<Option<String>, SeraError>,
) -> Option<String> {
    if let Some(key) = env_value.filter(|k| !k.trim().is_empty()) {
        debug!("Using API key from {}", API_KEY_ENV);
        return Some(key.trim().to_string());
    }
    match keychain() {
        Ok(key) => key.filter(|k| !k.trim().is_empty()),
        Err(e) => {
            warn!("Keychain unavailable, continuing without API key: {}", e);
            None
        }
    }
}

/// Resolve the API key: `GEMINI_API_KEY`, then the OS keychain, else none.
///
/// Keychain failures are logged and treated as "no key".
pub fn resolve_api_key() -> Option<String> {
    first_key(std::env::var(API_KEY_ENV).ok(), get_api_key)
}

use anyhow::{bail, Result};
use serde::Serialize;

use crate::config::{delete_api_key, get_api_key, set_api_key, API_KEY_ENV, KEYCHAIN_SERVICE};

use super::args::KeyAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeySource {
    Env,
    Keychain,
    None,
}

/// Where the API key would come from. Never contains the key.
#[derive(Debug, Clone, Serialize)]
pub struct KeyStatus {
    pub configured: bool,
    pub source: KeySource,
    pub service: &'static str,
}

fn key_source(env_value: Option<&str>, keychain_value: Option<&str>) -> KeySource {
    let present = |v: Option<&str>| v.is_some_and(|k| !k.trim().is_empty());
    if present(env_value) {
        KeySource::Env
    } else if present(keychain_value) {
        KeySource::Keychain
    } else {
        KeySource::None
    }
}

pub fn status() -> Result<KeyStatus> {
    let env_value = std::env::var(API_KEY_ENV).ok();
    let keychain_value = match env_value.as_deref() {
        Some(v) if !v.trim().is_empty() => None,
        _ => get_api_key()?,
    };
    let source = key_source(env_value.as_deref(), keychain_value.as_deref());
    Ok(KeyStatus {
        configured: source != KeySource::None,
        source,
        service: KEYCHAIN_SERVICE,
    })
}

pub fn run(action: &KeyAction) -> Result<KeyStatus> {
    match action {
        KeyAction::Set(value) => {
            if value.trim().is_empty() {
                bail!("API key must not be empty");
            }
            set_api_key(value.trim())?;
        }
        KeyAction::Delete => delete_api_key()?,
        KeyAction::Status => {}
    }
    status()
}

//! User settings and API credentials.
//!
//! Settings live in `<config_dir>/sera/config.toml`. Every field has a
//! default, so a missing file or a partial file is fine.

mod keychain;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::{EnrichmentBatch, EvaluationOptions};

pub use keychain::{
    delete_api_key, get_api_key, resolve_api_key, set_api_key, API_KEY_ENV, KEYCHAIN_SERVICE,
    KEYCHAIN_USER,
};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Gemini model name
    pub model: String,
    pub use_enrichment: bool,
    pub max_recommendations: usize,
    pub enrichment_batch_size: usize,
    pub enrichment_batch_delay_ms: u64,
    pub request_timeout_secs: u64,
    /// Use canned responses even when a key is configured
    pub mock_mode: bool,
    /// Where the snapshot database lives; platform data dir when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// Custom rule table; the embedded table when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            use_enrichment: false,
            max_recommendations: 50,
            enrichment_batch_size: 5,
            enrichment_batch_delay_ms: 1000,
            request_timeout_secs: 60,
            mock_mode: false,
            data_dir: None,
            rules_path: None,
        }
    }
}

impl Settings {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sera").join("config.toml"))
    }

    /// Load from the default location, falling back to defaults.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("No platform config dir, using default settings");
                Ok(Self::default())
            }
        }
    }

    /// Load from `path`. A missing file yields defaults; a malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings: Settings = toml::from_str(&content)
            .with_context(|| format!("Invalid settings file {}", path.display()))?;
        info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings file {}", path.display()))?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }

    pub fn evaluation_options(&self) -> EvaluationOptions {
        EvaluationOptions {
            use_enrichment: self.use_enrichment,
            max_recommendations: self.max_recommendations,
        }
    }

    pub fn enrichment_batch(&self) -> EnrichmentBatch {
        EnrichmentBatch {
            size: self.enrichment_batch_size.max(1),
            delay: Duration::from_millis(self.enrichment_batch_delay_ms),
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join("sera")))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir().join("sera.db")
    }
}

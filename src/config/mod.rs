// src/config/mod.rs
// Persisted maintenance settings. One record per site, stored as JSON under a
// single key and always written as a full replacement.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::store::{KeyValueStore, StoreError};

mod runtime;

pub use runtime::RuntimeEnv;

pub const SETTINGS_KEY: &str = "pdmiuc_settings";
pub const VERSION_KEY: &str = "pdmiuc_version";
/// Written to `VERSION_KEY` on activation.
pub const PLUGIN_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("stored settings are not valid JSON: {0}")]
    Invalid(#[from] serde_json::Error),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Store(_) => "Key-value store error",
            ConfigError::Invalid(_) => "Settings unavailable (invalid stored record)",
        }
    }
}

/// What the maintenance page shows.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisplayType {
    #[default]
    Text,
    Image,
}

impl DisplayType {
    pub fn as_str(self) -> &'static str {
        match self {
            DisplayType::Text => "text",
            DisplayType::Image => "image",
        }
    }

    /// Exact, case-sensitive match on the two accepted values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(DisplayType::Text),
            "image" => Some(DisplayType::Image),
            _ => None,
        }
    }
}

fn lenient_display_type<'de, D>(deserializer: D) -> Result<DisplayType, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(|v| v.as_str())
        .and_then(DisplayType::parse)
        .unwrap_or_default())
}

/// Settings record. Missing fields read as their defaults.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub allowed_ips: Vec<String>,
    #[serde(default, deserialize_with = "lenient_display_type")]
    pub display_type: DisplayType,
    #[serde(default)]
    pub text_content: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub access_password_hash: String,
}

impl Config {
    /// Loads the settings record, returning defaults when none has been saved yet.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Result<Self, ConfigError> {
        match store.get(SETTINGS_KEY)? {
            Some(raw) => Ok(serde_json::from_slice::<Config>(&raw)?),
            None => Ok(Config::default()),
        }
    }

    /// Like `load`, but any failure degrades to the inert default record.
    pub fn load_or_default<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        Config::load(store).unwrap_or_else(|err| {
            warn!(error = %err, "falling back to default maintenance settings");
            Config::default()
        })
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &S) -> Result<(), ConfigError> {
        let value = serde_json::to_vec(self)?;
        store.set(SETTINGS_KEY, &value)?;
        Ok(())
    }

    pub fn has_password(&self) -> bool {
        !self.access_password_hash.is_empty()
    }

    /// The image variant only renders when a URL is actually configured.
    pub fn shows_image(&self) -> bool {
        self.display_type == DisplayType::Image && !self.image_url.is_empty()
    }
}

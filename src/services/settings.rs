use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";
pub const DEFAULT_MAX_MESSAGES: usize = 50;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Upper bound for the recent-messages query.
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_messages() -> usize {
    DEFAULT_MAX_MESSAGES
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            max_messages: DEFAULT_MAX_MESSAGES,
        }
    }
}

impl Settings {
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &if self.has_api_key() { "***" } else { "" })
            .field("model", &self.model)
            .field("max_messages", &self.max_messages)
            .finish()
    }
}

pub struct SettingsService;

impl SettingsService {
    /// Missing or unreadable settings fall back to defaults.
    pub fn load(path: &Path) -> Settings {
        if !path.exists() {
            return Settings::default();
        }

        match fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), "Ignoring malformed settings: {}", e);
                Settings::default()
            }),
            Err(e) => {
                tracing::warn!(path = %path.display(), "Failed to read settings: {}", e);
                Settings::default()
            }
        }
    }

    pub fn save(path: &Path, settings: &Settings) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create data directory: {}", parent.display())
            })?;
        }
        let json = serde_json::to_string_pretty(settings)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

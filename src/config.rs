use std::path::PathBuf;

use anyhow::{bail, Result};

pub const APP_ID: &str = "nova";

/// Portable installs point this at the directory holding the executable.
pub const DATA_DIR_ENV: &str = "NOVA_DATA_DIR";

pub const SNAPSHOT_FILE: &str = "conversations.json";
pub const LEGACY_SNAPSHOT_FILE: &str = "chats.json";
pub const SETTINGS_FILE: &str = "settings.json";

/// Resolve the directory that holds the snapshot and settings files.
pub fn data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }

    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        if !xdg.trim().is_empty() {
            return Ok(PathBuf::from(xdg).join(APP_ID));
        }
    }

    match std::env::var("HOME") {
        Ok(home) => Ok(PathBuf::from(home).join(".local/share").join(APP_ID)),
        Err(_) => bail!("Cannot resolve data directory: neither {DATA_DIR_ENV}, XDG_DATA_HOME nor HOME is set"),
    }
}

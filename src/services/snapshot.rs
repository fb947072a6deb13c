use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::{LEGACY_SNAPSHOT_FILE, SNAPSHOT_FILE};
use crate::error::{NovaError, NovaResult};
use crate::models::{Chat, Project};

/// Current on-disk schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub chats_without_project: Vec<Chat>,
}

impl Snapshot {
    /// Wrap a v1 chat list: every chat becomes unfiled, order preserved.
    pub fn from_legacy(chats: Vec<Chat>) -> Self {
        Self {
            projects: Vec::new(),
            chats_without_project: chats,
        }
    }
}

/// Parse a v1 snapshot (a bare JSON array of chats) into the current schema.
pub fn migrate_legacy(raw: &str) -> NovaResult<Snapshot> {
    let chats: Vec<Chat> =
        serde_json::from_str(raw).map_err(|e| NovaError::Migration(e.to_string()))?;
    Ok(Snapshot::from_legacy(chats))
}

/// Which file a startup snapshot was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOrigin {
    Current,
    /// Converted from the legacy file and not yet written in the current schema.
    Legacy,
    Empty,
}

#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
    legacy_path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: PathBuf, legacy_path: PathBuf) -> Self {
        Self { path, legacy_path }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(SNAPSHOT_FILE), dir.join(LEGACY_SNAPSHOT_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn legacy_path(&self) -> &Path {
        &self.legacy_path
    }

    /// `Ok(None)` when the file is absent or blank.
    pub fn read(&self) -> Result<Option<Snapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        let snapshot = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;
        Ok(Some(snapshot))
    }

    pub fn read_legacy(&self) -> Result<Option<String>> {
        if !self.legacy_path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.legacy_path)
            .with_context(|| format!("Failed to read {}", self.legacy_path.display()))?;
        Ok(Some(content))
    }

    /// Whole-file replacement without a temp-file rename; a crash mid-write
    /// can leave a truncated snapshot behind.
    pub fn write(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create data directory: {}", parent.display())
            })?;
        }
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }

    /// Startup policy: current file first, then the legacy file. Any failure
    /// degrades to an empty snapshot. Nothing is written here; the legacy
    /// file is left in place and the caller persists a migrated snapshot.
    pub fn load_or_migrate(&self) -> (Snapshot, SnapshotOrigin) {
        match self.read() {
            Ok(Some(snapshot)) => {
                tracing::info!(
                    path = %self.path.display(),
                    projects = snapshot.projects.len(),
                    unfiled = snapshot.chats_without_project.len(),
                    "Loaded conversations"
                );
                return (snapshot, SnapshotOrigin::Current);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!("{}", NovaError::Persistence(format!("{e:#}")));
                return (Snapshot::default(), SnapshotOrigin::Empty);
            }
        }

        let raw = match self.read_legacy() {
            Ok(Some(raw)) => raw,
            Ok(None) => return (Snapshot::default(), SnapshotOrigin::Empty),
            Err(e) => {
                tracing::warn!("{}", NovaError::Migration(format!("{e:#}")));
                return (Snapshot::default(), SnapshotOrigin::Empty);
            }
        };

        match migrate_legacy(&raw) {
            Ok(snapshot) => {
                tracing::info!(
                    legacy = %self.legacy_path.display(),
                    chats = snapshot.chats_without_project.len(),
                    "Migrated legacy chats"
                );
                (snapshot, SnapshotOrigin::Legacy)
            }
            Err(e) => {
                tracing::warn!("{e}; starting with an empty store");
                (Snapshot::default(), SnapshotOrigin::Empty)
            }
        }
    }
}

// # File Watermark Store
//
// File-based implementation of WatermarkStore with crash recovery.
//
// ## Crash Recovery
//
// - Atomic writes: write-then-rename
// - Corruption detection: JSON validation on load
// - Automatic backup: keeps a `.backup` of the last known good state
// - Recovery: falls back to the backup if corruption is detected, then to an
//   empty store (a cold start re-announces at most one reset)
//
// ## File Format
//
// ```json
// {
//   "version": "1.0",
//   "entries": {
//     "deep-desert:last-reset": { "watermark": 1700000000,
//                                 "saved_at": "2025-01-09T12:00:00Z" }
//   }
// }
// ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::Error;
use crate::model::Watermark;
use crate::traits::WatermarkStore;

/// State file format version, for future migration if the format changes
const STATE_FILE_VERSION: &str = "1.0";

/// One persisted watermark entry
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct WatermarkEntry {
    watermark: Watermark,
    saved_at: DateTime<Utc>,
}

/// Serializable state file format
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct StateFileFormat {
    version: String,
    entries: HashMap<String, WatermarkEntry>,
}

/// File-based watermark store with crash recovery
///
/// Persists one watermark per cache key to a JSON file with atomic writes and
/// automatic corruption recovery.
#[derive(Debug)]
pub struct FileWatermarkStore {
    path: PathBuf,
    entries: Arc<RwLock<HashMap<String, WatermarkEntry>>>,
}

impl FileWatermarkStore {
    /// Create or load a file watermark store
    ///
    /// Loads existing state if present, recovering from the backup file when
    /// the main file is corrupted, and creates parent directories as needed.
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    Error::config(format!(
                        "failed to create state directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let entries = Self::load_with_recovery(&path).await?;

        Ok(Self {
            path,
            entries: Arc::new(RwLock::new(entries)),
        })
    }

    /// Load state with automatic backup recovery
    async fn load_with_recovery(path: &Path) -> Result<HashMap<String, WatermarkEntry>, Error> {
        match Self::load_entries(path).await {
            Ok(entries) => {
                tracing::debug!("loaded watermark state: {} entries", entries.len());
                Ok(entries)
            }
            Err(Error::Json(e)) => {
                tracing::warn!("watermark state file corrupted: {e}, trying backup");

                let backup_path = Self::backup_path(path);
                if !backup_path.exists() {
                    tracing::warn!("no backup file found, starting with empty state");
                    return Ok(HashMap::new());
                }

                match Self::load_entries(&backup_path).await {
                    Ok(entries) => {
                        tracing::info!("recovered watermark state from backup");
                        if let Err(restore_err) = fs::copy(&backup_path, path).await {
                            tracing::error!("failed to restore state file: {restore_err}");
                        }
                        Ok(entries)
                    }
                    Err(backup_err) => {
                        tracing::error!(
                            "backup also unreadable: {backup_err}, starting with empty state"
                        );
                        Ok(HashMap::new())
                    }
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn load_entries(path: &Path) -> Result<HashMap<String, WatermarkEntry>, Error> {
        if !path.exists() {
            tracing::debug!("watermark state file does not exist: {}", path.display());
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::state_store(format!("failed to read {}: {}", path.display(), e))
        })?;

        let state_file: StateFileFormat = serde_json::from_str(&content)?;

        if state_file.version != STATE_FILE_VERSION {
            tracing::warn!(
                "watermark state version mismatch: expected {}, got {}; loading anyway",
                STATE_FILE_VERSION,
                state_file.version
            );
        }

        Ok(state_file.entries)
    }

    /// Write the current state to disk atomically, keeping a backup of the
    /// previous file
    async fn write_state(&self) -> Result<(), Error> {
        let json = {
            let guard = self.entries.read().await;
            let state_file = StateFileFormat {
                version: STATE_FILE_VERSION.to_string(),
                entries: guard.clone(),
            };
            serde_json::to_string_pretty(&state_file)?
        };

        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::state_store(format!(
                    "failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::state_store(format!("failed to write {}: {}", temp_path.display(), e))
            })?;
            file.flush().await.map_err(|e| {
                Error::state_store(format!("failed to flush {}: {}", temp_path.display(), e))
            })?;
        }

        if self.path.exists() {
            let backup_path = Self::backup_path(&self.path);
            if let Err(e) = fs::copy(&self.path, &backup_path).await {
                tracing::warn!("failed to create state backup: {e}");
            }
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::state_store(format!(
                "failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("watermark state written to {}", self.path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }

    fn backup_path(path: &Path) -> PathBuf {
        let mut backup = path.to_path_buf();
        backup.set_extension("backup");
        backup
    }
}

#[async_trait]
impl WatermarkStore for FileWatermarkStore {
    async fn load(&self, key: &str) -> Result<Option<Watermark>, Error> {
        let guard = self.entries.read().await;
        Ok(guard.get(key).map(|entry| entry.watermark))
    }

    async fn save(&self, key: &str, watermark: Watermark) -> Result<(), Error> {
        {
            let mut guard = self.entries.write().await;
            guard.insert(
                key.to_string(),
                WatermarkEntry {
                    watermark,
                    saved_at: Utc::now(),
                },
            );
        }

        // Immediate write for durability
        self.write_state().await
    }

    async fn clear(&self, key: &str) -> Result<(), Error> {
        {
            let mut guard = self.entries.write().await;
            guard.remove(key);
        }

        self.write_state().await
    }
}

// # File Target Registry
//
// JSON-file-backed implementation of TargetRegistry.
//
// The registration store proper (the relational database the command layer
// writes to) lives outside this engine. This implementation reads an exported
// JSON array of registrations and is what the daemon wires in; it re-reads the
// file on every load so edits take effect on the next tick.
//
// ## File Format
//
// ```json
// [
//   { "kind": "DEEP_DESERT", "guild_id": 123456789012345678,
//     "channel_id": "c1", "webhook_id": "w1", "webhook_token": "t1" }
// ]
// ```

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::Error;
use crate::model::BroadcastTarget;
use crate::traits::TargetRegistry;

#[derive(Debug, Clone, Deserialize)]
struct TargetRecord {
    kind: String,
    #[serde(flatten)]
    target: BroadcastTarget,
}

/// Target registry backed by a JSON file
#[derive(Debug, Clone)]
pub struct FileTargetRegistry {
    path: PathBuf,
}

impl FileTargetRegistry {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl TargetRegistry for FileTargetRegistry {
    async fn load_targets(&self, kind: &str) -> Result<Vec<BroadcastTarget>, Error> {
        let content = fs::read_to_string(&self.path).await.map_err(|e| {
            Error::registry(format!("failed to read {}: {}", self.path.display(), e))
        })?;

        let records: Vec<TargetRecord> = serde_json::from_str(&content).map_err(|e| {
            Error::registry(format!("failed to parse {}: {}", self.path.display(), e))
        })?;

        Ok(records
            .into_iter()
            .filter(|record| record.kind == kind)
            .map(|record| record.target)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn file_registry_filters_by_kind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("targets.json");
        fs::write(
            &path,
            r#"[
                {"kind": "DEEP_DESERT", "guild_id": 1, "channel_id": "c1",
                 "webhook_id": "w1", "webhook_token": "t1"},
                {"kind": "LANDSRAAD", "guild_id": 2, "channel_id": "c2",
                 "webhook_id": "w2", "webhook_token": "t2"}
            ]"#,
        )
        .await
        .unwrap();

        let registry = FileTargetRegistry::new(&path);
        let targets = registry.load_targets("DEEP_DESERT").await.unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].channel_id, "c1");

        let none = registry.load_targets("UNKNOWN").await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn file_registry_missing_file_is_an_error() {
        let registry = FileTargetRegistry::new("/nonexistent/targets.json");
        assert!(registry.load_targets("DEEP_DESERT").await.is_err());
    }
}

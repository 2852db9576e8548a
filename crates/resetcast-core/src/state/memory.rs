// # Memory Watermark Store
//
// In-memory implementation of WatermarkStore.
//
// ## Crash Behavior
//
// All state is lost on restart; the first tick after a restart treats the
// observed reset as new and announces it. Use the file store when that
// duplicate matters.
//
// ## When to Use
//
// - Testing environments
// - Ephemeral deployments where a one-time duplicate announcement is harmless

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::model::Watermark;
use crate::traits::WatermarkStore;

/// In-memory watermark store implementation
#[derive(Debug, Clone, Default)]
pub struct MemoryWatermarkStore {
    inner: Arc<RwLock<HashMap<String, Watermark>>>,
}

impl MemoryWatermarkStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Whether the store holds no keys
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[async_trait]
impl WatermarkStore for MemoryWatermarkStore {
    async fn load(&self, key: &str) -> Result<Option<Watermark>, Error> {
        let guard = self.inner.read().await;
        Ok(guard.get(key).copied())
    }

    async fn save(&self, key: &str, watermark: Watermark) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.insert(key.to_string(), watermark);
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        guard.remove(key);
        Ok(())
    }
}

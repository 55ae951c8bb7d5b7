use async_trait::async_trait;
use compass::keys::glob_matches;
use compass::DistributedTier;
use shared::{Result, TtlSecs};
use std::collections::HashMap;
use std::time::Instant;
use tokio::sync::RwLock;

struct StoredPayload {
    payload: String,
    expires_at: Instant,
}

impl StoredPayload {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Single-process stand-in for the distributed tier.
///
/// Behaves like the Redis tier (string payloads, per-key expiry, glob deletes)
/// without sharing anything across processes.
#[derive(Default)]
pub struct MemoryTier {
    entries: RwLock<HashMap<String, StoredPayload>>,
}

impl MemoryTier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live (unexpired) key count.
    pub async fn len(&self) -> usize {
        self.entries
            .read()
            .await
            .values()
            .filter(|e| !e.is_expired())
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl DistributedTier for MemoryTier {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.write().await;
        let expired = match entries.get(key) {
            Some(entry) if !entry.is_expired() => return Ok(Some(entry.payload.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set_ex(&self, key: &str, payload: String, ttl: TtlSecs) -> Result<()> {
        let entry = StoredPayload {
            payload,
            expires_at: Instant::now() + ttl.as_duration(),
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete_matching(&self, pattern: &str) -> Result<usize> {
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| !entry.is_expired());
        let before = entries.len();
        entries.retain(|key, _| !glob_matches(pattern, key));
        Ok(before - entries.len())
    }

    async fn flush(&self) -> Result<usize> {
        let mut entries = self.entries.write().await;
        let count = entries.values().filter(|e| !e.is_expired()).count();
        entries.clear();
        Ok(count)
    }
}

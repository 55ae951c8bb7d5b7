use async_trait::async_trait;
use compass::{KeyPredicate, LocalTier, TierSnapshot};
use moka::Expiry;
use moka::future::Cache;
use serde_json::Value;
use shared::TtlSecs;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone)]
struct Entry {
    value: Arc<Value>,
    ttl: Duration,
    approx_bytes: u64,
}

/// Expires each entry after the TTL it was written with.
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Moka-based Tier 1 with per-entry TTL and a bounded entry count.
pub struct MokaTier {
    cache: Cache<String, Entry>,
}

impl MokaTier {
    pub fn new(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .name("compass-tier1")
            .max_capacity(max_entries)
            .expire_after(PerEntryTtl)
            .build();

        tracing::debug!(max_entries, "Moka tier created");
        Self { cache }
    }
}

#[async_trait]
impl LocalTier for MokaTier {
    async fn get(&self, key: &str) -> Option<Value> {
        // Either doesn't exist or TTL expired
        self.cache.get(key).await.map(|entry| (*entry.value).clone())
    }

    async fn insert(&self, key: String, value: Value, ttl: TtlSecs) {
        let approx_bytes = (key.len() + value.to_string().len()) as u64;
        let entry = Entry {
            value: Arc::new(value),
            ttl: ttl.as_duration(),
            approx_bytes,
        };
        self.cache.insert(key, entry).await;
    }

    async fn remove_where(&self, predicate: &KeyPredicate<'_>) -> usize {
        let matching: Vec<Arc<String>> = self
            .cache
            .iter()
            .filter(|(key, _)| predicate(key.as_str()))
            .map(|(key, _)| key)
            .collect();

        for key in &matching {
            self.cache.invalidate(key.as_str()).await;
        }
        matching.len()
    }

    async fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }

    async fn snapshot(&self) -> TierSnapshot {
        self.cache.run_pending_tasks().await;
        let (key_count, approx_bytes) = self
            .cache
            .iter()
            .fold((0u64, 0u64), |(count, bytes), (_, entry)| {
                (count + 1, bytes + entry.approx_bytes)
            });
        TierSnapshot {
            key_count,
            approx_bytes,
        }
    }

    async fn shutdown(&self) {
        self.cache.run_pending_tasks().await;
        tracing::debug!(entries = self.cache.entry_count(), "Moka tier drained");
    }
}

impl Debug for MokaTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaTier")
            .field("entry_count", &self.cache.entry_count())
            .field("weighted_size", &self.cache.weighted_size())
            .finish()
    }
}

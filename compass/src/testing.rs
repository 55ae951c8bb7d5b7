//! In-memory fakes for the ports, shared by unit tests.

use crate::domain::Endpoint;
use crate::events::{TierFailure, TierOperation};
use crate::keys::{glob_matches, CacheParams};
use crate::ports::{
    DistributedTier, ErrorReporter, HotelDataProvider, KeyPredicate, LocalTier, TierSnapshot,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use shared::{Error, Result, TtlSecs};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex as StdMutex;
use tokio::sync::Mutex;

/// Tier 1 fake that remembers the TTL of every insert.
#[derive(Default)]
pub(crate) struct MapTier {
    entries: Mutex<HashMap<String, (Value, TtlSecs)>>,
}

impl MapTier {
    pub(crate) async fn ttl_of(&self, key: &str) -> Option<TtlSecs> {
        self.entries.lock().await.get(key).map(|(_, ttl)| *ttl)
    }

    pub(crate) async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.lock().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl LocalTier for MapTier {
    async fn get(&self, key: &str) -> Option<Value> {
        self.entries.lock().await.get(key).map(|(v, _)| v.clone())
    }

    async fn insert(&self, key: String, value: Value, ttl: TtlSecs) {
        self.entries.lock().await.insert(key, (value, ttl));
    }

    async fn remove_where(&self, predicate: &KeyPredicate<'_>) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|k, _| !predicate(k));
        before - entries.len()
    }

    async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    async fn snapshot(&self) -> TierSnapshot {
        let entries = self.entries.lock().await;
        TierSnapshot {
            key_count: entries.len() as u64,
            approx_bytes: entries
                .values()
                .map(|(v, _)| v.to_string().len() as u64)
                .sum(),
        }
    }
}

/// Tier 2 fake whose reads and writes can be made to fail.
#[derive(Default)]
pub(crate) struct FlakyTier {
    entries: Mutex<HashMap<String, (String, TtlSecs)>>,
    pub(crate) fail_reads: AtomicBool,
    pub(crate) fail_writes: AtomicBool,
    pub(crate) patterns: StdMutex<Vec<String>>,
}

impl FlakyTier {
    pub(crate) fn failing() -> Self {
        let tier = Self::default();
        tier.fail_reads.store(true, Ordering::SeqCst);
        tier.fail_writes.store(true, Ordering::SeqCst);
        tier
    }

    pub(crate) async fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().await.get(key).map(|(p, _)| p.clone())
    }
}

#[async_trait]
impl DistributedTier for FlakyTier {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::Tier("connection refused".into()));
        }
        Ok(self.entries.lock().await.get(key).map(|(p, _)| p.clone()))
    }

    async fn set_ex(&self, key: &str, payload: String, ttl: TtlSecs) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Tier("connection refused".into()));
        }
        self.entries
            .lock()
            .await
            .insert(key.to_string(), (payload, ttl));
        Ok(())
    }

    async fn delete_matching(&self, pattern: &str) -> Result<usize> {
        self.patterns.lock().unwrap().push(pattern.to_string());
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|k, _| !glob_matches(pattern, k));
        Ok(before - entries.len())
    }

    async fn flush(&self) -> Result<usize> {
        let mut entries = self.entries.lock().await;
        let count = entries.len();
        entries.clear();
        Ok(count)
    }

    async fn ping(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::Tier("connection refused".into()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct RecordingReporter {
    failures: StdMutex<Vec<TierFailure>>,
}

impl RecordingReporter {
    pub(crate) fn operations(&self) -> Vec<TierOperation> {
        self.failures
            .lock()
            .unwrap()
            .iter()
            .map(|f| f.operation)
            .collect()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, failure: TierFailure) {
        self.failures.lock().unwrap().push(failure);
    }
}

/// Provider fake that records every call and echoes the request back.
#[derive(Default)]
pub(crate) struct RecordingProvider {
    calls: StdMutex<Vec<(Endpoint, CacheParams)>>,
}

impl RecordingProvider {
    pub(crate) fn calls(&self) -> Vec<(Endpoint, CacheParams)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl HotelDataProvider for RecordingProvider {
    async fn fetch(&self, endpoint: Endpoint, params: &CacheParams) -> Result<Value> {
        self.calls.lock().unwrap().push((endpoint, params.clone()));
        Ok(json!({
            "status": true,
            "endpoint": endpoint.cache_type(),
            "params": params,
        }))
    }
}

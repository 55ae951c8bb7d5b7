use crate::domain::Endpoint;
use crate::events::TierFailure;
use crate::keys::CacheParams;
use async_trait::async_trait;
use serde_json::Value;
use shared::{Result, TtlSecs};

// Ports are the pluggable extension points for the tiers, the upstream provider
// and failure reporting.

pub type KeyPredicate<'a> = dyn Fn(&str) -> bool + Send + Sync + 'a;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TierSnapshot {
    pub key_count: u64,
    pub approx_bytes: u64,
}

/// Port for the in-process tier (e.g., Moka).
///
/// Operations are infallible; expired entries are never returned.
#[async_trait]
pub trait LocalTier: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Option<Value>;
    async fn insert(&self, key: String, value: Value, ttl: TtlSecs);
    /// Remove every key the predicate accepts. Returns how many were removed.
    async fn remove_where(&self, predicate: &KeyPredicate<'_>) -> usize;
    async fn clear(&self);
    /// Key count and approximate memory footprint at call time.
    async fn snapshot(&self) -> TierSnapshot;
    async fn shutdown(&self) {}
}

/// Port for the shared, network-reachable tier (e.g., Redis).
///
/// Payloads are opaque strings; encoding is the orchestrator's concern.
#[async_trait]
pub trait DistributedTier: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set_ex(&self, key: &str, payload: String, ttl: TtlSecs) -> Result<()>;
    /// Delete every key matching a glob (`*` and `?` wildcards).
    async fn delete_matching(&self, pattern: &str) -> Result<usize>;
    /// Drop every key. Returns how many keys were present just before.
    async fn flush(&self) -> Result<usize>;
    /// Round-trip to the store, for health reporting.
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
    async fn shutdown(&self) {}
}

/// Port for the upstream hotel-data API.
#[async_trait]
pub trait HotelDataProvider: Send + Sync + 'static {
    async fn fetch(&self, endpoint: Endpoint, params: &CacheParams) -> Result<Value>;
}

/// Receives distributed-tier failures that the orchestrator swallowed.
pub trait ErrorReporter: Send + Sync + 'static {
    fn report(&self, failure: TierFailure);
}

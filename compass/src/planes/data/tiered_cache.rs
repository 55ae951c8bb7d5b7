use crate::codec::Codec;
use crate::domain::{CacheOptions, CacheStatistics, InvalidationReport, TieredCacheConfig};
use crate::events::{TierFailure, TierOperation};
use crate::keys::{escape_glob, id_globs, key_has_id};
use crate::ports::{DistributedTier, ErrorReporter, KeyPredicate, LocalTier};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{Error, Result, TtlSecs};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Read-through cache over an in-process tier and an optional distributed tier.
///
/// Lookups go Tier 1, then Tier 2 (promoting hits into Tier 1), then the
/// caller's fetcher. Distributed-tier failures are handed to the
/// [`ErrorReporter`] and never reach the caller.
///
/// Concurrent misses on the same key are not coalesced: each caller runs its
/// own fetch and the last write wins.
pub struct TieredCache {
    config: TieredCacheConfig,
    codec: Codec,
    tier1: Arc<dyn LocalTier>,
    tier2: Option<Arc<dyn DistributedTier>>,
    reporter: Arc<dyn ErrorReporter>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl TieredCache {
    pub fn new(
        config: TieredCacheConfig,
        tier1: Arc<dyn LocalTier>,
        tier2: Option<Arc<dyn DistributedTier>>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Result<Self> {
        config.validate()?;
        let codec = Codec::new(config.compression_level)?;

        tracing::info!(
            default_ttl_secs = config.default_ttl.0,
            compression_level = config.compression_level,
            tier2 = tier2.is_some(),
            "Tiered cache initialized"
        );

        Ok(Self {
            config,
            codec,
            tier1,
            tier2,
            reporter,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &TieredCacheConfig {
        &self.config
    }

    pub fn has_tier2(&self) -> bool {
        self.tier2.is_some()
    }

    /// Return the cached value for `key`, calling `fetch` on a full miss.
    ///
    /// Errors from `fetch` are returned unchanged and nothing is cached.
    pub async fn get<F, Fut>(&self, key: &str, fetch: F, options: &CacheOptions) -> Result<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        let ttl = self.ttl_for(options);

        if options.force_refresh {
            tracing::debug!(key, "Forced refresh, skipping cache reads");
            return self.fetch_and_store(key, fetch, options).await;
        }

        if let Some(value) = self.tier1.get(key).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(key, "Tier 1 hit");
            return Ok(value);
        }

        if let Some(value) = self.read_tier2(key, options).await {
            self.tier1.insert(key.to_string(), value.clone(), ttl).await;
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(key, ttl_secs = ttl.0, "Tier 2 hit, promoted to Tier 1");
            return Ok(value);
        }

        self.fetch_and_store(key, fetch, options).await
    }

    /// Like [`TieredCache::get`], deserializing the value into `T`.
    pub async fn get_json<T, F, Fut>(&self, key: &str, fetch: F, options: &CacheOptions) -> Result<T>
    where
        T: DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        let value = self.get(key, fetch, options).await?;
        serde_json::from_value(value)
            .map_err(|e| Error::Codec(format!("cached value for '{}' has unexpected shape: {}", key, e)))
    }

    /// Write `value` to Tier 1 and, when enabled, to Tier 2.
    pub async fn set(&self, key: &str, value: Value, options: &CacheOptions) {
        let ttl = self.ttl_for(options);

        if options.use_tier2 {
            if let Some(tier2) = &self.tier2 {
                self.write_tier2(tier2.as_ref(), key, &value, ttl, options.compress)
                    .await;
            }
        }

        self.tier1.insert(key.to_string(), value, ttl).await;
    }

    /// Remove keys containing `pattern` from both tiers, or everything when `None`.
    pub async fn invalidate(&self, pattern: Option<&str>) -> InvalidationReport {
        let report = match pattern {
            Some(fragment) => {
                let matches = |key: &str| key.contains(fragment);
                let globs = [format!("*{}*", escape_glob(fragment))];
                self.remove_matching(fragment, &matches, &globs).await
            }
            None => {
                let tier1_removed = self.tier1.snapshot().await.key_count as usize;
                self.tier1.clear().await;
                let tier2_removed = match &self.tier2 {
                    Some(tier2) => match tier2.flush().await {
                        Ok(count) => Some(count),
                        Err(e) => {
                            self.report(TierOperation::Flush, "*", &e);
                            None
                        }
                    },
                    None => None,
                };
                InvalidationReport {
                    pattern: None,
                    tier1_removed,
                    tier2_removed,
                }
            }
        };

        tracing::info!(
            pattern = report.pattern.as_deref().unwrap_or("*"),
            tier1_removed = report.tier1_removed,
            tier2_removed = ?report.tier2_removed,
            "Cache invalidated"
        );
        report
    }

    /// Remove every entry derived for `id`, whatever its type or parameters.
    ///
    /// Only the id segment of the key is compared, so `4` leaves `42` alone.
    pub async fn invalidate_id(&self, id: &str) -> InvalidationReport {
        let matches = |key: &str| key_has_id(key, id);
        let report = self.remove_matching(id, &matches, &id_globs(id)).await;

        tracing::info!(
            id,
            tier1_removed = report.tier1_removed,
            tier2_removed = ?report.tier2_removed,
            "Cache entries for id invalidated"
        );
        report
    }

    /// Reachability of the distributed tier; `None` when it is not configured.
    pub async fn tier2_healthy(&self) -> Option<bool> {
        let tier2 = self.tier2.as_ref()?;
        match tier2.ping().await {
            Ok(()) => Some(true),
            Err(e) => {
                tracing::warn!("Distributed cache health check failed: {}", e);
                Some(false)
            }
        }
    }

    pub async fn statistics(&self) -> CacheStatistics {
        let snapshot = self.tier1.snapshot().await;
        CacheStatistics {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            key_count: snapshot.key_count,
            approx_memory_bytes: snapshot.approx_bytes,
        }
    }

    /// Flush Tier 1 housekeeping and give Tier 2 a chance to release resources.
    ///
    /// Redis connections close when the last handle to the tier is dropped.
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down tiered cache");
        self.tier1.shutdown().await;
        if let Some(tier2) = &self.tier2 {
            tier2.shutdown().await;
        }
    }

    async fn remove_matching(
        &self,
        label: &str,
        predicate: &KeyPredicate<'_>,
        globs: &[String],
    ) -> InvalidationReport {
        let tier1_removed = self.tier1.remove_where(predicate).await;

        let mut tier2_removed = None;
        if let Some(tier2) = &self.tier2 {
            let mut removed = Some(0);
            for glob in globs {
                match tier2.delete_matching(glob).await {
                    Ok(count) => removed = removed.map(|total| total + count),
                    Err(e) => {
                        self.report(TierOperation::Invalidate, glob, &e);
                        removed = None;
                    }
                }
            }
            tier2_removed = removed;
        }

        InvalidationReport {
            pattern: Some(label.to_string()),
            tier1_removed,
            tier2_removed,
        }
    }

    fn ttl_for(&self, options: &CacheOptions) -> TtlSecs {
        options.ttl.unwrap_or(self.config.default_ttl)
    }

    async fn fetch_and_store<F, Fut>(&self, key: &str, fetch: F, options: &CacheOptions) -> Result<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(key, "Cache miss, fetching");

        let value = fetch().await?;
        self.set(key, value.clone(), options).await;
        Ok(value)
    }

    async fn read_tier2(&self, key: &str, options: &CacheOptions) -> Option<Value> {
        if !options.use_tier2 {
            return None;
        }
        let tier2 = self.tier2.as_ref()?;

        let payload = match tier2.get(key).await {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(e) => {
                self.report(TierOperation::Read, key, &e);
                return None;
            }
        };

        match self.codec.decode(&payload, options.compress) {
            Ok(value) => Some(value),
            Err(e) => {
                self.report(TierOperation::Decode, key, &e);
                None
            }
        }
    }

    async fn write_tier2(
        &self,
        tier2: &dyn DistributedTier,
        key: &str,
        value: &Value,
        ttl: TtlSecs,
        compress: bool,
    ) {
        let payload = match self.codec.encode(value, compress) {
            Ok(payload) => payload,
            Err(e) => {
                self.report(TierOperation::Encode, key, &e);
                return;
            }
        };

        if let Err(e) = tier2.set_ex(key, payload, ttl).await {
            self.report(TierOperation::Write, key, &e);
        }
    }

    fn report(&self, operation: TierOperation, key: &str, error: &Error) {
        self.reporter
            .report(TierFailure::new(operation, key, error.to_string()));
    }
}

impl std::fmt::Debug for TieredCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredCache")
            .field("config", &self.config)
            .field("tier2", &self.tier2.is_some())
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish()
    }
}

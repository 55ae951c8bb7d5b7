use crate::api::responses::{ApiError, ApiResponse};
use axum::Json;
use booking_client::{BookingClient, BookingClientConfig};
use compass::{
    BroadcastReporter, DistributedTier, HotelSearchService, TieredCache, TieredCacheConfig,
    TtlPolicy,
};
use serde::Serialize;
use shared::config::Config;
use std::sync::Arc;
use storage_engine::{MokaTier, RedisTier};

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Server state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<HotelSearchService>,
    pub failures: BroadcastReporter,
    pub expose_error_details: bool,
}

impl AppState {
    pub fn new(search: HotelSearchService, failures: BroadcastReporter, expose_error_details: bool) -> Self {
        Self {
            search: Arc::new(search),
            failures,
            expose_error_details,
        }
    }

    /// Wire the tiers, the upstream client and the search service from configuration.
    pub async fn from_config(config: &Config) -> shared::Result<Self> {
        let tier1 = Arc::new(MokaTier::new(config.tier1_max_entries));
        let tier2 = Self::connect_tier2(config).await;
        let failures = BroadcastReporter::new(config.events_capacity);

        let cache = TieredCache::new(
            TieredCacheConfig {
                compression_level: config.compression_level,
                ..Default::default()
            },
            tier1,
            tier2,
            Arc::new(failures.clone()),
        )?;

        let client = BookingClient::new(BookingClientConfig::from_config(config)?)?;
        let search = HotelSearchService::new(
            Arc::new(cache),
            Arc::new(client),
            TtlPolicy::from(&config.ttl),
        )?;

        Ok(Self::new(
            search,
            failures,
            config.environment.is_development(),
        ))
    }

    async fn connect_tier2(config: &Config) -> Option<Arc<dyn DistributedTier>> {
        let Some(url) = config.redis_url.as_deref() else {
            tracing::info!("REDIS_URL not set, running with the in-process tier only");
            return None;
        };

        match RedisTier::connect(url, config.redis_retries).await {
            Ok(tier) => Some(Arc::new(tier)),
            Err(e) => {
                tracing::warn!(
                    "Failed to connect to Redis: {}. Running with the in-process tier only.",
                    e
                );
                None
            }
        }
    }

    /// Wrap a service result in the envelope.
    pub fn respond<T: Serialize>(&self, result: shared::Result<T>) -> ApiResult<T> {
        result
            .map(|data| Json(ApiResponse::ok(data)))
            .map_err(|e| self.error(e))
    }

    pub fn error(&self, error: shared::Error) -> ApiError {
        ApiError::new(error, self.expose_error_details)
    }
}

use serde::Serialize;
use shared::config::TtlConfig;
use shared::{Error, Result, TtlSecs};

/// Per-call options for [`crate::TieredCache::get`] and [`crate::TieredCache::set`].
///
/// Defaults: orchestrator default TTL, Tier 2 enabled, no forced refresh, compression on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheOptions {
    /// TTL for both tiers. `None` uses [`TieredCacheConfig::default_ttl`].
    pub ttl: Option<TtlSecs>,
    /// Read from and write to the distributed tier.
    pub use_tier2: bool,
    /// Skip both tier reads and always call the fetcher.
    pub force_refresh: bool,
    /// Gzip + base64 payloads stored in the distributed tier.
    pub compress: bool,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            ttl: None,
            use_tier2: true,
            force_refresh: false,
            compress: true,
        }
    }
}

impl CacheOptions {
    pub fn with_ttl(mut self, ttl: TtlSecs) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_tier2(mut self, enabled: bool) -> Self {
        self.use_tier2 = enabled;
        self
    }

    pub fn with_force_refresh(mut self, force: bool) -> Self {
        self.force_refresh = force;
        self
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

/// Construction-time settings of the orchestrator.
#[derive(Clone, Debug)]
pub struct TieredCacheConfig {
    /// TTL used when a call does not carry its own.
    pub default_ttl: TtlSecs,
    /// gzip level (0-9) for distributed-tier payloads.
    pub compression_level: u32,
}

impl Default for TieredCacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: TtlSecs::minutes(5),
            compression_level: 6,
        }
    }
}

impl TieredCacheConfig {
    pub fn validate(&self) -> Result<()> {
        if self.default_ttl.0 == 0 {
            return Err(Error::Config("default TTL must be greater than zero".into()));
        }
        if self.compression_level > crate::Codec::MAX_LEVEL {
            return Err(Error::Config(format!(
                "compression level {} is out of range (0-{})",
                self.compression_level,
                crate::Codec::MAX_LEVEL
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CacheStatistics {
    pub hits: u64,
    pub misses: u64,
    pub key_count: u64,
    pub approx_memory_bytes: u64,
}

impl CacheStatistics {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidationReport {
    pub pattern: Option<String>,
    pub tier1_removed: usize,
    /// `None` when the distributed tier is absent or failed.
    pub tier2_removed: Option<usize>,
}

/// Freshness class of upstream data; each maps to its own TTL.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheCategory {
    Search,
    Details,
    Static,
    Reviews,
    Live,
}

impl CacheCategory {
    pub const ALL: [CacheCategory; 5] = [
        CacheCategory::Search,
        CacheCategory::Details,
        CacheCategory::Static,
        CacheCategory::Reviews,
        CacheCategory::Live,
    ];
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TtlPolicy {
    pub search: TtlSecs,
    pub details: TtlSecs,
    pub static_data: TtlSecs,
    pub reviews: TtlSecs,
    pub live: TtlSecs,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            search: TtlSecs::minutes(5),
            details: TtlSecs::minutes(30),
            static_data: TtlSecs::hours(24),
            reviews: TtlSecs::hours(1),
            live: TtlSecs::minutes(1),
        }
    }
}

impl From<&TtlConfig> for TtlPolicy {
    fn from(config: &TtlConfig) -> Self {
        Self {
            search: TtlSecs(config.search_secs),
            details: TtlSecs(config.details_secs),
            static_data: TtlSecs(config.static_secs),
            reviews: TtlSecs(config.reviews_secs),
            live: TtlSecs(config.live_secs),
        }
    }
}

impl TtlPolicy {
    /// Rejects a zero TTL in any category.
    pub fn validate(&self) -> Result<()> {
        for category in CacheCategory::ALL {
            if self.ttl_for(category).0 == 0 {
                return Err(Error::Config(format!(
                    "TTL for the {:?} category must be greater than zero",
                    category
                )));
            }
        }
        Ok(())
    }

    pub fn ttl_for(&self, category: CacheCategory) -> TtlSecs {
        match category {
            CacheCategory::Search => self.search,
            CacheCategory::Details => self.details,
            CacheCategory::Static => self.static_data,
            CacheCategory::Reviews => self.reviews,
            CacheCategory::Live => self.live,
        }
    }
}

/// Upstream capabilities of the hotel-data provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    Locations,
    HotelSearch,
    HotelDetails,
    Reviews,
    Photos,
    Facilities,
    Amenities,
    Policies,
    NearbyAttractions,
    ExchangeRates,
    PropertyTypes,
    RoomAvailability,
}

impl Endpoint {
    pub const ALL: [Endpoint; 12] = [
        Endpoint::Locations,
        Endpoint::HotelSearch,
        Endpoint::HotelDetails,
        Endpoint::Reviews,
        Endpoint::Photos,
        Endpoint::Facilities,
        Endpoint::Amenities,
        Endpoint::Policies,
        Endpoint::NearbyAttractions,
        Endpoint::ExchangeRates,
        Endpoint::PropertyTypes,
        Endpoint::RoomAvailability,
    ];

    /// The `{type}` segment of cache keys for this capability.
    pub fn cache_type(&self) -> &'static str {
        match self {
            Endpoint::Locations => "locations",
            Endpoint::HotelSearch => "search",
            Endpoint::HotelDetails => "details",
            Endpoint::Reviews => "reviews",
            Endpoint::Photos => "photos",
            Endpoint::Facilities => "facilities",
            Endpoint::Amenities => "amenities",
            Endpoint::Policies => "policies",
            Endpoint::NearbyAttractions => "attractions",
            Endpoint::ExchangeRates => "exchange-rates",
            Endpoint::PropertyTypes => "property-types",
            Endpoint::RoomAvailability => "availability",
        }
    }

    pub fn category(&self) -> CacheCategory {
        match self {
            Endpoint::HotelSearch => CacheCategory::Search,
            Endpoint::HotelDetails => CacheCategory::Details,
            Endpoint::Reviews => CacheCategory::Reviews,
            Endpoint::ExchangeRates | Endpoint::RoomAvailability => CacheCategory::Live,
            Endpoint::Locations
            | Endpoint::Photos
            | Endpoint::Facilities
            | Endpoint::Amenities
            | Endpoint::Policies
            | Endpoint::NearbyAttractions
            | Endpoint::PropertyTypes => CacheCategory::Static,
        }
    }
}

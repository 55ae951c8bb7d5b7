pub mod codec;
pub mod domain;
pub mod events;
pub mod keys;
pub mod planes;
pub mod ports;

#[cfg(test)]
mod testing;

pub use codec::Codec;
pub use domain::{
    CacheCategory, CacheOptions, CacheStatistics, Endpoint, InvalidationReport, TieredCacheConfig,
    TtlPolicy,
};
pub use events::{BroadcastReporter, TierFailure, TierOperation, TracingReporter};
pub use keys::{derive_key, CacheParams, KEY_PREFIX};
pub use planes::data::TieredCache;
pub use planes::search::{HotelSearchQuery, HotelSearchService, RequestOptions, StayDates};
pub use ports::{
    DistributedTier, ErrorReporter, HotelDataProvider, KeyPredicate, LocalTier, TierSnapshot,
};

mod tiered_cache;

pub use tiered_cache::TieredCache;

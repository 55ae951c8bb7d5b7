mod memory_tier;
mod moka_tier;
mod redis_tier;

pub use memory_tier::MemoryTier;
pub use moka_tier::MokaTier;
pub use redis_tier::RedisTier;

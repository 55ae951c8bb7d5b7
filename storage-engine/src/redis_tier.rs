use async_trait::async_trait;
use compass::DistributedTier;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::AsyncCommands;
use shared::{Error, Result, TtlSecs};
use std::time::Duration;

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(3);
const MAX_RETRY_DELAY_MS: u64 = 2_000;

fn tier_error(e: redis::RedisError) -> Error {
    Error::Tier(e.to_string())
}

/// Redis-backed Tier 2.
///
/// The connection manager reconnects on its own with exponential backoff,
/// capped at [`MAX_RETRY_DELAY_MS`] between attempts.
#[derive(Clone)]
pub struct RedisTier {
    manager: ConnectionManager,
}

impl RedisTier {
    pub async fn connect(redis_url: &str, retries: usize) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| Error::Config(format!("invalid REDIS_URL: {}", e)))?;

        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(retries)
            .set_max_delay(MAX_RETRY_DELAY_MS)
            .set_connection_timeout(CONNECTION_TIMEOUT)
            .set_response_timeout(RESPONSE_TIMEOUT);

        let manager = ConnectionManager::new_with_config(client, config)
            .await
            .map_err(tier_error)?;

        tracing::info!("Redis tier connected (retries: {})", retries);
        Ok(Self { manager })
    }
}

#[async_trait]
impl DistributedTier for RedisTier {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.manager.clone();
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(tier_error)
    }

    async fn set_ex(&self, key: &str, payload: String, ttl: TtlSecs) -> Result<()> {
        let mut conn = self.manager.clone();
        conn.set_ex::<_, _, ()>(key, payload, ttl.0)
            .await
            .map_err(tier_error)
    }

    async fn delete_matching(&self, pattern: &str) -> Result<usize> {
        let mut conn = self.manager.clone();
        let keys: Vec<String> = conn.keys(pattern).await.map_err(tier_error)?;
        let count = keys.len();

        if !keys.is_empty() {
            conn.del::<_, ()>(keys).await.map_err(tier_error)?;
        }

        tracing::debug!(pattern, count, "Deleted matching Redis keys");
        Ok(count)
    }

    async fn flush(&self) -> Result<usize> {
        let mut conn = self.manager.clone();
        let count: usize = redis::cmd("DBSIZE")
            .query_async(&mut conn)
            .await
            .map_err(tier_error)?;
        redis::cmd("FLUSHDB")
            .query_async::<()>(&mut conn)
            .await
            .map_err(tier_error)?;
        Ok(count)
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.manager.clone();
        let reply: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(tier_error)?;
        if reply != "PONG" {
            return Err(Error::Tier(format!("unexpected PING reply: {}", reply)));
        }
        Ok(())
    }
}

impl std::fmt::Debug for RedisTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisTier").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REDIS_URL: &str = "redis://127.0.0.1:6379/";

    #[tokio::test]
    async fn test_invalid_url_is_a_config_error() {
        let result = RedisTier::connect("not a url", 0).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    #[ignore]
    async fn test_redis_set_get_expire() {
        let tier = RedisTier::connect(REDIS_URL, 1).await.unwrap();
        tier.ping().await.unwrap();

        tier.set_ex("compass-test:k", "payload".into(), TtlSecs(60))
            .await
            .unwrap();
        assert_eq!(
            tier.get("compass-test:k").await.unwrap().as_deref(),
            Some("payload")
        );

        assert_eq!(tier.delete_matching("*compass-test*").await.unwrap(), 1);
        assert_eq!(tier.get("compass-test:k").await.unwrap(), None);
    }

    #[tokio::test]
    #[ignore]
    async fn test_redis_delete_matching_leaves_other_keys() {
        let tier = RedisTier::connect(REDIS_URL, 1).await.unwrap();
        tier.set_ex("compass-test:search:1", "a".into(), TtlSecs(60)).await.unwrap();
        tier.set_ex("compass-test:details:1", "b".into(), TtlSecs(60)).await.unwrap();

        assert_eq!(tier.delete_matching("*compass-test:search*").await.unwrap(), 1);
        assert!(tier.get("compass-test:details:1").await.unwrap().is_some());

        tier.delete_matching("*compass-test*").await.unwrap();
    }
}

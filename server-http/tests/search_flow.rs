use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use compass::{
    BroadcastReporter, CacheParams, DistributedTier, Endpoint, HotelDataProvider,
    HotelSearchService, TieredCache, TieredCacheConfig, TtlPolicy,
};
use futures::StreamExt;
use serde_json::{json, Value};
use server_http::{build_router, AppState};
use shared::{Error, Result, TtlSecs};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use storage_engine::{MemoryTier, MokaTier};
use std::time::Duration;
use tower::ServiceExt;

/// Upstream fake. Hotel ids `429` and `503` fail the way RapidAPI does.
#[derive(Default)]
struct ScriptedProvider {
    calls: AtomicUsize,
}

impl ScriptedProvider {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HotelDataProvider for ScriptedProvider {
    async fn fetch(&self, endpoint: Endpoint, params: &CacheParams) -> Result<Value> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        match params.get("hotel_id").and_then(Value::as_str) {
            Some("429") => Err(Error::Upstream {
                status: 429,
                message: "Too many requests".into(),
            }),
            Some("503") => Err(Error::Unavailable("connection refused".into())),
            _ => Ok(json!({
                "endpoint": endpoint.cache_type(),
                "call": call,
                "hotels": [{"hotel_id": 191605, "name": "The Savoy"}],
            })),
        }
    }
}

/// Distributed tier whose every call fails, as if Redis were down.
struct UnreachableTier;

#[async_trait]
impl DistributedTier for UnreachableTier {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(Error::Tier("connection refused".into()))
    }

    async fn set_ex(&self, _key: &str, _payload: String, _ttl: TtlSecs) -> Result<()> {
        Err(Error::Tier("connection refused".into()))
    }

    async fn delete_matching(&self, _pattern: &str) -> Result<usize> {
        Err(Error::Tier("connection refused".into()))
    }

    async fn flush(&self) -> Result<usize> {
        Err(Error::Tier("connection refused".into()))
    }
}

struct TestApp {
    router: Router,
    provider: Arc<ScriptedProvider>,
}

fn app(tier2: Arc<dyn DistributedTier>, provider: Arc<ScriptedProvider>, development: bool) -> TestApp {
    let failures = BroadcastReporter::new(16);
    let cache = TieredCache::new(
        TieredCacheConfig::default(),
        Arc::new(MokaTier::new(1_000)),
        Some(tier2),
        Arc::new(failures.clone()),
    )
    .unwrap();
    let search =
        HotelSearchService::new(Arc::new(cache), provider.clone(), TtlPolicy::default()).unwrap();
    let state = AppState::new(search, failures, development);

    TestApp {
        router: build_router(state),
        provider,
    }
}

fn default_app() -> TestApp {
    app(
        Arc::new(MemoryTier::new()),
        Arc::new(ScriptedProvider::default()),
        false,
    )
}

async fn send(router: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

const LONDON: &str = "/api/hotels/search?destId=London&checkIn=2024-05-01&checkOut=2024-05-05";

#[tokio::test]
async fn test_london_search_is_served_from_cache_the_second_time() {
    let app = default_app();

    let (status, first) = send(&app.router, "GET", LONDON).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["success"], true);
    assert_eq!(app.provider.calls(), 1);

    let (status, second) = send(&app.router, "GET", LONDON).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["data"], first["data"]);
    assert_eq!(app.provider.calls(), 1);

    let (_, stats) = send(&app.router, "GET", "/api/cache/stats").await;
    assert_eq!(stats["data"]["hits"], 1);
    assert_eq!(stats["data"]["misses"], 1);
    assert_eq!(stats["data"]["keyCount"], 1);
    assert_eq!(stats["data"]["hitRate"], 0.5);
    assert_eq!(stats["data"]["tier2Enabled"], true);
}

#[tokio::test]
async fn test_invalid_stay_is_rejected_before_upstream() {
    let app = default_app();

    for uri in [
        "/api/hotels/search?destId=London&checkIn=2024-05-05&checkOut=2024-05-05",
        "/api/hotels/search?destId=London&checkIn=2024-05-06&checkOut=2024-05-05",
        "/api/hotels/search?checkIn=2024-05-01&checkOut=2024-05-05",
        "/api/hotels/search?destId=London&checkIn=2024-05-01&checkOut=2024-05-05&adults=abc",
    ] {
        let (status, body) = send(&app.router, "GET", uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "validation_error");
        assert!(body.get("details").is_none());
    }

    assert_eq!(app.provider.calls(), 0);
}

#[tokio::test]
async fn test_refresh_flag_bypasses_cache() {
    let app = default_app();

    send(&app.router, "GET", "/api/hotels/191605/photos").await;
    let (status, body) = send(&app.router, "GET", "/api/hotels/191605/photos?refresh=true").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["call"], 2);
    assert_eq!(app.provider.calls(), 2);
}

#[tokio::test]
async fn test_upstream_errors_keep_their_status() {
    let app = default_app();

    let (status, body) = send(&app.router, "GET", "/api/hotels/429").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "upstream_error");
    assert!(body["message"].as_str().unwrap().contains("Too many requests"));

    let (status, body) = send(&app.router, "GET", "/api/hotels/503/reviews").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "upstream_unavailable");

    // Failures are not cached
    send(&app.router, "GET", "/api/hotels/429").await;
    assert_eq!(app.provider.calls(), 3);
}

#[tokio::test]
async fn test_error_details_only_in_development() {
    let dev = app(
        Arc::new(MemoryTier::new()),
        Arc::new(ScriptedProvider::default()),
        true,
    );

    let (status, body) = send(&dev.router, "GET", "/api/hotels/503").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["details"].as_str().unwrap().contains("Unavailable"));

    // Query-string rejections follow the same rule
    let (status, body) = send(&dev.router, "GET", "/api/hotels/42/reviews?page=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert!(body["details"].as_str().unwrap().contains("Validation"));
}

#[tokio::test]
async fn test_pattern_invalidation_over_http() {
    let app = default_app();
    send(&app.router, "GET", LONDON).await;
    send(&app.router, "GET", "/api/hotels/42").await;

    let (status, body) = send(&app.router, "DELETE", "/api/cache?pattern=search").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tier1Removed"], 1);
    assert_eq!(body["data"]["tier2Removed"], 1);

    // details survived, search did not
    send(&app.router, "GET", "/api/hotels/42").await;
    assert_eq!(app.provider.calls(), 2);
    send(&app.router, "GET", LONDON).await;
    assert_eq!(app.provider.calls(), 3);

    let (_, body) = send(&app.router, "DELETE", "/api/cache").await;
    assert_eq!(body["data"]["tier1Removed"], 2);
    assert_eq!(body["message"], "Cache cleared");
}

#[tokio::test]
async fn test_hotel_invalidation_over_http() {
    let app = default_app();
    send(&app.router, "GET", "/api/hotels/42").await;
    send(&app.router, "GET", "/api/hotels/42/policies").await;
    send(&app.router, "GET", "/api/meta/property-types").await;

    let (status, body) = send(&app.router, "DELETE", "/api/cache/hotels/42").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tier1Removed"], 2);

    let (_, stats) = send(&app.router, "GET", "/api/cache/stats").await;
    assert_eq!(stats["data"]["keyCount"], 1);
}

#[tokio::test]
async fn test_shared_tier2_warms_a_second_instance() {
    let shared_tier2 = Arc::new(MemoryTier::new());
    let first = app(shared_tier2.clone(), Arc::new(ScriptedProvider::default()), false);
    let second = app(shared_tier2, Arc::new(ScriptedProvider::default()), false);

    let (_, from_first) = send(&first.router, "GET", "/api/meta/exchange-rates?baseCurrency=usd").await;
    let (status, from_second) =
        send(&second.router, "GET", "/api/meta/exchange-rates?baseCurrency=USD").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(from_second["data"], from_first["data"]);
    assert_eq!(first.provider.calls(), 1);
    assert_eq!(second.provider.calls(), 0);
}

#[tokio::test]
async fn test_health_reports_tier2() {
    let app = default_app();
    let (status, body) = send(&app.router, "GET", "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["tier2"], "connected");
}

#[tokio::test]
async fn test_tier2_failures_are_streamed_as_events() {
    let app = app(
        Arc::new(UnreachableTier),
        Arc::new(ScriptedProvider::default()),
        false,
    );

    let request = Request::builder()
        .uri("/api/cache/events?operation=write")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    // Tier 2 is down, so the request is still served from upstream
    let (status, _) = send(&app.router, "GET", "/api/hotels/42").await;
    assert_eq!(status, StatusCode::OK);

    let mut body = response.into_body().into_data_stream();
    let mut received = String::new();
    while !received.contains("\n\n") {
        let chunk = tokio::time::timeout(Duration::from_secs(5), body.next())
            .await
            .expect("no event within 5s")
            .expect("event stream ended")
            .unwrap();
        received.push_str(std::str::from_utf8(&chunk).unwrap());
    }

    assert!(received.contains("event: tier.failure"), "{}", received);
    let data = received
        .lines()
        .find_map(|line| line.strip_prefix("data: "))
        .unwrap();
    let failure: Value = serde_json::from_str(data).unwrap();
    // The read failure was filtered out; the write is the first event
    assert_eq!(failure["operation"], "write");
    assert_eq!(failure["key"], "booking:details:42");
    assert!(failure["message"].as_str().unwrap().contains("connection refused"));
}

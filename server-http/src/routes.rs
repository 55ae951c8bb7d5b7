use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::normalize_path::NormalizePathLayer;
use tower_http::trace::TraceLayer;

/// Build and configure the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Hotel search integration
        .route("/api/hotels/locations", get(handlers::search_locations))
        .route("/api/hotels/search", get(handlers::search_hotels))
        .route("/api/hotels/{id}", get(handlers::hotel_details))
        .route("/api/hotels/{id}/reviews", get(handlers::hotel_reviews))
        .route("/api/hotels/{id}/photos", get(handlers::hotel_photos))
        .route("/api/hotels/{id}/facilities", get(handlers::hotel_facilities))
        .route("/api/hotels/{id}/amenities", get(handlers::hotel_amenities))
        .route("/api/hotels/{id}/policies", get(handlers::hotel_policies))
        .route("/api/hotels/{id}/attractions", get(handlers::nearby_attractions))
        .route("/api/hotels/{id}/availability", get(handlers::room_availability))
        .route("/api/meta/exchange-rates", get(handlers::exchange_rates))
        .route("/api/meta/property-types", get(handlers::property_types))
        // Cache administration
        .route("/api/cache", delete(handlers::invalidate))
        .route("/api/cache/stats", get(handlers::cache_stats))
        .route("/api/cache/hotels/{id}", delete(handlers::invalidate_hotel))
        // SSE stream of distributed-tier failures
        .route("/api/cache/events", get(handlers::stream_events))
        // Middleware
        .layer(NormalizePathLayer::trim_trailing_slash())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

use crate::api::requests::{
    ApiQuery, LocationQuery, PageQuery, RefreshQuery, StayQuery,
};
use crate::state::{ApiResult, AppState};
use axum::extract::{Path, State};
use compass::HotelSearchQuery;
use serde_json::Value;
use tracing::info;

/// GET /api/hotels/locations?query=
pub async fn search_locations(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LocationQuery>,
    ApiQuery(refresh): ApiQuery<RefreshQuery>,
) -> ApiResult<Value> {
    info!("Location search: query={:?}", query.query);
    let result = state
        .search
        .search_locations(query.query.as_deref(), (&refresh).into())
        .await;
    state.respond(result)
}

/// GET /api/hotels/search
pub async fn search_hotels(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<HotelSearchQuery>,
    ApiQuery(refresh): ApiQuery<RefreshQuery>,
) -> ApiResult<Value> {
    info!(
        "Hotel search: dest={:?}, check_in={:?}, check_out={:?}",
        query.dest_id, query.check_in, query.check_out
    );
    let result = state.search.search_hotels(&query, (&refresh).into()).await;
    state.respond(result)
}

/// GET /api/hotels/{id}
pub async fn hotel_details(
    State(state): State<AppState>,
    Path(hotel_id): Path<String>,
    ApiQuery(stay): ApiQuery<StayQuery>,
    ApiQuery(refresh): ApiQuery<RefreshQuery>,
) -> ApiResult<Value> {
    let result = state
        .search
        .hotel_details(
            &hotel_id,
            stay.check_in.as_deref(),
            stay.check_out.as_deref(),
            (&refresh).into(),
        )
        .await;
    state.respond(result)
}

/// GET /api/hotels/{id}/reviews?page=
pub async fn hotel_reviews(
    State(state): State<AppState>,
    Path(hotel_id): Path<String>,
    ApiQuery(page): ApiQuery<PageQuery>,
    ApiQuery(refresh): ApiQuery<RefreshQuery>,
) -> ApiResult<Value> {
    let result = state
        .search
        .hotel_reviews(&hotel_id, page.page, (&refresh).into())
        .await;
    state.respond(result)
}

/// GET /api/hotels/{id}/photos
pub async fn hotel_photos(
    State(state): State<AppState>,
    Path(hotel_id): Path<String>,
    ApiQuery(refresh): ApiQuery<RefreshQuery>,
) -> ApiResult<Value> {
    let result = state.search.hotel_photos(&hotel_id, (&refresh).into()).await;
    state.respond(result)
}

/// GET /api/hotels/{id}/facilities
pub async fn hotel_facilities(
    State(state): State<AppState>,
    Path(hotel_id): Path<String>,
    ApiQuery(refresh): ApiQuery<RefreshQuery>,
) -> ApiResult<Value> {
    let result = state
        .search
        .hotel_facilities(&hotel_id, (&refresh).into())
        .await;
    state.respond(result)
}

/// GET /api/hotels/{id}/amenities
pub async fn hotel_amenities(
    State(state): State<AppState>,
    Path(hotel_id): Path<String>,
    ApiQuery(refresh): ApiQuery<RefreshQuery>,
) -> ApiResult<Value> {
    let result = state
        .search
        .hotel_amenities(&hotel_id, (&refresh).into())
        .await;
    state.respond(result)
}

/// GET /api/hotels/{id}/policies
pub async fn hotel_policies(
    State(state): State<AppState>,
    Path(hotel_id): Path<String>,
    ApiQuery(refresh): ApiQuery<RefreshQuery>,
) -> ApiResult<Value> {
    let result = state
        .search
        .hotel_policies(&hotel_id, (&refresh).into())
        .await;
    state.respond(result)
}

/// GET /api/hotels/{id}/attractions
pub async fn nearby_attractions(
    State(state): State<AppState>,
    Path(hotel_id): Path<String>,
    ApiQuery(refresh): ApiQuery<RefreshQuery>,
) -> ApiResult<Value> {
    let result = state
        .search
        .nearby_attractions(&hotel_id, (&refresh).into())
        .await;
    state.respond(result)
}

/// GET /api/hotels/{id}/availability?checkIn=&checkOut=
pub async fn room_availability(
    State(state): State<AppState>,
    Path(hotel_id): Path<String>,
    ApiQuery(stay): ApiQuery<StayQuery>,
    ApiQuery(refresh): ApiQuery<RefreshQuery>,
) -> ApiResult<Value> {
    let result = state
        .search
        .room_availability(
            &hotel_id,
            stay.check_in.as_deref(),
            stay.check_out.as_deref(),
            (&refresh).into(),
        )
        .await;
    state.respond(result)
}

use crate::api::requests::{ApiQuery, CurrencyQuery, RefreshQuery};
use crate::state::{ApiResult, AppState};
use axum::extract::State;
use serde_json::Value;

/// GET /api/meta/exchange-rates?baseCurrency=
pub async fn exchange_rates(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CurrencyQuery>,
    ApiQuery(refresh): ApiQuery<RefreshQuery>,
) -> ApiResult<Value> {
    let result = state
        .search
        .exchange_rates(query.base_currency.as_deref(), (&refresh).into())
        .await;
    state.respond(result)
}

/// GET /api/meta/property-types
pub async fn property_types(
    State(state): State<AppState>,
    ApiQuery(refresh): ApiQuery<RefreshQuery>,
) -> ApiResult<Value> {
    let result = state.search.property_types((&refresh).into()).await;
    state.respond(result)
}

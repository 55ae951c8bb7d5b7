use super::responses::ApiError;
use crate::state::AppState;
use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use compass::RequestOptions;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shared::Error;

/// `Query` whose rejection is rendered in the response envelope, with
/// `details` following the server's environment like every other error.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

impl<T> FromRequestParts<AppState> for ApiQuery<T>
where
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| ApiQuery(value))
            .map_err(|rejection| state.error(Error::validation("query", rejection.body_text())))
    }
}

/// `?refresh=true` bypasses both cache tiers.
#[derive(Debug, Default, Deserialize)]
pub struct RefreshQuery {
    #[serde(default)]
    pub refresh: bool,
}

impl From<&RefreshQuery> for RequestOptions {
    fn from(query: &RefreshQuery) -> Self {
        RequestOptions {
            force_refresh: query.refresh,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LocationQuery {
    pub query: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StayQuery {
    pub check_in: Option<String>,
    pub check_out: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyQuery {
    pub base_currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InvalidateQuery {
    pub pattern: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventsQuery {
    /// Comma-separated operations, e.g. `read,write`.
    pub operation: Option<String>,
}

use super::requests::{HotelSearchQuery, RequestOptions, StayDates};
use super::validation;
use crate::domain::{CacheOptions, CacheStatistics, Endpoint, InvalidationReport, TtlPolicy};
use crate::keys::{canonical_params, derive_key, CacheParams};
use crate::planes::data::TieredCache;
use crate::ports::HotelDataProvider;
use serde_json::{json, Value};
use shared::Result;
use std::sync::Arc;

const DEFAULT_SEARCH_TYPE: &str = "CITY";

/// Cached access to the upstream hotel-data API.
///
/// Every operation validates its input first; invalid requests never touch the
/// cache or the provider.
#[derive(Clone)]
pub struct HotelSearchService {
    cache: Arc<TieredCache>,
    provider: Arc<dyn HotelDataProvider>,
    ttl: TtlPolicy,
}

impl HotelSearchService {
    pub fn new(
        cache: Arc<TieredCache>,
        provider: Arc<dyn HotelDataProvider>,
        ttl: TtlPolicy,
    ) -> Result<Self> {
        ttl.validate()?;
        Ok(Self {
            cache,
            provider,
            ttl,
        })
    }

    pub fn cache(&self) -> &Arc<TieredCache> {
        &self.cache
    }

    pub async fn search_locations(&self, query: Option<&str>, options: RequestOptions) -> Result<Value> {
        let query = validation::required("query", query)?;
        self.cached(
            Endpoint::Locations,
            query,
            Some("query"),
            CacheParams::new(),
            options,
        )
        .await
    }

    pub async fn search_hotels(&self, query: &HotelSearchQuery, options: RequestOptions) -> Result<Value> {
        let dest_id = validation::required("destId", query.dest_id.as_deref())?;
        let stay = StayDates::parse(query.check_in.as_deref(), query.check_out.as_deref())?;
        let adults = validation::at_least_one("adults", query.adults, 1)?;
        let rooms = validation::at_least_one("rooms", query.rooms, 1)?;
        let page = validation::at_least_one("page", query.page, 1)?;
        let currency = query
            .currency
            .as_deref()
            .map(|c| validation::currency_code("currency", c))
            .transpose()?;
        let search_type = query
            .search_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_SEARCH_TYPE)
            .to_ascii_uppercase();

        let params = canonical_params([
            ("search_type", json!(search_type)),
            ("arrival_date", json!(stay.arrival())),
            ("departure_date", json!(stay.departure())),
            ("adults", json!(adults)),
            ("room_qty", json!(rooms)),
            ("page_number", json!(page)),
            ("currency_code", json!(currency)),
            ("languagecode", json!(query.language)),
        ]);

        self.cached(Endpoint::HotelSearch, dest_id, Some("dest_id"), params, options)
            .await
    }

    pub async fn hotel_details(
        &self,
        hotel_id: &str,
        check_in: Option<&str>,
        check_out: Option<&str>,
        options: RequestOptions,
    ) -> Result<Value> {
        let hotel_id = validation::hotel_id(hotel_id)?;
        let params = match StayDates::parse_optional(check_in, check_out)? {
            Some(stay) => stay_params(&stay),
            None => CacheParams::new(),
        };
        self.cached(Endpoint::HotelDetails, hotel_id, Some("hotel_id"), params, options)
            .await
    }

    pub async fn hotel_reviews(&self, hotel_id: &str, page: Option<u32>, options: RequestOptions) -> Result<Value> {
        let hotel_id = validation::hotel_id(hotel_id)?;
        let page = validation::at_least_one("page", page, 1)?;
        let params = canonical_params([("page_number", page)]);
        self.cached(Endpoint::Reviews, hotel_id, Some("hotel_id"), params, options)
            .await
    }

    pub async fn hotel_photos(&self, hotel_id: &str, options: RequestOptions) -> Result<Value> {
        self.hotel_resource(Endpoint::Photos, hotel_id, options).await
    }

    pub async fn hotel_facilities(&self, hotel_id: &str, options: RequestOptions) -> Result<Value> {
        self.hotel_resource(Endpoint::Facilities, hotel_id, options).await
    }

    pub async fn hotel_amenities(&self, hotel_id: &str, options: RequestOptions) -> Result<Value> {
        self.hotel_resource(Endpoint::Amenities, hotel_id, options).await
    }

    pub async fn hotel_policies(&self, hotel_id: &str, options: RequestOptions) -> Result<Value> {
        self.hotel_resource(Endpoint::Policies, hotel_id, options).await
    }

    pub async fn nearby_attractions(&self, hotel_id: &str, options: RequestOptions) -> Result<Value> {
        self.hotel_resource(Endpoint::NearbyAttractions, hotel_id, options)
            .await
    }

    pub async fn room_availability(
        &self,
        hotel_id: &str,
        check_in: Option<&str>,
        check_out: Option<&str>,
        options: RequestOptions,
    ) -> Result<Value> {
        let hotel_id = validation::hotel_id(hotel_id)?;
        let stay = StayDates::parse(check_in, check_out)?;
        self.cached(
            Endpoint::RoomAvailability,
            hotel_id,
            Some("hotel_id"),
            stay_params(&stay),
            options,
        )
        .await
    }

    pub async fn exchange_rates(&self, base_currency: Option<&str>, options: RequestOptions) -> Result<Value> {
        let base = validation::required("baseCurrency", base_currency)?;
        let base = validation::currency_code("baseCurrency", base)?;
        self.cached(
            Endpoint::ExchangeRates,
            &base,
            Some("base_currency"),
            CacheParams::new(),
            options,
        )
        .await
    }

    pub async fn property_types(&self, options: RequestOptions) -> Result<Value> {
        self.cached(Endpoint::PropertyTypes, "all", None, CacheParams::new(), options)
            .await
    }

    pub async fn invalidate(&self, pattern: Option<&str>) -> InvalidationReport {
        let pattern = pattern.map(str::trim).filter(|p| !p.is_empty());
        self.cache.invalidate(pattern).await
    }

    /// Drop every cached entry whose key mentions `hotel_id`.
    pub async fn invalidate_hotel(&self, hotel_id: &str) -> Result<InvalidationReport> {
        let hotel_id = validation::hotel_id(hotel_id)?;
        Ok(self.cache.invalidate_id(hotel_id).await)
    }

    pub async fn statistics(&self) -> CacheStatistics {
        self.cache.statistics().await
    }

    async fn hotel_resource(&self, endpoint: Endpoint, hotel_id: &str, options: RequestOptions) -> Result<Value> {
        let hotel_id = validation::hotel_id(hotel_id)?;
        self.cached(endpoint, hotel_id, Some("hotel_id"), CacheParams::new(), options)
            .await
    }

    /// Derive the key, pick the category TTL and read through the cache.
    ///
    /// `id_param` names the upstream query parameter carrying `id`; it is added
    /// to the provider parameters but kept out of the key's parameter part.
    async fn cached(
        &self,
        endpoint: Endpoint,
        id: &str,
        id_param: Option<&'static str>,
        params: CacheParams,
        request: RequestOptions,
    ) -> Result<Value> {
        let key = derive_key(endpoint.cache_type(), id, &params);
        let ttl = self.ttl.ttl_for(endpoint.category());
        let cache_options = CacheOptions::default()
            .with_ttl(ttl)
            .with_force_refresh(request.force_refresh);

        let mut upstream = params;
        if let Some(name) = id_param {
            upstream.insert(name.to_string(), Value::String(id.to_string()));
        }

        let provider = self.provider.clone();
        self.cache
            .get(
                &key,
                move || async move { provider.fetch(endpoint, &upstream).await },
                &cache_options,
            )
            .await
    }
}

fn stay_params(stay: &StayDates) -> CacheParams {
    canonical_params([
        ("arrival_date", stay.arrival()),
        ("departure_date", stay.departure()),
    ])
}

impl std::fmt::Debug for HotelSearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HotelSearchService")
            .field("cache", &self.cache)
            .field("ttl", &self.ttl)
            .finish()
    }
}

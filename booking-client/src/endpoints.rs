use compass::Endpoint;

/// Upstream path for each capability, relative to the API base URL.
pub fn path_for(endpoint: Endpoint) -> &'static str {
    match endpoint {
        Endpoint::Locations => "/api/v1/hotels/searchDestination",
        Endpoint::HotelSearch => "/api/v1/hotels/searchHotels",
        Endpoint::HotelDetails => "/api/v1/hotels/getHotelDetails",
        Endpoint::Reviews => "/api/v1/hotels/getHotelReviews",
        Endpoint::Photos => "/api/v1/hotels/getHotelPhotos",
        Endpoint::Facilities => "/api/v1/hotels/getHotelFacilities",
        Endpoint::Amenities => "/api/v1/hotels/getHotelAmenities",
        Endpoint::Policies => "/api/v1/hotels/getHotelPolicies",
        Endpoint::NearbyAttractions => "/api/v1/hotels/getPopularAttractionNearBy",
        Endpoint::ExchangeRates => "/api/v1/meta/getExchangeRates",
        Endpoint::PropertyTypes => "/api/v1/meta/getPropertyTypes",
        Endpoint::RoomAvailability => "/api/v1/hotels/getRoomList",
    }
}

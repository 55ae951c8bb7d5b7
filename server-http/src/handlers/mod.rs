pub mod cache;
pub mod events;
pub mod hotels;
pub mod meta;

pub use cache::{cache_stats, health_check, invalidate, invalidate_hotel};
pub use events::stream_events;
pub use hotels::{
    hotel_amenities, hotel_details, hotel_facilities, hotel_photos, hotel_policies, hotel_reviews,
    nearby_attractions, room_availability, search_hotels, search_locations,
};
pub use meta::{exchange_rates, property_types};

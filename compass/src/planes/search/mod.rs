mod hotel_search;
mod requests;
mod validation;

pub use hotel_search::HotelSearchService;
pub use requests::{HotelSearchQuery, RequestOptions, StayDates};

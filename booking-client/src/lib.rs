mod client;
mod endpoints;

pub use client::{BookingClient, BookingClientConfig};
pub use endpoints::path_for;

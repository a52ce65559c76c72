//! Weather lookup for SkyView
//!
//! City search via Nominatim, current conditions and forecast via
//! OpenWeatherMap, and a memoizing icon fetcher.

pub mod geocode;
pub mod icons;
pub mod provider;
pub mod types;

pub use geocode::{select, Geocoder};
pub use icons::{IconBytes, IconCache};
pub use provider::WeatherProvider;
pub use types::*;

pub mod favorite_store;
pub mod favorites;
pub mod request;
pub mod weather_service;

pub use favorite_store::{FavoriteCity, FavoriteMap, FavoriteStore};
pub use favorites::{FavoritesCache, FavoritesError};
pub use request::{RequestId, RequestTracker};
pub use weather_service::{
    request_fetch, ViewState, WeatherRequest, WeatherServiceMessage, WeatherView,
};

//! OpenWeatherMap current-conditions and forecast client.
//!
//! Every failure (transport, status, payload) collapses to `None` after being
//! logged; callers show "data unavailable" instead of propagating an error.

use std::time::Duration;

use chrono::NaiveDateTime;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use skyview_core::{NetworkError, ReqwestErrorExt, WeatherConfig};
use tracing::instrument;

use crate::types::{CurrentConditions, ForecastEntry, FORECAST_TIME_FORMAT};

#[derive(Debug, Deserialize)]
struct ApiCurrent {
    name: String,
    sys: ApiSys,
    weather: Vec<ApiCondition>,
    main: ApiMain,
    wind: ApiWind,
}

#[derive(Debug, Deserialize)]
struct ApiSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct ApiCondition {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct ApiMain {
    temp: f64,
    pressure: Option<f64>,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct ApiWind {
    speed: f64,
    deg: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ApiForecast {
    list: Vec<ApiForecastItem>,
}

#[derive(Debug, Deserialize)]
struct ApiForecastItem {
    dt_txt: String,
    weather: Vec<ApiCondition>,
    main: ApiMain,
    wind: ApiWind,
    visibility: Option<u32>,
    #[serde(default)]
    pop: f64,
}

impl TryFrom<ApiCurrent> for CurrentConditions {
    type Error = NetworkError;

    fn try_from(api: ApiCurrent) -> Result<Self, Self::Error> {
        let condition = api
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| NetworkError::InvalidResponse("missing weather[0]".to_string()))?;
        let pressure_hpa = api
            .main
            .pressure
            .ok_or_else(|| NetworkError::InvalidResponse("missing main.pressure".to_string()))?;

        Ok(Self {
            city_name: api.name,
            country: api.sys.country,
            description: condition.description,
            icon: condition.icon,
            temperature: api.main.temp,
            pressure_hpa,
            humidity: api.main.humidity,
            wind_speed: api.wind.speed,
            wind_deg: api.wind.deg,
        })
    }
}

impl TryFrom<ApiForecastItem> for ForecastEntry {
    type Error = NetworkError;

    fn try_from(api: ApiForecastItem) -> Result<Self, Self::Error> {
        let timestamp = NaiveDateTime::parse_from_str(&api.dt_txt, FORECAST_TIME_FORMAT)
            .map_err(|e| NetworkError::InvalidResponse(format!("bad dt_txt {:?}: {}", api.dt_txt, e)))?;
        let condition = api
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| NetworkError::InvalidResponse("missing weather[0]".to_string()))?;

        Ok(Self {
            timestamp,
            description: condition.description,
            icon: condition.icon,
            temperature: api.main.temp,
            pressure_hpa: api.main.pressure,
            humidity: api.main.humidity,
            wind_speed: api.wind.speed,
            wind_deg: api.wind.deg,
            visibility: api.visibility,
            pop: api.pop,
        })
    }
}

/// Weather API client
#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Client,
    base_url: String,
    api_key: String,
    lang: String,
}

impl WeatherProvider {
    pub fn new(config: &WeatherConfig) -> Result<Self, NetworkError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ReqwestErrorExt::into_network_error)?;

        let api_key = config.resolved_api_key().unwrap_or_default();
        if api_key.is_empty() {
            tracing::warn!("Weather API key is not set; requests will be rejected");
        }

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key,
            lang: config.lang.clone(),
        })
    }

    /// Current conditions at a coordinate, or `None` if unavailable.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_current(&self, lat: f64, lon: f64) -> Option<CurrentConditions> {
        let result = self
            .get_json::<ApiCurrent>("weather", lat, lon)
            .await
            .and_then(CurrentConditions::try_from);

        match result {
            Ok(current) => Some(current),
            Err(e) => {
                tracing::warn!("Current weather unavailable for ({}, {}): {}", lat, lon, e);
                None
            }
        }
    }

    /// Forecast entries at a coordinate, or `None` if unavailable.
    ///
    /// A single malformed entry makes the whole forecast unavailable.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_forecast(&self, lat: f64, lon: f64) -> Option<Vec<ForecastEntry>> {
        let result = self
            .get_json::<ApiForecast>("forecast", lat, lon)
            .await
            .and_then(|forecast| {
                forecast
                    .list
                    .into_iter()
                    .map(ForecastEntry::try_from)
                    .collect::<Result<Vec<_>, _>>()
            });

        match result {
            Ok(entries) => {
                tracing::debug!("Fetched {} forecast entries", entries.len());
                Some(entries)
            }
            Err(e) => {
                tracing::warn!("Forecast unavailable for ({}, {}): {}", lat, lon, e);
                None
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        lat: f64,
        lon: f64,
    ) -> Result<T, NetworkError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let lat = lat.to_string();
        let lon = lon.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
                ("lang", self.lang.as_str()),
            ])
            .send()
            .await
            .map_err(ReqwestErrorExt::into_network_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NetworkError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| NetworkError::InvalidResponse(e.to_string()))
    }
}

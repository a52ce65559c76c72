//! Forward geocoding: turn a free-text city query into candidate locations.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.

use std::time::Duration;

use reqwest::Client;
use skyview_core::{GeocodingConfig, NetworkError, ReqwestErrorExt, ValidationError};
use tracing::instrument;

use crate::types::{CandidateLocation, SelectedLocation};

/// City search client
#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Client,
    base_url: String,
    limit: u32,
}

impl Geocoder {
    pub fn new(config: &GeocodingConfig, timeout: Duration) -> Result<Self, NetworkError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(ReqwestErrorExt::into_network_error)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limit: config.result_limit,
        })
    }

    /// Search for places matching `query`.
    ///
    /// An empty query is rejected before any request is made. Provider failures
    /// yield an empty list; "no candidates" is a normal outcome for callers.
    #[instrument(skip(self), level = "info")]
    pub async fn search(&self, query: &str) -> Result<Vec<CandidateLocation>, ValidationError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ValidationError::EmptyQuery);
        }

        match self.request(query).await {
            Ok(candidates) => {
                tracing::info!("Found {} candidates", candidates.len());
                Ok(candidates)
            }
            Err(e) => {
                tracing::warn!("City search failed: {}", e);
                Ok(Vec::new())
            }
        }
    }

    async fn request(&self, query: &str) -> Result<Vec<CandidateLocation>, NetworkError> {
        let url = format!("{}/search", self.base_url);
        let limit = self.limit.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(ReqwestErrorExt::into_network_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::ServerError {
                status: status.as_u16(),
                message: format!("search returned {}", status),
            });
        }

        response
            .json::<Vec<CandidateLocation>>()
            .await
            .map_err(|e| NetworkError::InvalidResponse(e.to_string()))
    }
}

/// Turn a search result into the selection a view will show.
pub fn select(candidate: &CandidateLocation) -> Result<SelectedLocation, ValidationError> {
    let invalid = || ValidationError::InvalidCoordinates {
        lat: candidate.latitude.clone(),
        lon: candidate.longitude.clone(),
    };

    let latitude: f64 = candidate.latitude.trim().parse().map_err(|_| invalid())?;
    let longitude: f64 = candidate.longitude.trim().parse().map_err(|_| invalid())?;

    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(invalid());
    }

    Ok(SelectedLocation::new(
        candidate.display_name.clone(),
        latitude,
        longitude,
    ))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use wiremock::matchers::{header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn geocoder(base_url: &str) -> Geocoder {
        let config = GeocodingConfig {
            base_url: base_url.to_string(),
            ..GeocodingConfig::default()
        };
        Geocoder::new(&config, Duration::from_secs(5)).unwrap()
    }

    fn candidate(name: &str, lat: &str, lon: &str) -> CandidateLocation {
        CandidateLocation {
            display_name: name.to_string(),
            latitude: lat.to_string(),
            longitude: lon.to_string(),
        }
    }

    #[tokio::test]
    async fn test_search_sends_query_and_limit() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "Paris"))
            .and(query_param("format", "json"))
            .and(query_param("limit", "10"))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"display_name": "Paris, Île-de-France, France", "lat": "48.8566", "lon": "2.3522", "importance": 0.9},
                {"display_name": "Paris, Texas, United States", "lat": "33.6609", "lon": "-95.5555"}
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let results = geocoder(&mock_server.uri()).search("  Paris ").await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].display_name, "Paris, Île-de-France, France");
        assert_eq!(results[1].longitude, "-95.5555");
    }

    #[tokio::test]
    async fn test_empty_query_makes_no_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(0)
            .mount(&mock_server)
            .await;

        let geocoder = geocoder(&mock_server.uri());
        assert_eq!(geocoder.search("").await, Err(ValidationError::EmptyQuery));
        assert_eq!(geocoder.search("   \t").await, Err(ValidationError::EmptyQuery));
    }

    #[tokio::test]
    async fn test_server_error_yields_no_candidates() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let results = geocoder(&mock_server.uri()).search("Tokyo").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_yields_no_candidates() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
            .mount(&mock_server)
            .await;

        let results = geocoder(&mock_server.uri()).search("Tokyo").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_provider_yields_no_candidates() {
        // Nothing listens on port 9 (discard) in the test environment
        let results = geocoder("http://127.0.0.1:9").search("Oslo").await.unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_select_parses_coordinates() {
        let selected = select(&candidate("Tokyo, Japan", "35.6895", "139.6917")).unwrap();
        assert_eq!(selected.label, "Tokyo, Japan");
        assert!((selected.latitude - 35.6895).abs() < f64::EPSILON);
        assert!((selected.longitude - 139.6917).abs() < f64::EPSILON);
    }

    #[test]
    fn test_select_rejects_garbage_coordinates() {
        let err = select(&candidate("Nowhere", "north", "2.0")).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidCoordinates { .. }));

        let err = select(&candidate("Off the map", "91.0", "0.0")).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidCoordinates { .. }));
    }
}

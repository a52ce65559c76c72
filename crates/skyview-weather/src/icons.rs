//! Weather icon download with process-lifetime memoization.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use reqwest::Client;
use skyview_core::{NetworkError, ReqwestErrorExt, WeatherConfig};
use tracing::instrument;

/// Raw icon image bytes (PNG)
pub type IconBytes = Arc<[u8]>;

/// Memoizing icon fetcher.
///
/// Entries are never evicted; the set of distinct icon codes is small. Failed
/// downloads are not cached, so a later call retries.
#[derive(Debug)]
pub struct IconCache {
    client: Client,
    base_url: String,
    entries: Mutex<HashMap<String, IconBytes>>,
}

impl IconCache {
    pub fn new(config: &WeatherConfig) -> Result<Self, NetworkError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ReqwestErrorExt::into_network_error)?;

        Ok(Self {
            client,
            base_url: config.icon_base_url.trim_end_matches('/').to_string(),
            entries: Mutex::new(HashMap::new()),
        })
    }

    /// Icon image for `icon_code` (e.g. "01d"), or `None` if it can't be fetched.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_icon(&self, icon_code: &str) -> Option<IconBytes> {
        if let Some(hit) = self.get_cached(icon_code) {
            return Some(hit);
        }

        match self.download(icon_code).await {
            Ok(bytes) => {
                // First writer wins if two fetches of the same code overlapped
                let mut entries = self.entries.lock();
                let entry = entries
                    .entry(icon_code.to_string())
                    .or_insert(bytes);
                Some(entry.clone())
            }
            Err(e) => {
                tracing::warn!("Failed to load icon {}: {}", icon_code, e);
                None
            }
        }
    }

    pub fn get_cached(&self, icon_code: &str) -> Option<IconBytes> {
        self.entries.lock().get(icon_code).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    async fn download(&self, icon_code: &str) -> Result<IconBytes, NetworkError> {
        let url = format!("{}/{}@2x.png", self.base_url, icon_code);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ReqwestErrorExt::into_network_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::ServerError {
                status: status.as_u16(),
                message: format!("icon {} returned {}", icon_code, status),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(ReqwestErrorExt::into_network_error)?;
        Ok(Arc::from(bytes.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\nfake";

    fn cache(base_url: &str) -> IconCache {
        let config = WeatherConfig {
            icon_base_url: base_url.to_string(),
            ..WeatherConfig::default()
        };
        IconCache::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_icon_fetched_once() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/01d@2x.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG_MAGIC))
            .expect(1)
            .mount(&mock_server)
            .await;

        let icons = cache(&mock_server.uri());
        let first = icons.fetch_icon("01d").await.unwrap();
        let second = icons.fetch_icon("01d").await.unwrap();

        assert_eq!(&first[..], PNG_MAGIC);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(icons.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_icon_not_cached() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/99x@2x.png"))
            .respond_with(ResponseTemplate::new(404))
            .expect(2)
            .mount(&mock_server)
            .await;

        let icons = cache(&mock_server.uri());
        assert!(icons.fetch_icon("99x").await.is_none());
        assert!(icons.fetch_icon("99x").await.is_none());
        assert!(icons.is_empty());
    }
}

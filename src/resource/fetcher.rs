//! The external-provider seam and its HTTP implementation.

use crate::resource::error::FetchError;
use crate::resource::key::ResourceKey;
use crate::technology::Technology;
use log::info;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

const DEFAULT_BASE_URL: &str = "https://developer.nrel.gov/api";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_REQUEST_INTERVAL: Duration = Duration::from_secs(2);

/// Hub height requested for wind series, in meters.
const WIND_HUB_HEIGHT_M: u32 = 100;

/// Source of raw resource payloads, invoked only on cache miss.
///
/// Implemented by [`HttpResourceFetcher`] for the real provider and by stub
/// providers in tests.
pub trait ResourceProvider: Send + Sync {
    fn fetch<'a>(
        &'a self,
        key: &'a ResourceKey,
    ) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send + 'a;
}

/// Connection settings for the external resource provider.
///
/// # Examples
///
/// ```
/// use sitecast::ProviderConfig;
///
/// let config = ProviderConfig::builder()
///     .api_key("DEMO_KEY")
///     .email("user@example.com")
///     .build();
/// # let _ = config;
/// ```
#[derive(Debug, Clone, bon::Builder)]
pub struct ProviderConfig {
    /// Provider credential. The provider rate-limits per credential.
    #[builder(into)]
    pub api_key: String,

    /// Contact address the provider requires on every request.
    #[builder(into)]
    pub email: String,

    /// Root of the provider API; technology endpoints hang below it.
    #[builder(into, default = DEFAULT_BASE_URL.to_owned())]
    pub base_url: String,

    /// Per-fetch timeout covering connect through body read.
    #[builder(default = DEFAULT_TIMEOUT)]
    pub timeout: Duration,

    /// Minimum spacing between request starts.
    #[builder(default = DEFAULT_REQUEST_INTERVAL)]
    pub min_request_interval: Duration,
}

/// Downloads resource series over HTTP, pacing requests so one credential is
/// never hammered.
pub struct HttpResourceFetcher {
    client: reqwest::Client,
    config: ProviderConfig,
    last_request: Mutex<Option<Instant>>,
}

impl HttpResourceFetcher {
    pub fn new(config: ProviderConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(FetchError::ClientBuild)?;
        Ok(Self {
            client,
            config,
            last_request: Mutex::new(None),
        })
    }

    fn request_url(&self, technology: Technology) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            technology.endpoint_path()
        )
    }

    fn query_params(&self, key: &ResourceKey) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("api_key", self.config.api_key.clone()),
            ("email", self.config.email.clone()),
            ("lat", key.coordinate.lat.to_string()),
            ("lon", key.coordinate.lon.to_string()),
            ("year", key.year.to_string()),
            ("utc", "true".to_owned()),
        ];
        if key.technology == Technology::Wind {
            params.push(("hubheight", WIND_HUB_HEIGHT_M.to_string()));
        }
        params
    }

    /// Delays until at least `min_request_interval` has passed since the
    /// previous request start. Holding the lock across the sleep serializes
    /// starts across concurrent workers.
    async fn pace(&self) {
        if self.config.min_request_interval.is_zero() {
            return;
        }
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let next_allowed = previous + self.config.min_request_interval;
            let now = Instant::now();
            if next_allowed > now {
                tokio::time::sleep(next_allowed - now).await;
            }
        }
        *last = Some(Instant::now());
    }
}

impl ResourceProvider for HttpResourceFetcher {
    fn fetch<'a>(
        &'a self,
        key: &'a ResourceKey,
    ) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send + 'a {
        async move {
            self.pace().await;

            let url = self.request_url(key.technology);
            info!("downloading {key} from {url}");
            let response = self
                .client
                .get(&url)
                .query(&self.query_params(key))
                .send()
                .await
                .map_err(|e| FetchError::NetworkRequest(url.clone(), e))?;

            let response = match response.error_for_status() {
                Ok(response) => response,
                Err(e) => {
                    return Err(if let Some(status) = e.status() {
                        FetchError::HttpStatus {
                            url,
                            status,
                            source: e,
                        }
                    } else {
                        FetchError::NetworkRequest(url, e)
                    });
                }
            };

            let bytes = response
                .bytes()
                .await
                .map_err(|e| FetchError::Body(url, e))?;
            info!("downloaded {} bytes for {key}", bytes.len());
            Ok(bytes.to_vec())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::Coordinate;

    fn fetcher(interval: Duration) -> HttpResourceFetcher {
        HttpResourceFetcher::new(
            ProviderConfig::builder()
                .api_key("DEMO_KEY")
                .email("user@example.com")
                .min_request_interval(interval)
                .build(),
        )
        .unwrap()
    }

    #[test]
    fn wind_requests_carry_hub_height() {
        let fetcher = fetcher(Duration::ZERO);
        let key = ResourceKey::new(Technology::Wind, 2012, Coordinate::new(39.0, -79.99));
        let params = fetcher.query_params(&key);
        assert!(params.contains(&("hubheight", "100".to_owned())));
        assert!(params.contains(&("year", "2012".to_owned())));

        let solar = ResourceKey::new(Technology::Solar, 2019, Coordinate::new(39.0, -79.99));
        let params = fetcher.query_params(&solar);
        assert!(!params.iter().any(|(name, _)| *name == "hubheight"));
    }

    #[test]
    fn endpoint_urls_are_per_technology() {
        let fetcher = fetcher(Duration::ZERO);
        assert_eq!(
            fetcher.request_url(Technology::Wind),
            "https://developer.nrel.gov/api/wind-toolkit/v2/wind/wtk-srw-download"
        );
        assert!(fetcher.request_url(Technology::Solar).contains("nsrdb"));
    }

    #[tokio::test(start_paused = true)]
    async fn pacing_spaces_request_starts() {
        let fetcher = fetcher(Duration::from_secs(2));
        let started = Instant::now();
        fetcher.pace().await;
        assert_eq!(started.elapsed(), Duration::ZERO);
        fetcher.pace().await;
        assert!(started.elapsed() >= Duration::from_secs(2));
    }
}

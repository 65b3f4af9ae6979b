use std::future::Future;

use reqwest::{
    Client, Url,
    header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue},
};
use tracing::{debug, instrument};

use crate::{
    config::GeocoderConfig,
    error::{GeocodingError, Result, SearchFailure},
    record::{Candidate, normalize_response},
};

/// Anything that can turn a query into ranked candidates.
///
/// The autocomplete engine is generic over this so that the provider can be
/// swapped, or replaced with a scripted one in tests.
pub trait Geocoder: Send + Sync + 'static {
    fn lookup(
        &self,
        query: &str,
    ) -> impl Future<Output = std::result::Result<Vec<Candidate>, SearchFailure>> + Send;
}

/// Client for a Nominatim-compatible `/search` endpoint.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: Client,
    endpoint: Url,
    config: GeocoderConfig,
}

impl NominatimClient {
    pub fn new(config: GeocoderConfig) -> Result<Self> {
        let endpoint = config.endpoint_url()?;

        let mut headers = HeaderMap::new();
        let language = HeaderValue::from_str(&config.accept_language).map_err(|err| {
            GeocodingError::Config(format!(
                "Invalid Accept-Language '{}': {err}",
                config.accept_language
            ))
        })?;
        headers.insert(ACCEPT_LANGUAGE, language);

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            config,
        })
    }

    pub fn config(&self) -> &GeocoderConfig {
        &self.config
    }

    #[instrument(name = "Geocode lookup", skip(self), level = "debug")]
    async fn fetch(&self, query: &str) -> std::result::Result<Vec<Candidate>, SearchFailure> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&self.config.query_pairs(query))
            .send()
            .await
            .map_err(|err| {
                let failure = SearchFailure::from_transport(&err);
                debug!(error = %err, ?failure, "Lookup request failed");
                failure
            })?;

        let status = response.status();
        if !status.is_success() {
            let failure = SearchFailure::from_status(status);
            debug!(%status, ?failure, "Provider returned non-success status");
            return Err(failure);
        }

        let body = response.bytes().await.map_err(|err| {
            let failure = SearchFailure::from_transport(&err);
            debug!(error = %err, ?failure, "Failed to read lookup response");
            failure
        })?;

        normalize_response(&body)
    }
}

impl Geocoder for NominatimClient {
    fn lookup(
        &self,
        query: &str,
    ) -> impl Future<Output = std::result::Result<Vec<Candidate>, SearchFailure>> + Send {
        self.fetch(query)
    }
}

use std::time::Duration;

use reqwest::Url;

use crate::error::{GeocodingError, Result};

pub const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_RESULT_LIMIT: usize = 8;
const MAX_RESULT_LIMIT: usize = 50;

/// Settings for the outbound lookup.
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Search endpoint, queried with `format=json`.
    pub endpoint: String,
    /// Client identifier. Nominatim rejects requests without one.
    pub user_agent: String,
    /// Sent as `Accept-Language`.
    pub accept_language: String,
    /// Maximum number of records requested per lookup.
    pub limit: usize,
    /// ISO 3166-1 alpha-2 codes. Empty means worldwide.
    pub country_codes: Vec<String>,
    /// Upper bound on a single lookup; expiry is reported as a network failure.
    pub timeout: Duration,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: NOMINATIM_SEARCH_URL.to_string(),
            user_agent: format!("placefinder/{}", env!("CARGO_PKG_VERSION")),
            accept_language: "en-US,en".to_string(),
            limit: DEFAULT_RESULT_LIMIT,
            country_codes: Vec::new(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl GeocoderConfig {
    pub fn builder() -> GeocoderConfigBuilder {
        GeocoderConfigBuilder::new()
    }

    pub(crate) fn endpoint_url(&self) -> Result<Url> {
        Url::parse(&self.endpoint).map_err(|err| GeocodingError::Config(format!(
            "Invalid endpoint '{}': {err}",
            self.endpoint
        )))
    }

    /// Query string pairs for a lookup of `query`.
    pub(crate) fn query_pairs(&self, query: &str) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("format", "json".to_string()),
            ("q", query.to_string()),
            ("limit", self.limit.to_string()),
            ("addressdetails", "1".to_string()),
            ("extratags", "1".to_string()),
        ];
        if !self.country_codes.is_empty() {
            pairs.push(("countrycodes", self.country_codes.join(",")));
        }
        pairs
    }
}

/// Builder for [`GeocoderConfig`] with the public Nominatim instance as default.
#[derive(Debug, Clone, Default)]
pub struct GeocoderConfigBuilder {
    config: GeocoderConfig,
}

impl GeocoderConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: GeocoderConfig::default(),
        }
    }

    /// Point the client at another Nominatim-compatible search endpoint
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn accept_language(mut self, accept_language: impl Into<String>) -> Self {
        self.config.accept_language = accept_language.into();
        self
    }

    /// Set the number of records requested (clamped to 1..=50)
    pub fn limit(mut self, limit: usize) -> Self {
        self.config.limit = limit.clamp(1, MAX_RESULT_LIMIT);
        self
    }

    /// Restrict results to the given countries
    pub fn country_codes<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config.country_codes = codes
            .into_iter()
            .map(|code| code.as_ref().trim().to_ascii_lowercase())
            .filter(|code| !code.is_empty())
            .collect();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<GeocoderConfig> {
        let url = self.config.endpoint_url()?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(GeocodingError::Config(format!(
                "Endpoint must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.config.user_agent.trim().is_empty() {
            return Err(GeocodingError::Config(
                "A client identifier (User-Agent) is required".to_string(),
            ));
        }
        if self.config.timeout.is_zero() {
            return Err(GeocodingError::Config(
                "Request timeout must be greater than zero".to_string(),
            ));
        }
        Ok(self.config)
    }
}

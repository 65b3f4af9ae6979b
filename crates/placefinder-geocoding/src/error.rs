use thiserror::Error;
pub type Result<T> = std::result::Result<T, GeocodingError>;

/// Errors raised while setting up a geocoder, before any lookup is issued.
#[derive(Error, Debug)]
pub enum GeocodingError {
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Classification of a lookup that failed as a whole.
///
/// Individual malformed records never produce one of these; they are dropped
/// while the rest of the batch is kept.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchFailure {
    /// The provider answered HTTP 429.
    #[error("rate limited by geocoding provider")]
    RateLimited,
    /// No connectivity, DNS failure, a timeout, or the connection dropped
    /// mid-response.
    #[error("network failure while contacting geocoding provider")]
    Network,
    /// Any other non-2xx status, or a response body that is not a record list.
    #[error("geocoding provider returned an unusable response")]
    Unknown,
}

impl SearchFailure {
    /// Short heading for the blocking notification shown to the user.
    pub fn title(self) -> &'static str {
        match self {
            Self::RateLimited => "Rate Limited",
            Self::Network => "Network Error",
            Self::Unknown => "Search Error",
        }
    }

    /// Body text for the blocking notification shown to the user.
    pub fn message(self) -> &'static str {
        match self {
            Self::RateLimited => "Too many requests. Please wait a moment and try again.",
            Self::Network => "Please check your internet connection and try again.",
            Self::Unknown => "Unable to search locations. Please try again.",
        }
    }

    pub(crate) fn from_status(status: reqwest::StatusCode) -> Self {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            Self::RateLimited
        } else {
            Self::Unknown
        }
    }

    pub(crate) fn from_transport(err: &reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            Self::from_status(status)
        } else if err.is_timeout() || err.is_connect() || err.is_request() {
            Self::Network
        } else if err.is_body() || err.is_decode() {
            // Records are parsed from raw bytes, so reqwest only reports these
            // when the connection fails while the body is streaming.
            Self::Network
        } else {
            Self::Unknown
        }
    }
}

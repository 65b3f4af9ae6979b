use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlacefinderError {
    #[error("Geocoding error: {0}")]
    Geocoding(#[from] placefinder_geocoding::GeocodingError),
    #[error("No candidate at position {index} (list holds {len})")]
    NoSuchCandidate { index: usize, len: usize },
    #[error("No candidate with id {0}")]
    UnknownCandidate(u64),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Init Logging error: {0}")]
    InitLoggingError(#[from] tracing_subscriber::filter::ParseError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PlacefinderError>;

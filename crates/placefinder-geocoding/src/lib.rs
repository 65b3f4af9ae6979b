//! Geocoding provider access for the placefinder autocomplete engine.
//!
//! This crate issues the outbound place lookup, turns the provider's loosely
//! typed records into ranked [`Candidate`]s, and classifies whole-request
//! failures into [`SearchFailure`]. Malformed individual records are dropped
//! silently; only a failure of the request itself is reported.
//!
//! ```rust,no_run
//! use placefinder_geocoding::{Geocoder, GeocoderConfig, NominatimClient};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = GeocoderConfig::builder()
//!     .user_agent("my-app/1.0 (contact@example.com)")
//!     .build()?;
//! let client = NominatimClient::new(config)?;
//!
//! let candidates = client.lookup("Lond").await?;
//! for candidate in &candidates {
//!     println!("{} ({}, {})", candidate.label(), candidate.latitude, candidate.longitude);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod record;

pub use client::{Geocoder, NominatimClient};
pub use config::{DEFAULT_RESULT_LIMIT, GeocoderConfig, GeocoderConfigBuilder, NOMINATIM_SEARCH_URL};
pub use error::{GeocodingError, Result, SearchFailure};
pub use record::{
    Candidate, MalformedRecord, RawAddress, RawPlace, normalize_response, rank, short_name,
};

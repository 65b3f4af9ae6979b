//! Placefinder - Debounced Location Autocomplete
//!
//! Placefinder resolves the free-text "place of birth" field of a form into
//! coordinates. It turns keystrokes into a stable, ranked list of candidate
//! places from a geocoding provider and turns a tap on one of them into a
//! minimal `{ name, latitude, longitude }` payload.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use placefinder::{GeocoderConfig, LocationSearch, Update};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), placefinder::error::PlacefinderError> {
//! let mut search = LocationSearch::builder_nominatim(GeocoderConfig::default())?
//!     .on_location_select(|place| println!("Selected {}", place.name))
//!     .build();
//!
//! // Keystrokes arrive one by one; only the last one of a burst is searched.
//! for text in ["L", "Lo", "Lon", "Lond"] {
//!     search.text_changed(text);
//! }
//!
//! while let Some(update) = search.next_update().await {
//!     if let Update::ResultsApplied { count, .. } = update {
//!         println!("{count} candidates for {}", search.query());
//!     }
//! }
//!
//! search.select(0)?;
//! assert!(search.candidates().is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! # Guarantees
//!
//! - **Debounced**: one lookup per typing pause, never for text under the minimum length
//! - **Race-free**: a slower, older response can never overwrite a newer one
//! - **Ranked**: candidates are ordered by provider importance, ties in provider order
//! - **Tolerant**: malformed records are dropped, only whole-request failures surface
//! - **Leak-free**: dropping the engine cancels every pending timer
use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod config;
mod core;
pub mod error;
mod search;
mod selection;

pub use crate::core::{LocationSearch, LocationSearchBuilder};

pub use config::{
    DEFAULT_BLUR_GRACE, DEFAULT_MIN_QUERY_CHARS, DEFAULT_QUIET_PERIOD, EngineConfig,
    EngineConfigBuilder,
};
pub use placefinder_geocoding as geocoding;
pub use placefinder_geocoding::{
    Candidate, Geocoder, GeocoderConfig, GeocoderConfigBuilder, NominatimClient, SearchFailure,
};
pub use search::{
    Debounce, QueryDebouncer, RestartableTimer, SearchGateway, SearchOutcome, SearchToken,
    TimerTicket,
};
pub use selection::{Phase, SelectionResult, Update};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for the Placefinder library.
///
/// Installs a `tracing` fmt subscriber. `RUST_LOG` takes precedence over
/// `level` when set. Only the first call has any effect.
///
/// # Examples
///
/// ```rust
/// use placefinder::init_logging;
/// use tracing::Level;
///
/// init_logging(Level::INFO)?;
/// # Ok::<(), placefinder::error::PlacefinderError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static (), error::PlacefinderError> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?
            .add_directive("hyper_util=warn".parse()?)
            .add_directive("reqwest=warn".parse()?);

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .try_init()
            .map_err(|err| error::PlacefinderError::Other(anyhow::anyhow!(err)))?;
        Ok(())
    })
}

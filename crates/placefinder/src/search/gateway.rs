use std::{fmt, future::Future, sync::Arc};

use placefinder_geocoding::{Candidate, Geocoder, SearchFailure, rank};
use tracing::{Instrument, debug_span};

/// Generation marker for one issued lookup. Later lookups carry larger tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SearchToken(u64);

impl SearchToken {
    pub const fn generation(self) -> u64 {
        self.0
    }

    pub(crate) const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub(crate) const fn initial() -> Self {
        Self(0)
    }
}

impl fmt::Display for SearchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A finished lookup, tagged with the token it was issued under.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub token: SearchToken,
    pub query: String,
    pub result: Result<Vec<Candidate>, SearchFailure>,
}

/// Issues lookups against a [`Geocoder`] and tags their results.
pub struct SearchGateway<G> {
    geocoder: Arc<G>,
}

impl<G> Clone for SearchGateway<G> {
    fn clone(&self) -> Self {
        Self {
            geocoder: Arc::clone(&self.geocoder),
        }
    }
}

impl<G: Geocoder> SearchGateway<G> {
    pub fn new(geocoder: G) -> Self {
        Self {
            geocoder: Arc::new(geocoder),
        }
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    /// Look up `query` and tag the ranked result with `token`.
    ///
    /// Results are re-ranked here so that ordering holds for any geocoder. The
    /// returned future owns everything it needs, so it can be spawned.
    /// Nothing aborts it once started; callers discard superseded outcomes by
    /// comparing tokens.
    pub fn search(
        &self,
        query: String,
        token: SearchToken,
    ) -> impl Future<Output = SearchOutcome> + Send + use<G> {
        let geocoder = Arc::clone(&self.geocoder);
        let span = debug_span!("search", %token, query = %query);
        async move {
            let result = geocoder.lookup(&query).await.map(|mut candidates| {
                rank(&mut candidates);
                candidates
            });
            SearchOutcome {
                token,
                query,
                result,
            }
        }
        .instrument(span)
    }
}

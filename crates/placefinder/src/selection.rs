use placefinder_geocoding::{Candidate, SearchFailure};

use crate::search::SearchToken;

/// The minimal payload handed to the surrounding form on commit.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectionResult {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&Candidate> for SelectionResult {
    fn from(candidate: &Candidate) -> Self {
        Self {
            name: candidate.full_name.clone(),
            latitude: candidate.latitude,
            longitude: candidate.longitude,
        }
    }
}

/// Where the autocomplete interaction currently stands.
///
/// A commit passes through a committed step inside a single call and lands
/// back in `Idle`, so it is never observable as a phase of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// A lookup for the current query is in flight.
    Searching,
    /// Candidates are held and the panel is shown.
    ShowingResults,
}

/// What a processed internal event changed. Presentation layers re-render
/// after each one.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// The quiet period elapsed and a lookup was issued.
    SearchStarted { token: SearchToken, query: String },
    /// The current lookup succeeded; `count` candidates are now held.
    ResultsApplied { token: SearchToken, count: usize },
    /// The current lookup failed; the list was cleared and the panel hidden.
    SearchFailed {
        token: SearchToken,
        failure: SearchFailure,
    },
    /// A superseded lookup finished and was ignored.
    StaleDiscarded { token: SearchToken },
    /// The blur grace delay elapsed and the panel was hidden.
    PanelHidden,
}

impl Update {
    /// Whether the update changed anything a presentation layer renders.
    pub fn is_visible(&self) -> bool {
        !matches!(self, Self::StaleDiscarded { .. })
    }
}

//! The autocomplete engine bound to the location field of the birth-details form.
//!
//! [`LocationSearch`] owns every piece of mutable state: the query text, the
//! candidate list, panel visibility, the committed selection, the pending
//! timers and the current search token. Timers and lookups run as tokio tasks
//! that only post events back; the engine applies them one at a time in
//! [`LocationSearch::next_update`], so every observable state is the result of
//! one complete transition.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use placefinder::{GeocoderConfig, LocationSearch};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), placefinder::error::PlacefinderError> {
//! let config = GeocoderConfig::builder()
//!     .user_agent("birth-chart/1.0 (contact@example.com)")
//!     .build()?;
//! let mut search = LocationSearch::builder_nominatim(config)?
//!     .on_location_select(|place| println!("{} @ {}, {}", place.name, place.latitude, place.longitude))
//!     .build();
//!
//! search.text_changed("Lond");
//! search.settle().await;
//!
//! for candidate in search.candidates() {
//!     println!("{}", candidate.label());
//! }
//! if !search.candidates().is_empty() {
//!     search.select(0)?;
//! }
//! # Ok(())
//! # }
//! ```

use placefinder_geocoding::{Candidate, Geocoder, GeocoderConfig, NominatimClient, SearchFailure};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, info, instrument, warn};

use crate::{
    config::EngineConfig,
    error::{PlacefinderError, Result},
    search::{
        Debounce, QueryDebouncer, RestartableTimer, SearchGateway, SearchOutcome, SearchToken,
        TimerTicket,
    },
    selection::{Phase, SelectionResult, Update},
};

type SelectCallback = Box<dyn FnMut(SelectionResult) + Send>;
type FailureCallback = Box<dyn FnMut(SearchFailure) + Send>;

#[derive(Debug)]
enum Event {
    QuietPeriodElapsed(TimerTicket),
    BlurGraceElapsed(TimerTicket),
    SearchCompleted(SearchOutcome),
}

fn log_failure_notice(failure: SearchFailure) {
    info!(
        title = failure.title(),
        message = failure.message(),
        "Search failure notification"
    );
}

/// Builder for [`LocationSearch`].
pub struct LocationSearchBuilder<G> {
    geocoder: G,
    config: EngineConfig,
    initial_value: String,
    on_select: Option<SelectCallback>,
    on_failure: FailureCallback,
}

impl<G: Geocoder> LocationSearchBuilder<G> {
    fn new(geocoder: G) -> Self {
        Self {
            geocoder,
            config: EngineConfig::default(),
            initial_value: String::new(),
            on_select: None,
            on_failure: Box::new(log_failure_notice),
        }
    }

    /// Use custom timings and thresholds
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Start with text already in the field (e.g. a previously saved place)
    pub fn initial_value(mut self, value: impl Into<String>) -> Self {
        self.initial_value = value.into();
        self
    }

    /// Called exactly once per committed selection
    pub fn on_location_select<F>(mut self, callback: F) -> Self
    where
        F: FnMut(SelectionResult) + Send + 'static,
    {
        self.on_select = Some(Box::new(callback));
        self
    }

    /// Called once for every failed lookup that was still current.
    ///
    /// Defaults to logging the notification title and message.
    pub fn on_search_failure<F>(mut self, callback: F) -> Self
    where
        F: FnMut(SearchFailure) + Send + 'static,
    {
        self.on_failure = Box::new(callback);
        self
    }

    pub fn build(self) -> LocationSearch<G> {
        let (tx, events) = unbounded_channel();
        LocationSearch {
            debouncer: QueryDebouncer::new(&self.config, tx.clone(), Event::QuietPeriodElapsed),
            blur_timer: RestartableTimer::new(
                self.config.blur_grace,
                tx.clone(),
                Event::BlurGraceElapsed,
            ),
            gateway: SearchGateway::new(self.geocoder),
            config: self.config,
            tx,
            events,
            query: self.initial_value,
            candidates: Vec::new(),
            panel_visible: false,
            blurred: false,
            selection: None,
            last_token: SearchToken::initial(),
            current: None,
            in_flight: 0,
            on_select: self.on_select,
            on_failure: self.on_failure,
        }
    }
}

/// Debounced, race-free place autocomplete.
///
/// Input enters through [`text_changed`](Self::text_changed),
/// [`select`](Self::select), [`focus`](Self::focus) and [`blur`](Self::blur).
/// Everything else is a read-only projection for rendering.
///
/// Methods that start timers or lookups must be called from within a tokio
/// runtime.
pub struct LocationSearch<G> {
    config: EngineConfig,
    gateway: SearchGateway<G>,
    debouncer: QueryDebouncer<Event>,
    blur_timer: RestartableTimer<Event>,
    tx: UnboundedSender<Event>,
    events: UnboundedReceiver<Event>,

    query: String,
    candidates: Vec<Candidate>,
    panel_visible: bool,
    blurred: bool,
    selection: Option<SelectionResult>,

    last_token: SearchToken,
    current: Option<SearchToken>,
    in_flight: usize,

    on_select: Option<SelectCallback>,
    on_failure: FailureCallback,
}

impl LocationSearch<NominatimClient> {
    /// Start building an engine backed by a Nominatim client.
    pub fn builder_nominatim(
        config: GeocoderConfig,
    ) -> Result<LocationSearchBuilder<NominatimClient>> {
        Ok(LocationSearchBuilder::new(NominatimClient::new(config)?))
    }
}

impl<G: Geocoder> LocationSearch<G> {
    pub fn builder(geocoder: G) -> LocationSearchBuilder<G> {
        LocationSearchBuilder::new(geocoder)
    }

    // ----- entry points -----

    /// Handle a keystroke.
    ///
    /// Clears any committed selection and supersedes the in-flight lookup. Text
    /// below the minimum length clears the list and hides the panel right away;
    /// otherwise a lookup is issued once typing pauses.
    pub fn text_changed(&mut self, text: impl Into<String>) {
        self.query = text.into();
        self.blurred = false;
        if self.selection.take().is_some() {
            debug!("Edit cleared committed selection");
        }
        self.supersede_search();

        match self.debouncer.on_text_changed(&self.query) {
            Debounce::Scheduled(_) => {}
            Debounce::BelowMinimum => {
                self.candidates.clear();
                self.panel_visible = false;
            }
        }
    }

    /// Replace the text from outside (e.g. the form resets the field) without
    /// searching. Pending work for the previous text is dropped.
    pub fn set_value(&mut self, value: impl Into<String>) {
        let value = value.into();
        if value == self.query {
            return;
        }
        self.query = value;
        self.selection = None;
        self.debouncer.cancel();
        self.supersede_search();
        self.candidates.clear();
        self.panel_visible = false;
    }

    /// Commit the candidate at `index` in the rendered list.
    ///
    /// Sets the query to the candidate's full name, clears the list, hides the
    /// panel and invokes the selection callback, all before returning.
    #[instrument(name = "Commit location", skip(self), level = "debug")]
    pub fn select(&mut self, index: usize) -> Result<SelectionResult> {
        let Some(candidate) = self.candidates.get(index) else {
            return Err(PlacefinderError::NoSuchCandidate {
                index,
                len: self.candidates.len(),
            });
        };

        let result = SelectionResult::from(candidate);
        self.query.clone_from(&candidate.full_name);
        self.candidates.clear();
        self.panel_visible = false;
        self.debouncer.cancel();
        self.supersede_search();
        self.selection = Some(result.clone());

        info!(
            name = %result.name,
            latitude = result.latitude,
            longitude = result.longitude,
            "Location committed"
        );
        if let Some(callback) = self.on_select.as_mut() {
            callback(result.clone());
        }
        Ok(result)
    }

    /// Commit the candidate with provider id `id`.
    pub fn select_id(&mut self, id: u64) -> Result<SelectionResult> {
        let index = self
            .candidates
            .iter()
            .position(|candidate| candidate.id == id)
            .ok_or(PlacefinderError::UnknownCandidate(id))?;
        self.select(index)
    }

    /// The input gained focus: re-show held candidates.
    pub fn focus(&mut self) {
        self.blurred = false;
        self.blur_timer.cancel();
        if !self.candidates.is_empty() {
            self.panel_visible = true;
        }
    }

    /// The input lost focus: hide the panel once the grace delay passes.
    ///
    /// Results that land while unfocused are held but not shown until the next
    /// [`focus`](Self::focus).
    pub fn blur(&mut self) {
        self.blurred = true;
        self.blur_timer.schedule();
    }

    /// Cancel every timer and forget the in-flight lookup.
    ///
    /// Dropping the engine does the same.
    pub fn shutdown(&mut self) {
        self.debouncer.cancel();
        self.blur_timer.cancel();
        self.supersede_search();
    }

    // ----- event pump -----

    /// Apply the next internal event that changes something.
    ///
    /// Returns `None` straight away when no timer or lookup is outstanding.
    pub async fn next_update(&mut self) -> Option<Update> {
        while !self.is_settled() {
            let event = self.events.recv().await?;
            if let Some(update) = self.apply(event) {
                return Some(update);
            }
        }
        None
    }

    /// Process events until no timer or lookup is outstanding.
    pub async fn settle(&mut self) -> Vec<Update> {
        let mut updates = Vec::new();
        while let Some(update) = self.next_update().await {
            updates.push(update);
        }
        updates
    }

    /// Whether nothing is pending that could still change state.
    pub fn is_settled(&self) -> bool {
        !self.debouncer.is_pending() && !self.blur_timer.is_pending() && self.in_flight == 0
    }

    fn apply(&mut self, event: Event) -> Option<Update> {
        match event {
            Event::QuietPeriodElapsed(ticket) => {
                if !self.debouncer.fired(ticket) {
                    return None;
                }
                self.start_search()
            }
            Event::BlurGraceElapsed(ticket) => {
                if !self.blur_timer.acknowledge(ticket) {
                    return None;
                }
                self.panel_visible = false;
                Some(Update::PanelHidden)
            }
            Event::SearchCompleted(outcome) => Some(self.complete_search(outcome)),
        }
    }

    fn start_search(&mut self) -> Option<Update> {
        if !self.debouncer.meets_minimum(&self.query) {
            return None;
        }

        let token = self.last_token.next();
        self.last_token = token;
        self.current = Some(token);
        self.in_flight += 1;

        let query = self.query.clone();
        debug!(%token, %query, "Issuing lookup");
        let search = self.gateway.search(query.clone(), token);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = search.await;
            let _ = tx.send(Event::SearchCompleted(outcome));
        });

        Some(Update::SearchStarted { token, query })
    }

    fn complete_search(&mut self, outcome: SearchOutcome) -> Update {
        self.in_flight = self.in_flight.saturating_sub(1);
        let token = outcome.token;

        if self.current != Some(token) {
            debug!(%token, current = ?self.current, "Discarding stale lookup result");
            return Update::StaleDiscarded { token };
        }
        self.current = None;

        match outcome.result {
            Ok(candidates) => {
                let count = candidates.len();
                self.candidates = candidates;
                self.panel_visible = count > 0 && !self.blurred;
                debug!(%token, count, shown = self.panel_visible, "Applied lookup result");
                Update::ResultsApplied { token, count }
            }
            Err(failure) => {
                self.candidates.clear();
                self.panel_visible = false;
                warn!(%token, query = %outcome.query, %failure, "Lookup failed");
                (self.on_failure)(failure);
                Update::SearchFailed { token, failure }
            }
        }
    }

    fn supersede_search(&mut self) {
        if let Some(token) = self.current.take() {
            debug!(%token, "Superseded in-flight lookup");
        }
    }

    // ----- read-only projections -----

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Ranked candidates, most important first.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// True while a lookup for the current text is in flight.
    pub fn is_loading(&self) -> bool {
        self.current.is_some()
    }

    pub fn is_panel_visible(&self) -> bool {
        self.panel_visible && !self.candidates.is_empty()
    }

    /// The committed selection, until the next edit.
    pub fn selection(&self) -> Option<&SelectionResult> {
        self.selection.as_ref()
    }

    /// Whether the text in the field is a committed selection.
    pub fn is_selected(&self) -> bool {
        self.selection.is_some()
    }

    pub fn phase(&self) -> Phase {
        if self.current.is_some() {
            Phase::Searching
        } else if self.is_panel_visible() {
            Phase::ShowingResults
        } else {
            Phase::Idle
        }
    }

    /// The token whose result would be applied, if a lookup is in flight.
    pub fn current_token(&self) -> Option<SearchToken> {
        self.current
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn geocoder(&self) -> &G {
        self.gateway.geocoder()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use super::*;

    #[derive(Clone, Default)]
    struct Scripted {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl Geocoder for Scripted {
        async fn lookup(&self, query: &str) -> std::result::Result<Vec<Candidate>, SearchFailure> {
            self.calls.lock().unwrap().push(query.to_string());
            tokio::time::sleep(Duration::from_millis(50)).await;
            if query.starts_with("err") {
                return Err(SearchFailure::Unknown);
            }
            Ok(vec![Candidate {
                id: 1,
                full_name: format!("{query}, Somewhere"),
                short_name: query.to_string(),
                latitude: 10.0,
                longitude: 20.0,
                kind: "town".to_string(),
                importance: 0.5,
            }])
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_state() {
        let search = LocationSearch::builder(Scripted::default())
            .initial_value("Paris, France")
            .build();
        assert_eq!(search.query(), "Paris, France");
        assert_eq!(search.phase(), Phase::Idle);
        assert!(search.candidates().is_empty());
        assert!(!search.is_loading());
        assert!(!search.is_panel_visible());
        assert!(search.is_settled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_update_returns_none_when_settled() {
        let mut search = LocationSearch::builder(Scripted::default()).build();
        assert_eq!(search.next_update().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_searching_phase_and_loading_flag() {
        let geocoder = Scripted::default();
        let mut search = LocationSearch::builder(geocoder.clone()).build();

        search.text_changed("Rome");
        assert_eq!(search.phase(), Phase::Idle);
        assert!(!search.is_loading());

        let update = search.next_update().await.unwrap();
        assert!(matches!(update, Update::SearchStarted { ref query, .. } if query == "Rome"));
        assert_eq!(search.phase(), Phase::Searching);
        assert!(search.is_loading());

        let update = search.next_update().await.unwrap();
        assert!(matches!(update, Update::ResultsApplied { count: 1, .. }));
        assert_eq!(search.phase(), Phase::ShowingResults);
        assert!(!search.is_loading());
        assert_eq!(*geocoder.calls.lock().unwrap(), vec!["Rome"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_notifies_once() {
        let notices = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&notices);
        let mut search = LocationSearch::builder(Scripted::default())
            .on_search_failure(move |failure| sink.lock().unwrap().push(failure))
            .build();

        search.text_changed("errand");
        let updates = search.settle().await;

        assert!(matches!(
            updates.last(),
            Some(Update::SearchFailed {
                failure: SearchFailure::Unknown,
                ..
            })
        ));
        assert_eq!(*notices.lock().unwrap(), vec![SearchFailure::Unknown]);
        assert_eq!(search.phase(), Phase::Idle);
        assert!(search.candidates().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_out_of_range() {
        let mut search = LocationSearch::builder(Scripted::default()).build();
        let err = search.select(0).unwrap_err();
        assert!(matches!(
            err,
            PlacefinderError::NoSuchCandidate { index: 0, len: 0 }
        ));
        assert!(search.select_id(42).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_by_id() {
        let mut search = LocationSearch::builder(Scripted::default()).build();
        search.text_changed("Oslo");
        search.settle().await;

        let result = search.select_id(1).unwrap();
        assert_eq!(result.name, "Oslo, Somewhere");
        assert_eq!(search.query(), "Oslo, Somewhere");
        assert!(search.is_selected());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_value_drops_pending_work() {
        let geocoder = Scripted::default();
        let mut search = LocationSearch::builder(geocoder.clone()).build();

        search.text_changed("Lima");
        search.set_value("Cusco, Peru");
        assert!(search.is_settled());
        assert_eq!(search.query(), "Cusco, Peru");
        assert_eq!(search.next_update().await, None);
        assert!(geocoder.calls.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_timers() {
        let geocoder = Scripted::default();
        let mut search = LocationSearch::builder(geocoder.clone()).build();

        search.text_changed("Kyiv");
        search.blur();
        search.shutdown();
        assert!(search.is_settled());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(search.next_update().await, None);
        assert!(geocoder.calls.lock().unwrap().is_empty());
    }
}

use tokio::sync::mpsc::UnboundedSender;

use super::timer::{RestartableTimer, TimerTicket};
use crate::config::EngineConfig;

/// What a text change led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Debounce {
    /// A quiet-period timer is running; any earlier one was cancelled.
    Scheduled(TimerTicket),
    /// The text is too short to search. Nothing is pending.
    BelowMinimum,
}

/// Collapses bursts of text changes into one search trigger.
///
/// The trigger carries no text: whoever receives it reads the query as it is
/// at that moment, so the last keystroke of a burst always wins.
pub struct QueryDebouncer<E> {
    timer: RestartableTimer<E>,
    min_query_chars: usize,
}

impl<E: Send + 'static> QueryDebouncer<E> {
    pub fn new(config: &EngineConfig, tx: UnboundedSender<E>, signal: fn(TimerTicket) -> E) -> Self {
        Self {
            timer: RestartableTimer::new(config.quiet_period, tx, signal),
            min_query_chars: config.min_query_chars,
        }
    }

    pub fn on_text_changed(&mut self, text: &str) -> Debounce {
        if self.meets_minimum(text) {
            Debounce::Scheduled(self.timer.schedule())
        } else {
            self.timer.cancel();
            Debounce::BelowMinimum
        }
    }
}

impl<E> QueryDebouncer<E> {
    pub fn meets_minimum(&self, text: &str) -> bool {
        text.chars().count() >= self.min_query_chars
    }

    /// Drop the pending trigger, if any. Used on teardown and on commit.
    pub fn cancel(&mut self) -> bool {
        self.timer.cancel()
    }

    pub fn is_pending(&self) -> bool {
        self.timer.is_pending()
    }

    /// Whether a delivered trigger is still the live one.
    pub fn fired(&mut self, ticket: TimerTicket) -> bool {
        self.timer.acknowledge(ticket)
    }
}

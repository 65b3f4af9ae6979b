//! A single-slot, restartable delayed signal.
//!
//! Scheduling replaces whatever was pending: the previous task is aborted and
//! its ticket stops being live, so even a signal that had already been queued
//! before the abort is rejected by [`RestartableTimer::acknowledge`].

use std::time::Duration;

use tokio::{sync::mpsc::UnboundedSender, task::JoinHandle};

/// Identifies one scheduling of a [`RestartableTimer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerTicket(u64);

pub struct RestartableTimer<E> {
    delay: Duration,
    tx: UnboundedSender<E>,
    signal: fn(TimerTicket) -> E,
    issued: u64,
    pending: Option<(TimerTicket, JoinHandle<()>)>,
}

impl<E: Send + 'static> RestartableTimer<E> {
    /// `signal` builds the message delivered on `tx` when the delay elapses.
    pub fn new(delay: Duration, tx: UnboundedSender<E>, signal: fn(TimerTicket) -> E) -> Self {
        Self {
            delay,
            tx,
            signal,
            issued: 0,
            pending: None,
        }
    }

    /// Start the delay over, cancelling any pending instance.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&mut self) -> TimerTicket {
        self.cancel();

        self.issued += 1;
        let ticket = TimerTicket(self.issued);
        let message = (self.signal)(ticket);
        let tx = self.tx.clone();
        let delay = self.delay;

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(message);
        });
        self.pending = Some((ticket, handle));
        ticket
    }
}

impl<E> RestartableTimer<E> {
    /// Abort the pending instance, if any. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some((_, handle)) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Accept a delivered signal. Only the live ticket is accepted, and only
    /// once; anything else was superseded or cancelled.
    pub fn acknowledge(&mut self, ticket: TimerTicket) -> bool {
        match &self.pending {
            Some((live, _)) if *live == ticket => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}

impl<E> Drop for RestartableTimer<E> {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc::unbounded_channel;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let (tx, mut rx) = unbounded_channel();
        let mut timer = RestartableTimer::new(Duration::from_millis(300), tx, |t| t);

        let started = tokio::time::Instant::now();
        let ticket = timer.schedule();
        assert!(timer.is_pending());

        let delivered = rx.recv().await.unwrap();
        assert_eq!(delivered, ticket);
        assert!(started.elapsed() >= Duration::from_millis(300));
        assert!(timer.acknowledge(delivered));
        assert!(!timer.is_pending());
        assert!(!timer.acknowledge(delivered), "a ticket is accepted once");
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_supersedes() {
        let (tx, mut rx) = unbounded_channel();
        let mut timer = RestartableTimer::new(Duration::from_millis(300), tx, |t| t);

        let first = timer.schedule();
        tokio::time::sleep(Duration::from_millis(200)).await;
        let second = timer.schedule();
        assert_ne!(first, second);

        let delivered = rx.recv().await.unwrap();
        assert_eq!(delivered, second);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err(), "superseded instance never fires");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_delivery() {
        let (tx, mut rx) = unbounded_channel();
        let mut timer = RestartableTimer::new(Duration::from_millis(100), tx, |t| t);

        timer.schedule();
        assert!(timer.cancel());
        assert!(!timer.cancel());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_signal_queued_before_cancel_is_rejected() {
        let (tx, mut rx) = unbounded_channel();
        let mut timer = RestartableTimer::new(Duration::from_millis(100), tx, |t| t);

        timer.schedule();
        tokio::time::sleep(Duration::from_millis(150)).await;
        // Delivered but not yet handled when the timer is cancelled.
        timer.cancel();
        let queued = rx.recv().await.unwrap();
        assert!(!timer.acknowledge(queued));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_pending() {
        let (tx, mut rx) = unbounded_channel();
        {
            let mut timer = RestartableTimer::new(Duration::from_millis(100), tx, |t| t);
            timer.schedule();
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }
}

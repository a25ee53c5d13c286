//! Debounced value application built on the backoff timer.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::core::timer::{tick_fn, BackoffTimer, DelaySchedule, TimerOptions};
use crate::core::Spawn;

/// Single-shot delayed apply: [`set`](Self::set) restarts the wait; a value
/// is published only when the wait elapses without a newer `set`.
///
/// Composed from a [`BackoffTimer`] session per pending value, so the pending
/// apply dies with the debouncer.
pub struct Debouncer<T, S> {
    timer: BackoffTimer<T, S>,
    rx: watch::Receiver<Option<T>>,
}

impl<T, S> Debouncer<T, S>
where
    T: Clone + Send + Sync + 'static,
    S: Spawn,
{
    /// Create a debouncer that applies values `wait` after the last `set`.
    pub fn new(wait: Duration, spawner: S) -> Self {
        let (tx, rx) = watch::channel(None);
        let tx = Arc::new(tx);
        let task = tick_fn(move |value: T, _attempt: u32, _started_at: Instant| {
            let tx = Arc::clone(&tx);
            async move {
                tx.send_replace(Some(value));
                // Single shot: the session completes naturally.
                Ok::<_, anyhow::Error>(false)
            }
        });
        let options = TimerOptions::new()
            .with_initial_delay(wait)
            .with_schedule(DelaySchedule::Fixed(wait));
        Self {
            timer: BackoffTimer::new(task, options, spawner),
            rx,
        }
    }

    /// Schedule `value` to apply after the wait, superseding any pending one.
    pub fn set(&self, value: T) {
        self.timer.start(value);
    }

    /// Drop the pending apply, if any. The last published value is kept.
    pub fn cancel(&self) {
        self.timer.cancel();
    }

    /// Whether a value is waiting to apply.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.timer.is_active()
    }

    /// Last applied value.
    #[must_use]
    pub fn value(&self) -> Option<T> {
        self.rx.borrow().clone()
    }

    /// Subscribe to applied values.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.rx.clone()
    }
}

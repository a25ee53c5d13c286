//! Auto-expiring notification queue.
//!
//! A [`ToastQueue`] holds an ordered collection of ephemeral notifications,
//! each with an independent expiry timer. Per-item state machine: visible →
//! (timer fires OR dismiss) → removed; nothing else. Timer cancellation uses
//! a per-id epoch counter, the same discipline as
//! [`BackoffTimer`](crate::core::BackoffTimer): an expiry whose epoch no
//! longer matches is a no-op.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

use crate::core::Spawn;
use crate::util::clock::now_ms;

/// Visual/semantic tone of a notification. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastTone {
    /// Neutral information.
    Info,
    /// Completed operation.
    Success,
    /// Failed operation.
    Error,
    /// Degraded or risky condition.
    Warning,
}

/// An action button attached to a notification.
#[derive(Clone)]
pub struct ToastAction {
    /// Button label.
    pub label: String,
    /// Handler invoked by the consuming UI.
    pub on_click: Arc<dyn Fn() + Send + Sync>,
    /// Whether the action is currently disabled.
    pub disabled: bool,
}

impl ToastAction {
    /// Create an enabled action.
    pub fn new(label: impl Into<String>, on_click: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            label: label.into(),
            on_click: Arc::new(on_click),
            disabled: false,
        }
    }

    /// Mark the action disabled.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

impl fmt::Debug for ToastAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToastAction")
            .field("label", &self.label)
            .field("disabled", &self.disabled)
            .finish_non_exhaustive()
    }
}

/// One notification.
///
/// Ids are unique within a queue: re-notifying an existing id replaces the
/// prior item and resets its expiry timer.
#[derive(Clone)]
pub struct ToastItem {
    /// Unique identifier within the queue.
    pub id: String,
    /// Tone of the notification.
    pub tone: ToastTone,
    /// Short headline.
    pub title: String,
    /// Optional longer body.
    pub description: Option<String>,
    /// Optional action buttons.
    pub actions: Vec<ToastAction>,
    /// Exempt from automatic timed removal.
    pub sticky: bool,
    /// Expiry delay; the queue default applies when unset.
    pub duration: Option<Duration>,
    /// Wall-clock creation time, for ordering and diagnostics.
    pub created_at_ms: u128,
}

impl fmt::Debug for ToastItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToastItem")
            .field("id", &self.id)
            .field("tone", &self.tone)
            .field("title", &self.title)
            .field("description", &self.description)
            .field("sticky", &self.sticky)
            .field("duration", &self.duration)
            .field("created_at_ms", &self.created_at_ms)
            .finish_non_exhaustive()
    }
}

impl ToastItem {
    /// Create an item with a caller-managed id.
    pub fn new(id: impl Into<String>, tone: ToastTone, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tone,
            title: title.into(),
            description: None,
            actions: Vec::new(),
            sticky: false,
            duration: None,
            created_at_ms: now_ms(),
        }
    }

    /// Create an item with a generated id, for call sites that do not manage
    /// ids themselves.
    pub fn auto(tone: ToastTone, title: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4().to_string(), tone, title)
    }

    /// Auto-id info toast.
    pub fn info(title: impl Into<String>) -> Self {
        Self::auto(ToastTone::Info, title)
    }

    /// Auto-id success toast.
    pub fn success(title: impl Into<String>) -> Self {
        Self::auto(ToastTone::Success, title)
    }

    /// Auto-id error toast.
    pub fn error(title: impl Into<String>) -> Self {
        Self::auto(ToastTone::Error, title)
    }

    /// Auto-id warning toast.
    pub fn warning(title: impl Into<String>) -> Self {
        Self::auto(ToastTone::Warning, title)
    }

    /// Attach a longer body.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach an action button.
    #[must_use]
    pub fn with_action(mut self, action: ToastAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Exempt the item from automatic expiry.
    #[must_use]
    pub const fn sticky(mut self) -> Self {
        self.sticky = true;
        self
    }

    /// Override the queue's default expiry delay.
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

struct ToastState {
    items: Vec<ToastItem>,
    /// Live expiry epoch per id; a timer firing with an older epoch is inert.
    epochs: HashMap<String, u64>,
    next_epoch: u64,
}

struct ToastInner {
    state: Mutex<ToastState>,
    tx: watch::Sender<Vec<ToastItem>>,
}

impl ToastInner {
    fn expire(&self, id: &str, epoch: u64) {
        let mut state = self.state.lock();
        if state.epochs.get(id).copied() != Some(epoch) {
            return;
        }
        state.epochs.remove(id);
        state.items.retain(|item| item.id != id);
        self.tx.send_replace(state.items.clone());
        tracing::debug!(id, "toast expired");
    }
}

/// Ordered queue of ephemeral notifications with per-item expiry timers.
pub struct ToastQueue<S> {
    inner: Arc<ToastInner>,
    spawner: S,
    default_duration: Duration,
}

impl<S> ToastQueue<S>
where
    S: Spawn,
{
    /// Create an empty queue with a default expiry delay for non-sticky items.
    pub fn new(default_duration: Duration, spawner: S) -> Self {
        let (tx, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(ToastInner {
                state: Mutex::new(ToastState {
                    items: Vec::new(),
                    epochs: HashMap::new(),
                    next_epoch: 0,
                }),
                tx,
            }),
            spawner,
            default_duration,
        }
    }

    /// Append a notification.
    ///
    /// An existing item with the same id is replaced: its timer is
    /// invalidated and the replacement is appended at the tail with a fresh
    /// timer (unless sticky).
    pub fn notify(&self, item: ToastItem) {
        let id = item.id.clone();
        let sticky = item.sticky;
        let duration = item.duration.unwrap_or(self.default_duration);
        let epoch = {
            let mut state = self.inner.state.lock();
            state.items.retain(|existing| existing.id != id);
            state.items.push(item);
            state.next_epoch += 1;
            let epoch = state.next_epoch;
            // Bumping the epoch orphans any timer from the replaced item.
            state.epochs.insert(id.clone(), epoch);
            self.inner.tx.send_replace(state.items.clone());
            epoch
        };
        if !sticky {
            let inner = Arc::clone(&self.inner);
            self.spawner.spawn(async move {
                tokio::time::sleep(duration).await;
                inner.expire(&id, epoch);
            });
        }
    }

    /// Remove an item immediately, cancelling its timer. Idempotent on
    /// unknown ids.
    pub fn dismiss(&self, id: &str) {
        let mut state = self.inner.state.lock();
        state.epochs.remove(id);
        let before = state.items.len();
        state.items.retain(|item| item.id != id);
        if state.items.len() != before {
            self.inner.tx.send_replace(state.items.clone());
        }
    }

    /// Snapshot of the visible items, in notify order.
    #[must_use]
    pub fn items(&self) -> Vec<ToastItem> {
        self.inner.state.lock().items.clone()
    }

    /// Subscribe to queue changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<ToastItem>> {
        self.inner.tx.subscribe()
    }

    /// Number of visible items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.state.lock().items.len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.state.lock().items.is_empty()
    }
}

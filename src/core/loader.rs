//! Freshest-result-wins async loader.
//!
//! An [`AsyncLoader`] wraps one cancellable asynchronous operation and owns
//! the `data`/`loading`/`error` state derived from it. Every `load` gets a
//! monotonically increasing generation number; a result is applied to state
//! only while its generation is still the newest and its cancellation token
//! has not been tripped. That single check is the race-resolution rule: for
//! any two overlapping loads, only the newer one's result can ever land,
//! regardless of which resolves first.

use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::watch;
use uuid::Uuid;

use crate::core::{AppResult, CancelToken, Spawn};

/// A cancellable asynchronous operation the loader can re-invoke.
///
/// The token is cooperative: consult it around long sub-operations. On
/// cancellation the eventual resolution is ignored by the caller either way.
#[async_trait]
pub trait Loader<T>: Send + Sync + 'static {
    /// Run the operation once.
    async fn run(&self, cancel: CancelToken) -> AppResult<T>;
}

/// Closure adapter for [`Loader`]. See [`loader_fn`].
pub struct LoaderFn<F>(F);

/// Wrap a `Fn(CancelToken) -> Future` closure as a [`Loader`].
pub fn loader_fn<F>(f: F) -> LoaderFn<F> {
    LoaderFn(f)
}

#[async_trait]
impl<T, F, Fut> Loader<T> for LoaderFn<F>
where
    T: Send + 'static,
    F: Fn(CancelToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = AppResult<T>> + Send + 'static,
{
    async fn run(&self, cancel: CancelToken) -> AppResult<T> {
        (self.0)(cancel).await
    }
}

/// Snapshot of a loader's observable state, published through a watch channel.
#[derive(Debug, Clone)]
pub struct LoaderState<T> {
    /// Last successfully applied result.
    pub data: Option<T>,
    /// User-facing message from the last failed load that was still current.
    pub error: Option<String>,
    /// Whether the newest load is still running.
    pub loading: bool,
    /// Generation of the last applied result.
    pub generation: u64,
}

impl<T> Default for LoaderState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            loading: false,
            generation: 0,
        }
    }
}

/// What became of one `load` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome<T> {
    /// The result reached state.
    Applied(T),
    /// The loader failed while still current; the message was recorded.
    Failed(String),
    /// Discarded: overtaken by a newer generation, cancelled, or disposed.
    Superseded,
}

/// Configuration for an [`AsyncLoader`].
pub struct LoaderOptions<T> {
    immediate: bool,
    fallback_message: String,
    on_success: Option<Arc<dyn Fn(&T) + Send + Sync>>,
    on_error: Option<Arc<dyn Fn(&anyhow::Error) -> Option<String> + Send + Sync>>,
}

impl<T> Default for LoaderOptions<T> {
    fn default() -> Self {
        Self {
            immediate: true,
            fallback_message: "Request failed".to_string(),
            on_success: None,
            on_error: None,
        }
    }
}

impl<T> std::fmt::Debug for LoaderOptions<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderOptions")
            .field("immediate", &self.immediate)
            .field("fallback_message", &self.fallback_message)
            .finish_non_exhaustive()
    }
}

impl<T> LoaderOptions<T> {
    /// Default options: one immediate load, generic fallback message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the loader self-invokes once on creation (default true).
    #[must_use]
    pub fn with_immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    /// Message used when a failure carries no usable message of its own.
    #[must_use]
    pub fn with_fallback_message(mut self, message: impl Into<String>) -> Self {
        self.fallback_message = message.into();
        self
    }

    /// Callback fired with each result that is actually applied.
    #[must_use]
    pub fn with_on_success(mut self, cb: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(cb));
        self
    }

    /// Mapper from a raw failure to a user-facing message. Returning `None`
    /// falls back to the error's own message, then the fallback message.
    #[must_use]
    pub fn with_on_error(
        mut self,
        cb: impl Fn(&anyhow::Error) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.on_error = Some(Arc::new(cb));
        self
    }

    fn map_error(&self, err: &anyhow::Error) -> String {
        if let Some(map) = &self.on_error {
            if let Some(message) = map(err) {
                return message;
            }
        }
        let raw = err.to_string();
        if raw.is_empty() {
            self.fallback_message.clone()
        } else {
            raw
        }
    }
}

type RunFuture<T> = Shared<BoxFuture<'static, LoadOutcome<T>>>;

struct RunHandle<T> {
    generation: u64,
    token: CancelToken,
    future: RunFuture<T>,
}

struct LoaderInner<T> {
    id: Uuid,
    loader: Arc<dyn Loader<T>>,
    options: LoaderOptions<T>,
    /// Dispatch counter; bumped before each new run starts.
    generation: AtomicU64,
    disposed: AtomicBool,
    state: watch::Sender<LoaderState<T>>,
    /// The in-flight run, if any. Also serves as the transition lock: every
    /// generation bump and every state publication happens under it.
    current: Mutex<Option<RunHandle<T>>>,
}

impl<T> LoaderInner<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Start a fresh run, superseding any in-flight one, and return the
    /// joinable shared future for it. A driver task is spawned so the run
    /// completes (and callbacks fire) even if no caller awaits the join.
    fn start_run<S>(inner: &Arc<Self>, spawner: &S) -> RunFuture<T>
    where
        S: Spawn,
    {
        let token = CancelToken::new();
        let future = {
            let mut current = inner.current.lock();
            if let Some(prev) = current.as_ref() {
                prev.token.cancel();
            }
            let generation = inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
            inner.state.send_modify(|s| {
                s.loading = true;
                s.error = None;
            });

            let run = {
                let inner = Arc::clone(inner);
                let token = token.clone();
                async move {
                    tracing::debug!(loader = %inner.id, generation, "dispatching load");
                    let result = inner.loader.run(token.clone()).await;
                    let outcome = inner.apply(generation, &token, result);
                    // Clear the in-flight marker so a later non-forced load
                    // dispatches fresh instead of joining a settled run.
                    let mut current = inner.current.lock();
                    if current
                        .as_ref()
                        .is_some_and(|run| run.generation == generation)
                    {
                        *current = None;
                    }
                    outcome
                }
            }
            .boxed()
            .shared();

            *current = Some(RunHandle {
                generation,
                token,
                future: run.clone(),
            });
            run
        };

        let driver = future.clone();
        spawner.spawn(async move {
            let _outcome = driver.await;
        });
        future
    }

    /// Apply one run's result if it is still the freshest. Returns what the
    /// joiners observe.
    fn apply(&self, generation: u64, token: &CancelToken, result: AppResult<T>) -> LoadOutcome<T> {
        let _transition = self.current.lock();
        let still_current = !self.disposed.load(Ordering::Acquire)
            && self.generation.load(Ordering::Acquire) == generation;
        if !still_current {
            tracing::debug!(loader = %self.id, generation, "superseded result discarded");
            return LoadOutcome::Superseded;
        }
        if token.is_cancelled() {
            // Still the newest generation, so the loading flag is ours to clear.
            self.state.send_modify(|s| s.loading = false);
            tracing::debug!(loader = %self.id, generation, "cancelled result discarded");
            return LoadOutcome::Superseded;
        }
        match result {
            Ok(value) => {
                if let Some(cb) = &self.options.on_success {
                    cb(&value);
                }
                self.state.send_modify(|s| {
                    s.data = Some(value.clone());
                    s.error = None;
                    s.loading = false;
                    s.generation = generation;
                });
                LoadOutcome::Applied(value)
            }
            Err(err) => {
                let message = self.options.map_error(&err);
                tracing::warn!(loader = %self.id, generation, error = %err, "load failed");
                self.state.send_modify(|s| {
                    s.error = Some(message.clone());
                    s.loading = false;
                    s.generation = generation;
                });
                LoadOutcome::Failed(message)
            }
        }
    }
}

/// Per-request concurrency guard around one loader function.
///
/// Owns the loader's state and enforces the staleness rule documented at the
/// module level. Unless configured otherwise it self-invokes once on
/// creation (on a spawned task, never synchronously in the constructor) and
/// cancels its in-flight run when dropped.
pub struct AsyncLoader<T, S> {
    inner: Arc<LoaderInner<T>>,
    spawner: S,
}

impl<T, S> AsyncLoader<T, S>
where
    T: Clone + Send + Sync + 'static,
    S: Spawn + Clone + Send + 'static,
{
    /// Create a loader. With `immediate` set (the default) the first load is
    /// scheduled right away.
    pub fn new(loader: impl Loader<T>, options: LoaderOptions<T>, spawner: S) -> Self {
        let (state, _) = watch::channel(LoaderState::default());
        let inner = Arc::new(LoaderInner {
            id: Uuid::new_v4(),
            loader: Arc::new(loader),
            options,
            generation: AtomicU64::new(0),
            disposed: AtomicBool::new(false),
            state,
            current: Mutex::new(None),
        });
        let this = Self { inner, spawner };
        if this.inner.options.immediate {
            let inner = Arc::clone(&this.inner);
            let spawner = this.spawner.clone();
            this.spawner.spawn(async move {
                let run = LoaderInner::start_run(&inner, &spawner);
                let _outcome = run.await;
            });
        }
        this
    }

    /// Execute the loader.
    ///
    /// With `force` false, an in-flight run is joined instead of dispatching
    /// a duplicate; the loader function executes once and every joiner
    /// observes the same outcome. With `force` true a fresh run starts,
    /// cancelling and superseding any in-flight one.
    pub async fn load(&self, force: bool) -> LoadOutcome<T> {
        if self.inner.disposed.load(Ordering::Acquire) {
            return LoadOutcome::Superseded;
        }
        let joined = if force {
            None
        } else {
            self.inner
                .current
                .lock()
                .as_ref()
                .map(|run| run.future.clone())
        };
        let run = match joined {
            Some(run) => {
                tracing::debug!(loader = %self.inner.id, "joining in-flight load");
                run
            }
            None => LoaderInner::start_run(&self.inner, &self.spawner),
        };
        run.await
    }

    /// Cancel the in-flight run without starting a new one. Idempotent.
    pub fn abort(&self) {
        let current = self.inner.current.lock();
        if let Some(run) = current.as_ref() {
            run.token.cancel();
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> LoaderState<T> {
        self.inner.state.borrow().clone()
    }

    /// Last applied result, if any.
    #[must_use]
    pub fn data(&self) -> Option<T> {
        self.inner.state.borrow().data.clone()
    }

    /// Message from the last failure that was still current, if any.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.inner.state.borrow().error.clone()
    }

    /// Whether the newest load is still running.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    /// Dispatch counter value; the generation the next applied result must
    /// carry to land.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }

    /// Subscribe to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LoaderState<T>> {
        self.inner.state.subscribe()
    }
}

impl<T, S> Drop for AsyncLoader<T, S> {
    fn drop(&mut self) {
        self.inner.disposed.store(true, Ordering::Release);
        let current = self.inner.current.lock();
        if let Some(run) = current.as_ref() {
            run.token.cancel();
        }
    }
}

//! Cancellable, restartable backoff timer.
//!
//! A [`BackoffTimer`] runs one unit of work repeatedly with a
//! caller-controlled delay between attempts, stopping on caller request,
//! attempt limit, duration limit, or when the work itself signals completion
//! or fails. Exactly one session is live per timer: starting a new one
//! supersedes any prior session.
//!
//! Internally each session carries an epoch; a scheduled continuation whose
//! epoch no longer matches the timer's current epoch exits without side
//! effects. That is how `cancel` clears pending work without preemption: a
//! tick already executing when `cancel` lands completes, but nothing further
//! runs and no terminal callback fires.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::{sleep, Instant};

use crate::config::BackoffPolicy;
use crate::core::{AppResult, Spawn};

/// The unit of work a timer session executes per attempt.
#[async_trait]
pub trait TimerTask<C>: Send + Sync + 'static {
    /// Run one attempt. `Ok(true)` reschedules after the next delay,
    /// `Ok(false)` completes the session naturally (no callback), `Err`
    /// stops the session through `on_error`. Errors are terminal; retries
    /// happen only on an explicit `Ok(true)`.
    async fn tick(&self, context: C, attempt: u32, started_at: Instant) -> AppResult<bool>;
}

/// Closure adapter for [`TimerTask`]. See [`tick_fn`].
pub struct TickFn<F>(F);

/// Wrap a `Fn(context, attempt, started_at) -> Future` closure as a
/// [`TimerTask`].
pub fn tick_fn<F>(f: F) -> TickFn<F> {
    TickFn(f)
}

#[async_trait]
impl<C, F, Fut> TimerTask<C> for TickFn<F>
where
    C: Send + 'static,
    F: Fn(C, u32, Instant) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = AppResult<bool>> + Send + 'static,
{
    async fn tick(&self, context: C, attempt: u32, started_at: Instant) -> AppResult<bool> {
        (self.0)(context, attempt, started_at).await
    }
}

/// How long to wait after a completed attempt before the next one.
#[derive(Clone)]
pub enum DelaySchedule {
    /// The same delay between every attempt.
    Fixed(Duration),
    /// Capped exponential growth from a [`BackoffPolicy`].
    Backoff(BackoffPolicy),
    /// Caller-supplied delay function of the completed attempt index.
    Custom(Arc<dyn Fn(u32) -> Duration + Send + Sync>),
}

impl DelaySchedule {
    /// Delay to apply after `attempt` completed.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self {
            Self::Fixed(delay) => *delay,
            Self::Backoff(policy) => policy.delay(attempt),
            Self::Custom(f) => f(attempt),
        }
    }
}

impl Default for DelaySchedule {
    fn default() -> Self {
        Self::Backoff(BackoffPolicy::default())
    }
}

impl std::fmt::Debug for DelaySchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed(delay) => f.debug_tuple("Fixed").field(delay).finish(),
            Self::Backoff(policy) => f.debug_tuple("Backoff").field(policy).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Configuration for a [`BackoffTimer`].
///
/// `on_timeout`, `on_max_attempts`, and `on_error` are policy signals, not
/// exceptions; at most one of them fires per session.
#[derive(Clone, Default)]
pub struct TimerOptions {
    initial_delay: Duration,
    max_attempts: Option<u32>,
    max_duration: Option<Duration>,
    schedule: DelaySchedule,
    on_timeout: Option<Arc<dyn Fn() + Send + Sync>>,
    on_max_attempts: Option<Arc<dyn Fn() + Send + Sync>>,
    on_error: Option<Arc<dyn Fn(&anyhow::Error) + Send + Sync>>,
}

impl std::fmt::Debug for TimerOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerOptions")
            .field("initial_delay", &self.initial_delay)
            .field("max_attempts", &self.max_attempts)
            .field("max_duration", &self.max_duration)
            .field("schedule", &self.schedule)
            .finish_non_exhaustive()
    }
}

impl TimerOptions {
    /// Default options: no initial delay, no limits, default backoff schedule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay before the first attempt (default zero; the first attempt is
    /// still scheduled, never run synchronously inside `start`).
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Stop after this many attempts, firing `on_max_attempts`.
    #[must_use]
    pub const fn with_max_attempts(mut self, max: u32) -> Self {
        self.max_attempts = Some(max);
        self
    }

    /// Stop once the session has run this long, firing `on_timeout`. Checked
    /// only at tick boundaries, so termination can lag by one tick duration.
    #[must_use]
    pub const fn with_max_duration(mut self, max: Duration) -> Self {
        self.max_duration = Some(max);
        self
    }

    /// Delay schedule between attempts.
    #[must_use]
    pub fn with_schedule(mut self, schedule: DelaySchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Callback when the duration limit stops the session.
    #[must_use]
    pub fn with_on_timeout(mut self, cb: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_timeout = Some(Arc::new(cb));
        self
    }

    /// Callback when the attempt limit stops the session.
    #[must_use]
    pub fn with_on_max_attempts(mut self, cb: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_max_attempts = Some(Arc::new(cb));
        self
    }

    /// Callback when a tick error stops the session.
    #[must_use]
    pub fn with_on_error(mut self, cb: impl Fn(&anyhow::Error) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(cb));
        self
    }
}

struct Session {
    epoch: u64,
    active: bool,
    attempt: u32,
}

fn finish_session(session: &Mutex<Session>, epoch: u64) {
    let mut s = session.lock();
    if s.epoch == epoch {
        s.active = false;
    }
}

/// Cancellable, restartable delayed-execution primitive.
///
/// Underlies both generic polling (interval re-invocation) and value
/// debouncing (single-shot delayed apply, see
/// [`Debouncer`](crate::core::Debouncer)). The pending session is cancelled
/// on drop, so a timer never outlives its owner.
pub struct BackoffTimer<C, S> {
    task: Arc<dyn TimerTask<C>>,
    options: TimerOptions,
    spawner: S,
    session: Arc<Mutex<Session>>,
}

impl<C, S> BackoffTimer<C, S>
where
    C: Clone + Send + 'static,
    S: Spawn,
{
    /// Create a timer. No session runs until [`start`](Self::start).
    pub fn new(task: impl TimerTask<C>, options: TimerOptions, spawner: S) -> Self {
        Self {
            task: Arc::new(task),
            options,
            spawner,
            session: Arc::new(Mutex::new(Session {
                epoch: 0,
                active: false,
                attempt: 0,
            })),
        }
    }

    /// Begin a new session at attempt 0, superseding any live session.
    pub fn start(&self, context: C) {
        self.start_from(0, context);
    }

    /// Begin a new session with a seeded attempt counter (resume instead of
    /// restart, e.g. continuing a cooldown), superseding any live session.
    pub fn start_from(&self, attempt: u32, context: C) {
        let epoch = {
            let mut s = self.session.lock();
            s.epoch += 1;
            s.active = true;
            s.attempt = attempt;
            s.epoch
        };

        let task = Arc::clone(&self.task);
        let options = self.options.clone();
        let session = Arc::clone(&self.session);
        self.spawner.spawn(async move {
            let started_at = Instant::now();
            let mut attempt = attempt;
            tracing::debug!(epoch, attempt, "timer session started");
            if !options.initial_delay.is_zero() {
                sleep(options.initial_delay).await;
            }
            loop {
                if session.lock().epoch != epoch {
                    return;
                }
                if let Some(max) = options.max_duration {
                    if started_at.elapsed() >= max {
                        finish_session(&session, epoch);
                        tracing::debug!(epoch, "timer session hit max duration");
                        if let Some(cb) = &options.on_timeout {
                            cb();
                        }
                        return;
                    }
                }
                if let Some(max) = options.max_attempts {
                    if attempt >= max {
                        finish_session(&session, epoch);
                        tracing::debug!(epoch, "timer session hit max attempts");
                        if let Some(cb) = &options.on_max_attempts {
                            cb();
                        }
                        return;
                    }
                }

                let outcome = task.tick(context.clone(), attempt, started_at).await;
                // A cancel that landed mid-tick lets the tick finish, then
                // stops everything here with no terminal callback.
                if session.lock().epoch != epoch {
                    return;
                }
                match outcome {
                    Err(err) => {
                        finish_session(&session, epoch);
                        tracing::warn!(epoch, error = %err, "timer tick failed, stopping session");
                        if let Some(cb) = &options.on_error {
                            cb(&err);
                        }
                        return;
                    }
                    Ok(false) => {
                        finish_session(&session, epoch);
                        return;
                    }
                    Ok(true) => {
                        let delay = options.schedule.delay_for(attempt);
                        attempt += 1;
                        {
                            let mut s = session.lock();
                            if s.epoch != epoch {
                                return;
                            }
                            s.attempt = attempt;
                        }
                        sleep(delay).await;
                    }
                }
            }
        });
    }

    /// Cancel the live session, if any. Idempotent; pending scheduled work
    /// is invalidated and no terminal callback fires.
    pub fn cancel(&self) {
        let mut s = self.session.lock();
        s.epoch += 1;
        s.active = false;
    }

    /// Whether a session is currently live.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session.lock().active
    }

    /// Attempt counter of the live session; `None` when inactive.
    #[must_use]
    pub fn current_attempt(&self) -> Option<u32> {
        let s = self.session.lock();
        s.active.then_some(s.attempt)
    }
}

impl<C, S> Drop for BackoffTimer<C, S> {
    fn drop(&mut self) {
        let mut s = self.session.lock();
        s.epoch += 1;
        s.active = false;
    }
}

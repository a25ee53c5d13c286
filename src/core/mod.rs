//! Core orchestration primitives and shared abstractions.

pub mod cancel;
pub mod cache;
pub mod debounce;
pub mod error;
pub mod loader;
pub mod spawn;
pub mod timer;
pub mod toast;

pub use cancel::CancelToken;
pub use cache::{CacheOptions, CacheStats, RequestCache};
pub use debounce::Debouncer;
pub use error::{AppResult, OrchestratorError};
pub use loader::{loader_fn, AsyncLoader, LoadOutcome, Loader, LoaderFn, LoaderOptions, LoaderState};
pub use spawn::Spawn;
pub use timer::{tick_fn, BackoffTimer, DelaySchedule, TickFn, TimerOptions, TimerTask};
pub use toast::{ToastAction, ToastItem, ToastQueue, ToastTone};

//! Runtime seam for spawning orchestration tasks.

use std::future::Future;

/// Abstraction for spawning background work on a runtime.
///
/// Every primitive that schedules deferred work (loader self-invocation,
/// timer sessions, toast expiry) goes through this seam so tests and
/// embedders can substitute their own runtime.
pub trait Spawn {
    /// Spawn an async task that runs to completion in the background.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

//! Error types for orchestration operations.

use std::sync::Arc;

use thiserror::Error;

/// Errors produced by orchestration components.
///
/// `Clone` so one failure can be handed to every coalesced waiter of a
/// single-flight fetch.
#[derive(Debug, Clone, Error)]
pub enum OrchestratorError {
    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A fetcher failed while its result was still wanted.
    #[error("fetch failed: {0}")]
    Fetch(Arc<anyhow::Error>),
}

impl OrchestratorError {
    /// Wrap a fetcher failure for fan-out to coalesced waiters.
    pub fn fetch(err: anyhow::Error) -> Self {
        Self::Fetch(Arc::new(err))
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;

//! # Hirelight Loadkit
//!
//! Async orchestration primitives for the Hirelight talent platform.
//!
//! Every data-fetching surface of the platform builds on the same four
//! primitives. This crate is that layer: it coordinates concurrent,
//! cancellable, retried, and cached asynchronous operations, guarantees that
//! only the freshest result of a race ever reaches visible state, and
//! guarantees that timers, in-flight requests, and auto-expiring UI
//! notifications never outlive their owners.
//!
//! ## Core Problem Solved
//!
//! UI-driven data fetching has failure modes that plain `async` does not
//! solve on its own:
//!
//! - **Stale responses**: a slow response from an old request must never
//!   overwrite the result of a newer one
//! - **Duplicate dispatch**: N callers asking for the same resource at the
//!   same instant should cost one fetch, not N
//! - **Leaked timers**: polling loops, debounce waits, and notification
//!   expiry timers must die with the owner that started them
//! - **Redundant refetching**: identical requests inside a short window
//!   should be served from memory
//!
//! ## Primitives
//!
//! - [`core::AsyncLoader`] — wraps a cancellable loader with generation
//!   tracking, in-flight joining, and abort-on-supersede; the per-request
//!   concurrency guard
//! - [`core::RequestCache`] — keyed TTL cache with per-key single-flight
//!   de-duplication, layered in front of loader functions
//! - [`core::BackoffTimer`] — cancellable, restartable delayed execution
//!   with attempt/duration limits and a configurable backoff schedule
//! - [`core::ToastQueue`] — ordered ephemeral notifications with per-item
//!   expiry timers and a sticky exemption
//! - [`core::Debouncer`] — single-shot delayed apply built on
//!   [`core::BackoffTimer`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use hirelight_loadkit::core::{loader_fn, AsyncLoader, LoaderOptions};
//! use hirelight_loadkit::runtime::TokioSpawner;
//!
//! let loader = AsyncLoader::new(
//!     loader_fn(|cancel| async move {
//!         let body = fetch_candidate("c-42").await?;
//!         anyhow::ensure!(!cancel.is_cancelled(), "cancelled");
//!         Ok(body)
//!     }),
//!     LoaderOptions::new().with_fallback_message("Could not load candidate"),
//!     TokioSpawner::current(),
//! );
//!
//! let outcome = loader.load(true).await;
//! ```
//!
//! For complete examples, see:
//! - `tests/loader_test.rs` - Race-freedom integration tests
//! - `tests/cache_test.rs` - TTL and coalescing integration tests

#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core orchestration primitives: loader, cache, timer, toasts, debounce.
pub mod core;
/// Configuration models for backoff, cache, loader, and toast defaults.
pub mod config;
/// Builders to construct primitives from validated configuration.
pub mod builders;
/// Runtime adapters for spawning orchestration tasks.
pub mod runtime;
/// Shared utilities.
pub mod util;

//! Configuration models for backoff, cache, loader, and toast defaults.

pub mod settings;

pub use settings::{
    BackoffPolicy, CacheSettings, LoaderSettings, LoadkitConfig, TimerSettings, ToastSettings,
};

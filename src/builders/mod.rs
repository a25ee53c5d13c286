//! Builders to construct orchestration primitives from configuration.

pub mod kit_builder;

pub use kit_builder::{
    build_cache, build_loader, build_timer, build_timer_options, build_toast_queue,
};

//! Unit tests for individual components

mod backoff_test;
mod builders_test;
mod cancel_test;
mod config_test;
mod error_test;
mod runtime_test;
mod util_test;

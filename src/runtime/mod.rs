//! Runtime adapters for spawning orchestration tasks.

pub mod tokio_spawner;

pub use tokio_spawner::TokioSpawner;

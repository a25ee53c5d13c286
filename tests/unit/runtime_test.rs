//! Tests for runtime spawner adapters

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hirelight_loadkit::core::Spawn;
use hirelight_loadkit::runtime::TokioSpawner;

#[tokio::test]
async fn test_current_spawner_runs_tasks() {
    let ran = Arc::new(AtomicBool::new(false));
    let ran_in_task = Arc::clone(&ran);
    let (tx, rx) = tokio::sync::oneshot::channel();

    let spawner = TokioSpawner::current();
    spawner.spawn(async move {
        ran_in_task.store(true, Ordering::SeqCst);
        let _ = tx.send(());
    });

    rx.await.unwrap();
    assert!(ran.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_spawner_from_explicit_handle() {
    let spawner = TokioSpawner::new(tokio::runtime::Handle::current());
    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        let _ = tx.send(42_u32);
    });
    assert_eq!(rx.await.unwrap(), 42);
}

#[tokio::test]
async fn test_spawner_clones_share_the_runtime() {
    let spawner = TokioSpawner::current();
    let clone = spawner.clone();
    let (tx, rx) = tokio::sync::oneshot::channel();
    clone.spawn(async move {
        let _ = tx.send(());
    });
    rx.await.unwrap();
}

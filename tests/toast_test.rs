//! Integration tests for the toast queue: auto-expiry, sticky exemption,
//! and replace-on-duplicate-id timer resets.

use std::time::Duration;

use hirelight_loadkit::core::{ToastAction, ToastItem, ToastQueue, ToastTone};
use hirelight_loadkit::runtime::TokioSpawner;

const DEFAULT: Duration = Duration::from_millis(200);

fn queue() -> ToastQueue<TokioSpawner> {
    ToastQueue::new(DEFAULT, TokioSpawner::current())
}

fn ids(queue: &ToastQueue<TokioSpawner>) -> Vec<String> {
    queue.items().into_iter().map(|item| item.id).collect()
}

#[tokio::test(start_paused = true)]
async fn test_auto_dismiss_after_duration() {
    let queue = queue();
    queue.notify(
        ToastItem::new("a", ToastTone::Info, "Saved").with_duration(Duration::from_millis(100)),
    );
    assert_eq!(queue.len(), 1);

    tokio::time::sleep(Duration::from_millis(99)).await;
    assert_eq!(queue.len(), 1);
    tokio::time::sleep(Duration::from_millis(2)).await;
    assert!(queue.is_empty(), "item must expire at its duration");
}

#[tokio::test(start_paused = true)]
async fn test_sticky_item_persists_until_dismiss() {
    let queue = queue();
    queue.notify(
        ToastItem::new("err", ToastTone::Error, "Submission failed")
            .with_duration(Duration::from_millis(100))
            .sticky(),
    );

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert_eq!(queue.len(), 1, "sticky items never expire on their own");

    queue.dismiss("err");
    assert!(queue.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_id_replaces_and_resets_timer() {
    let queue = queue();
    queue.notify(
        ToastItem::new("a", ToastTone::Info, "first")
            .with_duration(Duration::from_millis(100)),
    );
    tokio::time::sleep(Duration::from_millis(60)).await;

    // Re-notify before the first timer fires: replaced, timer restarted.
    queue.notify(
        ToastItem::new("a", ToastTone::Success, "second")
            .with_duration(Duration::from_millis(100)),
    );
    assert_eq!(queue.len(), 1, "duplicate ids never stack");
    assert_eq!(queue.items()[0].title, "second");

    // Past the first item's original deadline: the orphaned timer is inert.
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(queue.len(), 1);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(queue.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_dismiss_unknown_id_is_noop() {
    let queue = queue();
    queue.dismiss("ghost");
    queue.notify(ToastItem::new("a", ToastTone::Info, "hello").sticky());
    queue.dismiss("ghost");
    queue.dismiss("a");
    queue.dismiss("a");
    assert!(queue.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_items_keep_notify_order_and_replace_reappends() {
    let queue = queue();
    queue.notify(ToastItem::new("a", ToastTone::Info, "a").sticky());
    queue.notify(ToastItem::new("b", ToastTone::Info, "b").sticky());
    queue.notify(ToastItem::new("c", ToastTone::Info, "c").sticky());
    assert_eq!(ids(&queue), vec!["a", "b", "c"]);

    queue.notify(ToastItem::new("a", ToastTone::Warning, "a again").sticky());
    assert_eq!(ids(&queue), vec!["b", "c", "a"]);
}

#[tokio::test(start_paused = true)]
async fn test_default_duration_applies_when_unset() {
    let queue = queue();
    queue.notify(ToastItem::new("a", ToastTone::Info, "default"));

    tokio::time::sleep(DEFAULT - Duration::from_millis(10)).await;
    assert_eq!(queue.len(), 1);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(queue.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_subscribe_sees_expiry() {
    let queue = queue();
    let mut rx = queue.subscribe();
    queue.notify(ToastItem::new("a", ToastTone::Success, "done"));
    rx.wait_for(|items| items.len() == 1).await.unwrap();
    rx.wait_for(Vec::is_empty).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_builders_and_actions() {
    let queue = queue();
    let item = ToastItem::warning("Session expiring")
        .with_description("Your interview session ends in two minutes")
        .with_action(ToastAction::new("Extend", || {}))
        .with_action(ToastAction::new("Ignore", || {}).disabled())
        .sticky();
    assert_eq!(item.tone, ToastTone::Warning);
    assert!(!item.id.is_empty(), "auto ids are generated");
    assert!(item.actions[1].disabled);

    queue.notify(item);
    assert_eq!(queue.len(), 1);
}

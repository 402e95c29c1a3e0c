use chrono::Utc;
use newsroom_core::{PollHint, QueueManager};
use newsroom_interfaces::{Item, SourceKind};

fn item(id: &str, source: &str, title: &str) -> Item {
    Item::new(id, SourceKind::Rss, source, title, Utc::now())
}

#[tokio::test]
async fn sample_is_balanced_across_sources_before_exhausting_any_one() {
    let manager = QueueManager::new(50);
    manager.register_source("chatty", SourceKind::Rss, 60_000).await;
    manager.register_source("quiet", SourceKind::Rss, 60_000).await;

    let chatty_items: Vec<Item> = (0..10).map(|i| item(&format!("chatty-{i}"), "chatty", "noise")).collect();
    manager.add_items("chatty", chatty_items).await.unwrap();
    manager.add_items("quiet", vec![item("quiet-0", "quiet", "signal")]).await.unwrap();

    let sample = manager.sample(4).await;
    assert_eq!(sample.len(), 4);
    assert!(sample.iter().any(|i| i.source_name == "quiet"), "the quiet source must not be starved out of a small sample");
}

#[tokio::test]
async fn three_consecutive_empty_fetches_signal_widen() {
    let manager = QueueManager::new(50);
    manager.register_source("wire", SourceKind::Rss, 60_000).await;

    manager.add_items("wire", Vec::new()).await.unwrap();
    manager.add_items("wire", Vec::new()).await.unwrap();
    let hint = manager.add_items("wire", Vec::new()).await.unwrap();

    assert_eq!(hint, PollHint::Widen);
}

#[tokio::test]
async fn three_consecutive_nonempty_fetches_signal_narrow() {
    let manager = QueueManager::new(50);
    manager.register_source("wire", SourceKind::Rss, 60_000).await;

    for i in 0..3 {
        let hint = manager.add_items("wire", vec![item(&format!("wire-{i}"), "wire", "headline")]).await.unwrap();
        if i == 2 {
            assert_eq!(hint, PollHint::Narrow);
        }
    }
}

#[tokio::test]
async fn adding_items_to_an_unregistered_source_fails() {
    let manager = QueueManager::new(50);
    let err = manager.add_items("ghost", Vec::new()).await;
    assert!(err.is_err());
}

#[tokio::test]
async fn a_queue_beyond_capacity_evicts_the_oldest_item() {
    let manager = QueueManager::new(2);
    manager.register_source("wire", SourceKind::Rss, 60_000).await;

    manager.add_items("wire", vec![item("a", "wire", "one")]).await.unwrap();
    manager.add_items("wire", vec![item("b", "wire", "two")]).await.unwrap();
    manager.add_items("wire", vec![item("c", "wire", "three")]).await.unwrap();

    let sample = manager.sample(10).await;
    let ids: Vec<&str> = sample.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids.len(), 2);
    assert!(!ids.contains(&"a"), "the oldest item should have been evicted");
}

use chrono::Utc;
use newsroom_core::CorrelationEngine;
use newsroom_interfaces::{Item, SourceKind};

fn item(id: &str, source: &str, title: &str) -> Item {
    Item::new(id, SourceKind::Rss, source, title, Utc::now()).with_summary("")
}

#[tokio::test]
async fn near_identical_headlines_from_different_outlets_become_duplicates() {
    let engine = CorrelationEngine::new(0.6);

    let a = item("a", "wire-a", "Central bank raises interest rates amid inflation concerns");
    let b = item("b", "wire-b", "Wire B — Central bank raises interest rates amid inflation concerns");

    engine.process_item(&a).await;
    engine.process_item(&b).await;

    let overlay_a = engine.overlay("a").await.unwrap();
    let overlay_b = engine.overlay("b").await.unwrap();

    assert!(overlay_a.is_duplicate_primary);
    assert!(!overlay_b.is_duplicate_primary);
    assert_eq!(overlay_a.duplicate_count, 2);
    assert_eq!(overlay_b.duplicate_count, 2);
}

#[tokio::test]
async fn unrelated_headlines_stay_in_separate_clusters() {
    let engine = CorrelationEngine::new(0.85);

    let a = item("a", "wire-a", "Central bank raises interest rates");
    let b = item("b", "wire-b", "Local team wins championship game");

    engine.process_item(&a).await;
    engine.process_item(&b).await;

    let overlay_a = engine.overlay("a").await.unwrap();
    let overlay_b = engine.overlay("b").await.unwrap();

    assert_eq!(overlay_a.cluster_size, 1);
    assert_eq!(overlay_b.cluster_size, 1);
}

#[tokio::test]
async fn shared_entities_merge_distinct_items_into_one_cluster() {
    let engine = CorrelationEngine::new(0.99);

    let a = item("a", "wire-a", "AAPL rallies as investors cheer earnings from the United States");
    let b = item("b", "wire-b", "Analysts raise targets for AAPL shares after United States hearing");

    engine.process_item(&a).await;
    engine.process_item(&b).await;

    let overlay_a = engine.overlay("a").await.unwrap();
    assert_eq!(overlay_a.cluster_size, 2);
}

#[tokio::test]
async fn a_three_way_cluster_with_contradictory_sentiment_is_flagged() {
    let engine = CorrelationEngine::new(0.99);

    let a = item("a", "wire-a", "Regulator approves AAPL deal in the United States");
    let b = item("b", "wire-b", "Regulator rejects AAPL deal in the United States");
    let c = item("c", "wire-c", "United States regulator reviews AAPL deal further");

    engine.process_item(&a).await;
    engine.process_item(&b).await;
    engine.process_item(&c).await;

    let overlay = engine.overlay("a").await.unwrap();
    assert_eq!(overlay.cluster_size, 3);
    assert!(overlay.disagreement);
}

#[tokio::test]
async fn an_item_with_no_shared_ground_never_flags_disagreement() {
    let engine = CorrelationEngine::new(0.99);

    let a = item("a", "wire-a", "Regulator approves AAPL deal in the United States");
    engine.process_item(&a).await;

    let overlay = engine.overlay("a").await.unwrap();
    assert!(!overlay.disagreement);
}

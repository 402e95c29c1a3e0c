use chrono::{Duration, Utc};
use newsroom_core::{Aggregator, SourceConfig};
use newsroom_interfaces::{Item, SourceKind};

fn item(id: &str, source: &str, title: &str) -> Item {
    Item::new(id, SourceKind::Rss, source, title, Utc::now())
}

#[tokio::test]
async fn merging_the_same_id_twice_keeps_one_entry() {
    let aggregator = Aggregator::new();
    aggregator.register_source("wire", SourceConfig::default()).await;

    aggregator.merge_items(vec![item("a", "wire", "first headline")]).await;
    aggregator.merge_items(vec![item("a", "wire", "first headline, updated")]).await;

    let items = aggregator.items().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "first headline, updated");
}

#[tokio::test]
async fn a_source_with_no_refresh_history_is_immediately_due() {
    let aggregator = Aggregator::new();
    aggregator.register_source("wire", SourceConfig::default()).await;

    let due = aggregator.sources_due_for_refresh().await;
    assert_eq!(due, vec!["wire".to_string()]);
}

#[tokio::test]
async fn a_source_refreshed_moments_ago_is_not_yet_due() {
    let aggregator = Aggregator::new();
    let config = SourceConfig { refresh_interval: Duration::minutes(30), ..Default::default() };
    aggregator.register_source("wire", config).await;

    aggregator.update_source_state("wire", 2, None).await.unwrap();

    let due = aggregator.sources_due_for_refresh().await;
    assert!(due.is_empty());
}

#[tokio::test]
async fn a_fetch_failure_is_recorded_and_surfaced_in_health() {
    let aggregator = Aggregator::new();
    aggregator.register_source("wire", SourceConfig::default()).await;

    for _ in 0..3 {
        aggregator.update_source_state("wire", 0, Some("timed out".to_string())).await.unwrap();
    }

    let state = aggregator.source_state("wire").await.unwrap();
    assert_eq!(state.last_error.as_deref(), Some("timed out"));

    let health = aggregator.get_health().await;
    assert_eq!(health.healthy + health.degraded + health.failing, 1);
}

#[tokio::test]
async fn mark_fetching_toggles_the_is_fetching_flag() {
    let aggregator = Aggregator::new();
    aggregator.register_source("wire", SourceConfig::default()).await;

    aggregator.mark_fetching("wire", true).await.unwrap();
    assert!(aggregator.source_state("wire").await.unwrap().is_fetching);

    aggregator.mark_fetching("wire", false).await.unwrap();
    assert!(!aggregator.source_state("wire").await.unwrap().is_fetching);
}

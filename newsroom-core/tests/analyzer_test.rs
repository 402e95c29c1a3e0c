use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::StreamExt;
use newsroom_core::llm::MockProvider;
use newsroom_core::{Analyzer, CancellationToken, MockStore};
use newsroom_interfaces::{Item, Provider, SourceKind};
use tokio::sync::Semaphore;

fn item(id: &str, title: &str) -> Item {
    Item::new(id, SourceKind::Rss, "wire", title, Utc::now())
}

fn analyzer(providers: Vec<Arc<dyn Provider>>) -> Analyzer {
    Analyzer::new(providers, None, Arc::new(MockStore::default()), Arc::new(Semaphore::new(4)), 10, 1, 10, 24)
}

#[tokio::test]
async fn analyze_with_context_uses_the_first_available_provider() {
    let provider: Arc<dyn Provider> = Arc::new(MockProvider::new("primary", "the analysis"));
    let a = analyzer(vec![provider]);

    let result = a.analyze_with_context(&item("a", "a headline"), &[]).await.unwrap();
    assert_eq!(result.provider, "primary");
    assert_eq!(result.content, "the analysis");
    assert!(!result.loading);
}

#[tokio::test]
async fn analyze_with_context_falls_back_when_the_first_provider_is_unavailable() {
    let unavailable: Arc<dyn Provider> = Arc::new(MockProvider::unavailable("down"));
    let backup: Arc<dyn Provider> = Arc::new(MockProvider::new("backup", "fallback analysis"));
    let a = analyzer(vec![unavailable, backup]);

    let result = a.analyze_with_context(&item("a", "a headline"), &[]).await.unwrap();
    assert_eq!(result.provider, "backup");
}

#[tokio::test]
async fn a_duplicate_trigger_while_loading_returns_the_in_progress_marker_instead_of_starting_twice() {
    let provider: Arc<dyn Provider> =
        Arc::new(MockProvider::new("slow", "eventual analysis").with_chunk_delay(Duration::from_millis(200)));
    let a = Arc::new(analyzer(vec![provider.clone()]));

    let it = item("a", "a headline");
    let cancel = CancellationToken::new();
    let (_stream, _meta) = a.stream_analysis(&it, &[], cancel).await.unwrap();

    assert!(a.is_loading("a").await);
    let duplicate = a.analyze_with_context(&it, &[]).await.unwrap();
    assert_eq!(duplicate.provider, "pending");
    assert!(duplicate.loading);
}

#[tokio::test]
async fn a_cancelled_stream_closes_with_an_error_chunk_promptly() {
    let provider: Arc<dyn Provider> =
        Arc::new(MockProvider::new("slow", "one two three four five").with_chunk_delay(Duration::from_secs(5)));
    let a = analyzer(vec![provider]);

    let cancel = CancellationToken::new();
    let (mut stream, _meta) = a.stream_analysis(&item("a", "a headline"), &[], cancel.clone()).await.unwrap();

    cancel.cancel();
    let chunk = tokio::time::timeout(Duration::from_millis(200), stream.next()).await.unwrap().unwrap();
    assert!(chunk.error.is_some());
}

#[tokio::test]
async fn a_completed_stream_populates_the_analysis_cache() {
    let provider: Arc<dyn Provider> = Arc::new(MockProvider::new("fast", "a short streamed analysis"));
    let a = analyzer(vec![provider]);

    let cancel = CancellationToken::new();
    let (mut stream, _meta) = a.stream_analysis(&item("a", "a headline"), &[], cancel).await.unwrap();
    while stream.next().await.is_some() {}

    tokio::time::sleep(Duration::from_millis(20)).await;
    let cached = a.analysis("a").await.unwrap();
    assert!(cached.content.contains("a short streamed analysis"));
}

#[tokio::test]
async fn analyze_top_stories_on_empty_input_never_calls_a_provider() {
    let provider = Arc::new(MockProvider::new("primary", "unused"));
    let a = analyzer(vec![provider.clone()]);

    let result = a.analyze_top_stories(&[]).await.unwrap();
    assert!(result.is_empty());
    assert_eq!(provider.call_count().await, 0);
}

#[tokio::test]
async fn analyze_top_stories_with_no_provider_available_errors() {
    let a = analyzer(Vec::new());
    let result = a.analyze_top_stories(&[item("a", "a headline")]).await;
    assert!(result.is_err());
}

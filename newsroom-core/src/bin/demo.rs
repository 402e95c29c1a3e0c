use std::sync::Arc;

use chrono::Utc;
use newsroom_core::{Engine, EngineConfig, MockStore, ProviderEnv};
use newsroom_interfaces::{Item, SourceKind, Store};
use tracing::info;

fn sample_items(source_name: &str, titles: &[&str]) -> Vec<Item> {
    titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            Item::new(format!("{source_name}-{i}"), SourceKind::Rss, source_name, *title, Utc::now())
                .with_summary(format!("Coverage of: {title}"))
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let store: Arc<dyn Store> = Arc::new(MockStore::default());
    let mut engine = Engine::new(EngineConfig::default(), ProviderEnv::from_environment(), store.clone()).await;

    engine
        .register_source(
            Arc::new(newsroom_core::sources::MockAdapter::new(
                "wire-a",
                SourceKind::Rss,
                sample_items(
                    "wire-a",
                    &["Central bank raises interest rates amid inflation concerns", "Local team wins championship"],
                ),
            )),
            Default::default(),
            60_000,
        )
        .await;

    engine
        .register_source(
            Arc::new(newsroom_core::sources::MockAdapter::new(
                "wire-b",
                SourceKind::Rss,
                sample_items("wire-b", &["Central bank hikes rates as inflation persists", "New satellite launch succeeds"]),
            )),
            Default::default(),
            60_000,
        )
        .await;

    engine.restore_top_stories(store.as_ref()).await?;

    for round in 1..=3 {
        engine.run_refresh_cycle().await;
        let items = engine.items_snapshot().await;
        info!(round, items = items.len(), "refresh cycle complete");

        let breathing = engine.breathing_top_stories(&items).await?;
        println!("--- round {round}: breathing list ({} stories) ---", breathing.len());
        for story in &breathing {
            println!("[{}] {} (hits={}, misses={})", story.label, story.title, story.hit_count, story.miss_count);
        }

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    let health = engine.sources_health().await;
    println!("source health: {health:?}");

    Ok(())
}

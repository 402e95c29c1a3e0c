use std::sync::Arc;

use chrono::Utc;
use newsroom_interfaces::{Item, SourceAdapter, Store};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::aggregator::{Aggregator, HealthCounts, SourceConfig};
use crate::analyzer::{Analyzer, StreamMeta};
use crate::cancel::CancellationToken;
use crate::config::{EngineConfig, ProviderEnv};
use crate::correlation::CorrelationEngine;
use crate::error::Result;
use crate::llm::{ProviderRegistry, SharedClients};
use crate::queue::QueueManager;

/// Engine root: owns every stateful component plus the process-wide
/// injected singletons (the three shared HTTP clients, the analysis
/// semaphore).
pub struct Engine {
    pub aggregator: Aggregator,
    pub queue_manager: QueueManager,
    pub correlation: CorrelationEngine,
    pub analyzer: Analyzer,
    sources: Vec<Arc<dyn SourceAdapter>>,
}

impl Engine {
    pub async fn new(config: EngineConfig, env: ProviderEnv, store: Arc<dyn Store>) -> Self {
        let clients = SharedClients::new();
        let providers = ProviderRegistry::from_env(&env, &clients, &config).await;
        if providers.is_empty() {
            warn!("no LLM providers available, analyses will fail until credentials are configured");
        }

        let semaphore = Arc::new(Semaphore::new(config.analysis_semaphore_capacity));
        let analyzer = Analyzer::new(
            providers.cloud,
            providers.local,
            store,
            semaphore,
            config.stream_channel_capacity,
            config.top_stories_min,
            config.top_stories_max,
            config.top_stories_ttl_hours,
        );

        Self {
            aggregator: Aggregator::new(),
            queue_manager: QueueManager::new(config.source_queue_capacity),
            correlation: CorrelationEngine::new(config.duplicate_similarity_threshold),
            analyzer,
            sources: Vec::new(),
        }
    }

    /// Registers a source with both the Aggregator and the Queue Manager
    /// in one call.
    pub async fn register_source(&mut self, adapter: Arc<dyn SourceAdapter>, source_config: SourceConfig, base_poll_interval_ms: u64) {
        let name = adapter.name().to_string();
        let kind = adapter.kind();
        self.aggregator.register_source(&name, source_config).await;
        self.queue_manager.register_source(&name, kind, base_poll_interval_ms).await;
        self.sources.push(adapter);
    }

    /// Restores the Top-Stories cache and prunes stale entries at startup.
    pub async fn restore_top_stories(&self, store: &dyn Store) -> Result<()> {
        let cached = store.load_top_stories_cache().await?;
        self.analyzer.top_stories().import(cached).await;
        self.analyzer.top_stories().prune(Utc::now()).await;
        Ok(())
    }

    /// One refresh tick: fetches every source currently due, merges the
    /// results into the Aggregator and Queue Manager, and runs each new
    /// item through the Correlation Engine. The items from a single
    /// source's fetch are merged atomically; there is no ordering
    /// guarantee across different sources' fetches beyond their
    /// `fetched` timestamps.
    pub async fn run_refresh_cycle(&self) {
        let due = self.aggregator.sources_due_for_refresh().await;
        for name in due {
            let Some(adapter) = self.sources.iter().find(|s| s.name() == name) else { continue };
            let _ = self.aggregator.mark_fetching(&name, true).await;

            match adapter.fetch().await {
                Ok(items) => {
                    info!(source = %name, count = items.len(), "fetched items");
                    self.correlate_all(&items).await;
                    self.aggregator.merge_items(items.clone()).await;
                    let _ = self.queue_manager.add_items(&name, items.clone()).await;
                    let _ = self.aggregator.update_source_state(&name, items.len(), None).await;
                }
                Err(err) => {
                    warn!(source = %name, error = %err, "source fetch failed");
                    let _ = self.aggregator.update_source_state(&name, 0, Some(err.to_string())).await;
                }
            }

            let _ = self.aggregator.mark_fetching(&name, false).await;
        }
    }

    async fn correlate_all(&self, items: &[Item]) {
        for item in items {
            self.correlation.process_item(item).await;
        }
    }

    // ------------------------------------------------------------------
    // Outbound-to-UI surface.
    // ------------------------------------------------------------------

    pub async fn items_snapshot(&self) -> Vec<Item> {
        self.aggregator.items().await
    }

    pub async fn sampled_items(&self, max: usize) -> Vec<Item> {
        self.queue_manager.sample(max).await
    }

    pub async fn sources_health(&self) -> HealthCounts {
        self.aggregator.get_health().await
    }

    pub async fn breathing_top_stories(&self, items: &[Item]) -> Result<Vec<newsroom_interfaces::CachedTopStory>> {
        self.analyzer.analyze_top_stories(items).await
    }

    pub async fn analysis(&self, item_id: &str) -> Option<newsroom_interfaces::Analysis> {
        self.analyzer.analysis(item_id).await
    }

    pub async fn stream_analysis(
        &self,
        item: &Item,
        top_stories_ctx: &[String],
        cancel: CancellationToken,
    ) -> Result<(newsroom_interfaces::ChunkStream, StreamMeta)> {
        self.analyzer.stream_analysis(item, top_stories_ctx, cancel).await
    }

    pub async fn correlation_overlay(&self, item_id: &str) -> Option<crate::correlation::CorrelationOverlay> {
        self.correlation.overlay(item_id).await
    }

    /// Pruning pass, run on demand in addition to startup.
    pub async fn prune_top_stories(&self) {
        self.analyzer.top_stories().prune(Utc::now()).await;
    }
}

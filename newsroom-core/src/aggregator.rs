use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use newsroom_interfaces::Item;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{EngineError, Result};

/// Static configuration for one registered source.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub category: String,
    pub refresh_interval: Duration,
    pub weight: f64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            category: "general".to_string(),
            refresh_interval: Duration::minutes(30),
            weight: 1.0,
        }
    }
}

/// Runtime metadata the Aggregator tracks per registered source.
#[derive(Debug, Clone)]
pub struct SourceState {
    pub config: SourceConfig,
    pub last_fetched: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub item_count: usize,
    pub is_fetching: bool,
}

impl SourceState {
    fn new(config: SourceConfig) -> Self {
        Self {
            config,
            last_fetched: None,
            last_error: None,
            item_count: 0,
            is_fetching: false,
        }
    }

    fn is_due(&self, now: DateTime<Utc>) -> bool {
        if self.is_fetching {
            return false;
        }
        match self.last_fetched {
            None => true,
            Some(last) => now - last >= self.config.refresh_interval,
        }
    }
}

/// Coarse-grained source health, derived from how recently it last failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceHealth {
    Healthy,
    Degraded,
    Failing,
}

#[derive(Debug, Clone, Default)]
pub struct HealthCounts {
    pub healthy: usize,
    pub degraded: usize,
    pub failing: usize,
}

struct State {
    items: HashMap<String, Item>,
    sources: HashMap<String, SourceState>,
    source_order: Vec<String>,
}

/// Source registry plus the merged item store. Guarded by a single
/// reader-preferring lock: `items()` copies out rather than holding the
/// lock across rendering, and fetches themselves are run by external
/// worker tasks that only touch state through these methods.
pub struct Aggregator {
    state: RwLock<State>,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregator {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                items: HashMap::new(),
                sources: HashMap::new(),
                source_order: Vec::new(),
            }),
        }
    }

    pub async fn register_source(&self, name: &str, config: SourceConfig) {
        let mut state = self.state.write().await;
        if state.sources.contains_key(name) {
            return;
        }
        state.source_order.push(name.to_string());
        state.sources.insert(name.to_string(), SourceState::new(config));
        info!(source = name, "registered source with aggregator");
    }

    /// Snapshot of merged items, most recently published first; ties break
    /// on `id` for determinism.
    pub async fn items(&self) -> Vec<Item> {
        let state = self.state.read().await;
        let mut items: Vec<Item> = state.items.values().cloned().collect();
        items.sort_by(|a, b| b.published.cmp(&a.published).then_with(|| a.id.cmp(&b.id)));
        items
    }

    pub async fn sources_due_for_refresh(&self) -> Vec<String> {
        let state = self.state.read().await;
        let now = Utc::now();
        state
            .source_order
            .iter()
            .filter(|name| state.sources.get(*name).map(|s| s.is_due(now)).unwrap_or(false))
            .cloned()
            .collect()
    }

    pub async fn mark_fetching(&self, name: &str, fetching: bool) -> Result<()> {
        let mut state = self.state.write().await;
        let entry = state
            .sources
            .get_mut(name)
            .ok_or_else(|| EngineError::SourceNotFound { name: name.to_string() })?;
        entry.is_fetching = fetching;
        Ok(())
    }

    /// Deduplicates the incoming batch against existing items by `id`,
    /// keeping whichever copy has the later `fetched` timestamp. Runs in
    /// O(n) against the hash index backing `items`. A fetch's items are
    /// merged in one pass under a single write-lock acquisition so
    /// consumers never observe a partially-merged batch.
    pub async fn merge_items(&self, items: Vec<Item>) {
        let mut state = self.state.write().await;
        for item in items {
            match state.items.get(&item.id) {
                Some(existing) if existing.fetched >= item.fetched => {
                    // Existing copy is at least as fresh; keep it.
                }
                _ => {
                    state.items.insert(item.id.clone(), item);
                }
            }
        }
    }

    pub async fn update_source_state(&self, name: &str, count: usize, err: Option<String>) -> Result<()> {
        let mut state = self.state.write().await;
        let entry = state
            .sources
            .get_mut(name)
            .ok_or_else(|| EngineError::SourceNotFound { name: name.to_string() })?;
        entry.last_fetched = Some(Utc::now());
        entry.item_count = count;
        if let Some(ref e) = err {
            warn!(source = name, error = %e, "source fetch failed");
        } else {
            debug!(source = name, count, "source fetch succeeded");
        }
        entry.last_error = err;
        Ok(())
    }

    pub async fn get_health(&self) -> HealthCounts {
        let state = self.state.read().await;
        let now = Utc::now();
        let mut counts = HealthCounts::default();
        for source in state.sources.values() {
            let health = match (&source.last_error, source.last_fetched) {
                (Some(_), Some(last)) if now - last < Duration::minutes(15) => SourceHealth::Failing,
                (Some(_), _) => SourceHealth::Degraded,
                (None, _) => SourceHealth::Healthy,
            };
            match health {
                SourceHealth::Healthy => counts.healthy += 1,
                SourceHealth::Degraded => counts.degraded += 1,
                SourceHealth::Failing => counts.failing += 1,
            }
        }
        counts
    }

    pub async fn source_state(&self, name: &str) -> Option<SourceState> {
        let state = self.state.read().await;
        state.sources.get(name).cloned()
    }
}

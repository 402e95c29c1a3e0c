use std::collections::{HashMap, VecDeque};

use chrono::Utc;
use newsroom_interfaces::{Item, SourceKind};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{EngineError, Result};

/// Bounded ring of recent items for one source. Newest item lives at the
/// front; pushing past capacity evicts the oldest (the back).
#[derive(Debug)]
pub struct SourceQueue {
    items: VecDeque<Item>,
    capacity: usize,
}

impl SourceQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn push_newest(&mut self, item: Item) {
        self.items.push_front(item);
        while self.items.len() > self.capacity {
            self.items.pop_back();
        }
    }

    pub fn snapshot(&self) -> Vec<Item> {
        self.items.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Signal the registry derives from recent fetch history: whether a
/// source's effective poll interval should widen (repeated empty fetches)
/// or narrow (bursts). Reserved: computed but not yet fed back into any
/// scheduler decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollHint {
    Widen,
    Narrow,
    Steady,
}

struct SourceEntry {
    kind: SourceKind,
    base_poll_interval_ms: u64,
    queue: SourceQueue,
    consecutive_empty_fetches: u32,
    consecutive_nonempty_fetches: u32,
    cursor: usize,
}

struct Registry {
    order: Vec<String>,
    sources: HashMap<String, SourceEntry>,
}

/// Owns a per-source bounded queue and produces a fair, source-balanced
/// sample for display. A chatty source can contribute no more than
/// `ceil(max_total / active_source_count)` items to any single sample.
pub struct QueueManager {
    state: RwLock<Registry>,
    default_capacity: usize,
}

impl QueueManager {
    pub fn new(default_capacity: usize) -> Self {
        Self {
            state: RwLock::new(Registry {
                order: Vec::new(),
                sources: HashMap::new(),
            }),
            default_capacity,
        }
    }

    pub async fn register_source(&self, name: &str, kind: SourceKind, base_poll_interval_ms: u64) {
        let mut state = self.state.write().await;
        if state.sources.contains_key(name) {
            return;
        }
        state.order.push(name.to_string());
        state.sources.insert(
            name.to_string(),
            SourceEntry {
                kind,
                base_poll_interval_ms,
                queue: SourceQueue::new(self.default_capacity),
                consecutive_empty_fetches: 0,
                consecutive_nonempty_fetches: 0,
                cursor: 0,
            },
        );
        debug!(source = name, "registered source with queue manager");
    }

    pub async fn add_items(&self, name: &str, items: Vec<Item>) -> Result<PollHint> {
        let mut state = self.state.write().await;
        let entry = state
            .sources
            .get_mut(name)
            .ok_or_else(|| EngineError::SourceNotFound { name: name.to_string() })?;

        entry.cursor = 0;
        if items.is_empty() {
            entry.consecutive_empty_fetches += 1;
            entry.consecutive_nonempty_fetches = 0;
        } else {
            entry.consecutive_nonempty_fetches += 1;
            entry.consecutive_empty_fetches = 0;
            for item in items {
                entry.queue.push_newest(item);
            }
        }

        Ok(if entry.consecutive_empty_fetches >= 3 {
            PollHint::Widen
        } else if entry.consecutive_nonempty_fetches >= 3 {
            PollHint::Narrow
        } else {
            PollHint::Steady
        })
    }

    pub async fn mark_polled(&self, name: &str) {
        debug!(source = name, at = %Utc::now(), "source polled");
    }

    /// Round-robins across all registered sources in registration order,
    /// taking up to one item per source per pass until `max_total` is
    /// reached or every source's cursor is exhausted. The returned set is
    /// then sorted by `published` descending.
    pub async fn sample(&self, max_total: usize) -> Vec<Item> {
        let mut state = self.state.write().await;
        let mut selected = Vec::with_capacity(max_total);
        if max_total == 0 || state.order.is_empty() {
            return selected;
        }

        let names = state.order.clone();
        for entry in state.sources.values_mut() {
            entry.cursor = 0;
        }

        loop {
            let mut made_progress = false;
            for name in &names {
                if selected.len() >= max_total {
                    break;
                }
                if let Some(entry) = state.sources.get_mut(name) {
                    let snapshot_len = entry.queue.len();
                    if entry.cursor < snapshot_len {
                        if let Some(item) = entry.queue.items.get(entry.cursor) {
                            selected.push(item.clone());
                            entry.cursor += 1;
                            made_progress = true;
                        }
                    }
                }
            }
            if !made_progress || selected.len() >= max_total {
                break;
            }
        }

        selected.sort_by(|a, b| b.published.cmp(&a.published).then_with(|| a.id.cmp(&b.id)));
        selected
    }

    pub async fn source_kind(&self, name: &str) -> Option<SourceKind> {
        let state = self.state.read().await;
        state.sources.get(name).map(|entry| entry.kind)
    }

    pub async fn base_poll_interval_ms(&self, name: &str) -> Option<u64> {
        let state = self.state.read().await;
        state.sources.get(name).map(|entry| entry.base_poll_interval_ms)
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::item::Item;
use crate::top_story::CachedTopStory;

/// One persisted analysis record, as handed to / returned by the store.
#[derive(Debug, Clone)]
pub struct AnalysisRecord {
    pub item_id: String,
    pub provider: String,
    pub model: String,
    pub prompt: String,
    pub raw_response: String,
    pub content: String,
    pub error: Option<String>,
}

/// Result of `get_analysis_content`.
#[derive(Debug, Clone)]
pub struct AnalysisLookup {
    pub content: String,
    pub provider: String,
    pub model: String,
    pub found: bool,
}

/// The durable store contract. The core only ever consumes this trait; it
/// does not ship an implementation. Persistent key-value storage is an
/// external collaborator. A store failure is logged and non-fatal: the
/// engine keeps running on in-memory state.
#[async_trait]
pub trait Store: Send + Sync {
    async fn save_items(&self, items: &[Item]) -> anyhow::Result<()>;

    async fn mark_read(&self, id: &str) -> anyhow::Result<()>;

    async fn save_analysis(&self, record: AnalysisRecord) -> anyhow::Result<()>;

    async fn get_analysis_content(&self, item_id: &str) -> anyhow::Result<AnalysisLookup>;

    async fn save_top_stories_cache(&self, entries: &[CachedTopStory]) -> anyhow::Result<()>;

    async fn load_top_stories_cache(&self) -> anyhow::Result<Vec<CachedTopStory>>;

    async fn start_session(&self) -> anyhow::Result<String>;

    async fn end_session(&self, id: &str) -> anyhow::Result<()>;

    async fn get_last_session(&self) -> anyhow::Result<Option<DateTime<Utc>>>;
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use newsroom_interfaces::{AnalysisLookup, AnalysisRecord, CachedTopStory, Item, Store};
use tokio::sync::Mutex;

/// In-memory stand-in for a durable store. Used by the demonstration
/// binary and the test suite so both can run with no external services.
#[derive(Default)]
pub struct MockStore {
    top_stories: Mutex<Vec<CachedTopStory>>,
    analyses: Mutex<Vec<AnalysisRecord>>,
}

#[async_trait]
impl Store for MockStore {
    async fn save_items(&self, _items: &[Item]) -> anyhow::Result<()> {
        Ok(())
    }

    async fn mark_read(&self, _id: &str) -> anyhow::Result<()> {
        Ok(())
    }

    async fn save_analysis(&self, record: AnalysisRecord) -> anyhow::Result<()> {
        self.analyses.lock().await.push(record);
        Ok(())
    }

    async fn get_analysis_content(&self, item_id: &str) -> anyhow::Result<AnalysisLookup> {
        let analyses = self.analyses.lock().await;
        match analyses.iter().rev().find(|r| r.item_id == item_id) {
            Some(record) => Ok(AnalysisLookup {
                content: record.content.clone(),
                provider: record.provider.clone(),
                model: record.model.clone(),
                found: true,
            }),
            None => Ok(AnalysisLookup { content: String::new(), provider: String::new(), model: String::new(), found: false }),
        }
    }

    async fn save_top_stories_cache(&self, entries: &[CachedTopStory]) -> anyhow::Result<()> {
        *self.top_stories.lock().await = entries.to_vec();
        Ok(())
    }

    async fn load_top_stories_cache(&self) -> anyhow::Result<Vec<CachedTopStory>> {
        Ok(self.top_stories.lock().await.clone())
    }

    async fn start_session(&self) -> anyhow::Result<String> {
        Ok(uuid::Uuid::new_v4().to_string())
    }

    async fn end_session(&self, _id: &str) -> anyhow::Result<()> {
        Ok(())
    }

    async fn get_last_session(&self) -> anyhow::Result<Option<DateTime<Utc>>> {
        Ok(None)
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where an [`Item`] originated. Parsed from external strings exactly once,
/// at the Source Adapter boundary; nothing downstream matches on raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Rss,
    Hn,
    Reddit,
    Usgs,
    Mastodon,
    Bluesky,
    Arxiv,
    Sec,
    Aggregator,
    Polymarket,
    Manifold,
}

/// Canonical content record shared by every stage of the pipeline.
///
/// `id` is globally unique and stable across re-fetches of the same
/// underlying content; `published` is never later than `fetched`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub source_kind: SourceKind,
    pub source_name: String,
    pub source_url: Option<String>,
    pub title: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
    pub author: Option<String>,
    pub published: DateTime<Utc>,
    pub fetched: DateTime<Utc>,
    pub read: bool,
    pub saved: bool,
}

impl Item {
    /// Builds a new, unread, unsaved item with `fetched = now`.
    pub fn new(
        id: impl Into<String>,
        source_kind: SourceKind,
        source_name: impl Into<String>,
        title: impl Into<String>,
        published: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            source_kind,
            source_name: source_name.into(),
            source_url: None,
            title: title.into(),
            summary: None,
            content: None,
            url: None,
            author: None,
            published,
            fetched: Utc::now(),
            read: false,
            saved: false,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Text used by the correlation engine: title plus summary. Entity
    /// extraction and duplicate detection are scoped to those two fields
    /// only.
    pub fn correlation_text(&self) -> String {
        match &self.summary {
            Some(summary) if !summary.is_empty() => format!("{} {}", self.title, summary),
            _ => self.title.clone(),
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Derived lifecycle state of a cached Top Story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopStoryStatus {
    Breaking,
    Developing,
    Persistent,
    Sustained,
    Fading,
}

impl TopStoryStatus {
    /// Sort priority used by breathing-list assembly: lower sorts first.
    pub fn priority(self) -> u8 {
        match self {
            TopStoryStatus::Breaking => 0,
            TopStoryStatus::Persistent => 1,
            TopStoryStatus::Sustained => 2,
            TopStoryStatus::Developing => 3,
            TopStoryStatus::Fading => 4,
        }
    }
}

/// Entry in the Top-Stories Tracker's hit/miss lifecycle cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedTopStory {
    pub item_id: String,
    pub title: String,
    pub label: String,
    pub reason: String,
    pub zinger: Option<String>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub hit_count: u32,
    pub miss_count: u32,
    pub consecutive_hit: bool,
}

impl CachedTopStory {
    /// Derived status, recomputed from `hit_count`/`miss_count` on every
    /// read rather than stored, so it can never drift from the counters.
    pub fn status(&self) -> TopStoryStatus {
        if self.miss_count >= 2 {
            TopStoryStatus::Fading
        } else if self.hit_count >= 4 && self.miss_count == 1 {
            TopStoryStatus::Sustained
        } else if self.hit_count >= 4 {
            TopStoryStatus::Persistent
        } else if self.hit_count >= 2 {
            TopStoryStatus::Developing
        } else {
            TopStoryStatus::Breaking
        }
    }
}

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use newsroom_interfaces::{CachedTopStory, TopStoryStatus};
use tokio::sync::RwLock;

/// One entry of a classification pass, as produced by the Analyzer's
/// top-stories prompt parser and handed to [`TopStoriesTracker::update`].
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    pub item_id: String,
    pub title: String,
    pub label: String,
    pub reason: String,
}

struct TrackerState {
    cache: HashMap<String, CachedTopStory>,
    last_top_ids: HashSet<String>,
}

/// Maintains the "breathing" list of stories currently considered
/// important: a hit/miss lifecycle cache resistant to the transient
/// noise of a single classification pass.
pub struct TopStoriesTracker {
    state: RwLock<TrackerState>,
    min_stories: usize,
    max_stories: usize,
    ttl: Duration,
}

impl TopStoriesTracker {
    pub fn new(min_stories: usize, max_stories: usize, ttl_hours: i64) -> Self {
        Self {
            state: RwLock::new(TrackerState {
                cache: HashMap::new(),
                last_top_ids: HashSet::new(),
            }),
            min_stories,
            max_stories,
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Applies one classification pass's hit/miss update protocol.
    /// Entries present in `current_results` have `hit_count`
    /// incremented and `miss_count` reset; entries absent get exactly one
    /// `miss_count` increment. `last_top_ids` is then replaced with this
    /// pass's ids for the next call's `consecutive_hit` computation.
    pub async fn update(&self, current_results: &[ClassificationResult]) {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let current_ids: HashSet<String> = current_results.iter().map(|r| r.item_id.clone()).collect();
        let previous_top_ids = state.last_top_ids.clone();

        for result in current_results {
            match state.cache.get_mut(&result.item_id) {
                Some(entry) => {
                    entry.hit_count += 1;
                    entry.miss_count = 0;
                    entry.last_seen = now;
                    entry.consecutive_hit = previous_top_ids.contains(&result.item_id);
                    entry.label = result.label.clone();
                    entry.reason = result.reason.clone();
                    entry.title = result.title.clone();
                }
                None => {
                    state.cache.insert(
                        result.item_id.clone(),
                        CachedTopStory {
                            item_id: result.item_id.clone(),
                            title: result.title.clone(),
                            label: result.label.clone(),
                            reason: result.reason.clone(),
                            zinger: None,
                            first_seen: now,
                            last_seen: now,
                            hit_count: 1,
                            miss_count: 0,
                            consecutive_hit: false,
                        },
                    );
                }
            }
        }

        for (id, entry) in state.cache.iter_mut() {
            if !current_ids.contains(id) {
                entry.miss_count += 1;
                entry.consecutive_hit = false;
            }
        }

        state.last_top_ids = current_ids;
    }

    /// Assembles the breathing list: seeds from the current pass, widens
    /// with looser hit/miss candidates if still under the minimum, then
    /// sorts and truncates. `current_results` must be the same slice most
    /// recently passed to [`Self::update`].
    pub async fn breathing_list(&self, current_results: &[ClassificationResult]) -> Vec<CachedTopStory> {
        let state = self.state.read().await;

        let mut list: Vec<CachedTopStory> = Vec::new();
        let mut seen_ids: HashSet<String> = HashSet::new();
        let mut seen_title_prefixes: HashSet<String> = HashSet::new();

        let dedup_key = |title: &str| title.to_lowercase().chars().take(40).collect::<String>();

        for result in current_results {
            if let Some(entry) = state.cache.get(&result.item_id) {
                if seen_ids.insert(entry.item_id.clone()) {
                    seen_title_prefixes.insert(dedup_key(&entry.title));
                    list.push(entry.clone());
                }
            }
        }

        let mut add_candidates = |predicate: &dyn Fn(&CachedTopStory) -> bool, list: &mut Vec<CachedTopStory>| {
            let mut candidates: Vec<&CachedTopStory> = state
                .cache
                .values()
                .filter(|entry| {
                    predicate(entry) && !seen_ids.contains(&entry.item_id) && !seen_title_prefixes.contains(&dedup_key(&entry.title))
                })
                .collect();
            candidates.sort_by_key(|entry| (entry.status().priority(), std::cmp::Reverse(entry.hit_count), std::cmp::Reverse(entry.first_seen)));
            for entry in candidates {
                if seen_ids.insert(entry.item_id.clone()) {
                    seen_title_prefixes.insert(dedup_key(&entry.title));
                    list.push(entry.clone());
                }
            }
        };

        add_candidates(&|entry| entry.hit_count >= 3 && entry.miss_count <= 2, &mut list);

        if list.len() < self.min_stories {
            add_candidates(&|entry| entry.hit_count >= 1 && entry.miss_count <= 3, &mut list);
        }

        list.sort_by_key(|entry| (entry.status().priority(), std::cmp::Reverse(entry.hit_count), std::cmp::Reverse(entry.first_seen)));
        list.truncate(self.max_stories);

        for entry in &mut list {
            entry.label = status_label(entry.status()).to_string();
        }

        list
    }

    /// Attaches a zinger to a cached entry. Silent no-op if the entry has
    /// since been pruned.
    pub async fn set_zinger(&self, item_id: &str, zinger: String) {
        let mut state = self.state.write().await;
        if let Some(entry) = state.cache.get_mut(item_id) {
            entry.zinger = Some(zinger);
        }
    }

    /// Cache entries that still lack a zinger, for the Analyzer's batched
    /// zinger request.
    pub async fn missing_zingers(&self) -> Vec<(String, String)> {
        let state = self.state.read().await;
        state
            .cache
            .values()
            .filter(|entry| entry.zinger.as_deref().unwrap_or("").is_empty())
            .map(|entry| (entry.item_id.clone(), entry.title.clone()))
            .collect()
    }

    /// Removes entries whose `last_seen` is older than the configured TTL.
    /// Run at startup and on demand.
    pub async fn prune(&self, now: DateTime<Utc>) {
        let mut state = self.state.write().await;
        state.cache.retain(|_, entry| now - entry.last_seen < self.ttl);
    }

    /// Flat export for the durable store's `save_top_stories_cache`.
    pub async fn export(&self) -> Vec<CachedTopStory> {
        let state = self.state.read().await;
        state.cache.values().cloned().collect()
    }

    /// Re-imports a previously exported cache. `last_top_ids` is left
    /// empty; streak tracking reconstructs naturally from the next pass.
    pub async fn import(&self, entries: Vec<CachedTopStory>) {
        let mut state = self.state.write().await;
        state.cache = entries.into_iter().map(|entry| (entry.item_id.clone(), entry)).collect();
        state.last_top_ids.clear();
    }
}

fn status_label(status: TopStoryStatus) -> &'static str {
    match status {
        TopStoryStatus::Breaking => "Breaking",
        TopStoryStatus::Developing => "Developing",
        TopStoryStatus::Persistent => "Persistent",
        TopStoryStatus::Sustained => "Sustained",
        TopStoryStatus::Fading => "Fading",
    }
}

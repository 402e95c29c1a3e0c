mod cluster;
mod duplicate;
mod entity;
mod lexicon;

pub use cluster::Cluster;
pub use duplicate::{cosine_similarity, normalize_title, title_similarity, DuplicateGroup, Embedder};
pub use entity::{Entity, EntityKind};

use chrono::{DateTime, Utc};
use newsroom_interfaces::Item;
use tokio::sync::RwLock;
use tracing::debug;

use cluster::ClusterIndex;
use duplicate::DuplicateIndex;
use lexicon::SENTIMENT_CONTRADICTIONS;

/// Everything the UI needs to render an item's correlation context.
#[derive(Debug, Clone)]
pub struct CorrelationOverlay {
    pub entities: Vec<Entity>,
    pub duplicate_count: usize,
    pub is_duplicate_primary: bool,
    pub cluster_size: usize,
    pub is_cluster_primary: bool,
    pub disagreement: bool,
}

struct EngineState {
    duplicates: DuplicateIndex,
    clusters: ClusterIndex,
    entities_by_item: std::collections::HashMap<String, Vec<Entity>>,
    titles_by_item: std::collections::HashMap<String, String>,
}

/// Assigns each incoming item to optional entities, a duplicate group, and
/// a cluster. A single reader-preferring lock guards all of it, consistent
/// with every other stateful component in the engine.
pub struct CorrelationEngine {
    state: RwLock<EngineState>,
    similarity_threshold: f64,
}

impl CorrelationEngine {
    pub fn new(similarity_threshold: f64) -> Self {
        Self {
            state: RwLock::new(EngineState {
                duplicates: DuplicateIndex::new(similarity_threshold),
                clusters: ClusterIndex::new(),
                entities_by_item: std::collections::HashMap::new(),
                titles_by_item: std::collections::HashMap::new(),
            }),
            similarity_threshold,
        }
    }

    pub fn similarity_threshold(&self) -> f64 {
        self.similarity_threshold
    }

    /// Best-effort by construction: entity extraction cannot fail here, so
    /// this always attaches *something* (possibly an empty entity list)
    /// rather than poisoning the item.
    pub async fn process_item(&self, item: &Item) {
        let entities = entity::extract_entities(item);
        if entities.is_empty() {
            debug!(item_id = %item.id, "no entities extracted");
        }

        let mut state = self.state.write().await;
        let dup_group_idx = state.duplicates.assign(&item.id, &item.title);
        state.clusters.process_item(&item.id, item.published, &entities, dup_group_idx);
        state.entities_by_item.insert(item.id.clone(), entities);
        state.titles_by_item.insert(item.id.clone(), item.title.clone());
    }

    pub async fn overlay(&self, item_id: &str) -> Option<CorrelationOverlay> {
        let state = self.state.read().await;
        let entities = state.entities_by_item.get(item_id)?.clone();
        let dup_group = state.duplicates.group_for(item_id)?;
        let cluster = state.clusters.cluster_for(item_id)?;

        let disagreement = cluster_disagreement(&state, cluster);

        Some(CorrelationOverlay {
            entities,
            duplicate_count: dup_group.duplicate_ids.len() + 1,
            is_duplicate_primary: dup_group.primary_item_id == item_id,
            cluster_size: cluster.member_item_ids.len(),
            is_cluster_primary: cluster.primary_item_id == item_id,
            disagreement,
        })
    }

    pub async fn cluster_created_at(&self, item_id: &str) -> Option<DateTime<Utc>> {
        let state = self.state.read().await;
        state.clusters.cluster_for(item_id).map(|c| c.created_at)
    }
}

/// A cluster of size >= 3 whose member titles contain both halves of a
/// curated contradictory-sentiment pair is flagged as disagreeing.
fn cluster_disagreement(state: &EngineState, cluster: &Cluster) -> bool {
    if cluster.member_item_ids.len() < 3 {
        return false;
    }
    let titles: Vec<String> = cluster
        .member_item_ids
        .iter()
        .filter_map(|id| state.titles_by_item.get(id))
        .map(|t| t.to_lowercase())
        .collect();

    for (a, b) in SENTIMENT_CONTRADICTIONS {
        let has_a = titles.iter().any(|t| t.contains(a));
        let has_b = titles.iter().any(|t| t.contains(b));
        if has_a && has_b {
            return true;
        }
    }
    false
}

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::entity::Entity;

/// A set of items judged to be about the same story. `primary_item_id` is
/// always a member; an item belongs to at most one cluster at a time.
#[derive(Debug, Clone)]
pub struct Cluster {
    pub id: String,
    pub member_item_ids: HashSet<String>,
    pub primary_item_id: String,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

const MIN_SHARED_ENTITIES: usize = 2;

struct ClusterRecord {
    cluster: Cluster,
    entities: HashSet<Entity>,
    duplicate_groups: HashSet<usize>,
}

/// Assigns each incoming item to a cluster, merging clusters on overlap.
/// Membership is single-assignment: when an item's entities or duplicate
/// group link two previously distinct clusters, they are merged into one,
/// with the earlier-created cluster absorbing the later one and keeping
/// its `id`.
pub struct ClusterIndex {
    records: HashMap<String, ClusterRecord>,
    item_to_cluster: HashMap<String, String>,
    member_published: HashMap<String, DateTime<Utc>>,
}

impl Default for ClusterIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterIndex {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            item_to_cluster: HashMap::new(),
            member_published: HashMap::new(),
        }
    }

    pub fn cluster_for(&self, item_id: &str) -> Option<&Cluster> {
        self.item_to_cluster
            .get(item_id)
            .and_then(|cid| self.records.get(cid))
            .map(|record| &record.cluster)
    }

    pub fn cluster_size(&self, item_id: &str) -> usize {
        self.cluster_for(item_id).map(|c| c.member_item_ids.len()).unwrap_or(0)
    }

    /// Processes one item, returning the id of the cluster it now belongs
    /// to. Idempotent for an already-processed `item_id`.
    pub fn process_item(
        &mut self,
        item_id: &str,
        published: DateTime<Utc>,
        entities: &[Entity],
        duplicate_group_idx: usize,
    ) -> String {
        if let Some(existing) = self.item_to_cluster.get(item_id) {
            return existing.clone();
        }

        self.member_published.insert(item_id.to_string(), published);
        let entity_set: HashSet<Entity> = entities.iter().cloned().collect();

        let mut matches: Vec<String> = self
            .records
            .iter()
            .filter(|(_, record)| {
                record.duplicate_groups.contains(&duplicate_group_idx)
                    || record.entities.intersection(&entity_set).count() >= MIN_SHARED_ENTITIES
            })
            .map(|(cid, _)| cid.clone())
            .collect();

        let now = Utc::now();

        if matches.is_empty() {
            let id = Uuid::new_v4().to_string();
            let cluster = Cluster {
                id: id.clone(),
                member_item_ids: [item_id.to_string()].into_iter().collect(),
                primary_item_id: item_id.to_string(),
                summary: None,
                created_at: now,
                last_updated: now,
            };
            self.records.insert(
                id.clone(),
                ClusterRecord {
                    cluster,
                    entities: entity_set,
                    duplicate_groups: [duplicate_group_idx].into_iter().collect(),
                },
            );
            self.item_to_cluster.insert(item_id.to_string(), id.clone());
            return id;
        }

        matches.sort_by_key(|cid| self.records[cid].cluster.created_at);
        let survivor_id = matches[0].clone();

        for absorbed_id in matches.into_iter().skip(1) {
            if absorbed_id == survivor_id {
                continue;
            }
            if let Some(absorbed) = self.records.remove(&absorbed_id) {
                for member in &absorbed.cluster.member_item_ids {
                    self.item_to_cluster.insert(member.clone(), survivor_id.clone());
                }
                if let Some(survivor) = self.records.get_mut(&survivor_id) {
                    survivor.cluster.member_item_ids.extend(absorbed.cluster.member_item_ids);
                    survivor.entities.extend(absorbed.entities);
                    survivor.duplicate_groups.extend(absorbed.duplicate_groups);
                }
            }
        }

        if let Some(survivor) = self.records.get_mut(&survivor_id) {
            survivor.cluster.member_item_ids.insert(item_id.to_string());
            survivor.entities.extend(entity_set);
            survivor.duplicate_groups.insert(duplicate_group_idx);
            survivor.cluster.last_updated = now;
            survivor.cluster.primary_item_id = survivor
                .cluster
                .member_item_ids
                .iter()
                .min_by_key(|id| self.member_published.get(*id).copied().unwrap_or(now))
                .cloned()
                .unwrap_or_else(|| item_id.to_string());
        }
        self.item_to_cluster.insert(item_id.to_string(), survivor_id.clone());

        survivor_id
    }
}

use std::collections::{HashMap, HashSet};

/// A set of items judged near-identical (same story, same angle). A finer
/// partition than a [`super::cluster::Cluster`].
#[derive(Debug, Clone)]
pub struct DuplicateGroup {
    pub primary_item_id: String,
    pub duplicate_ids: HashSet<String>,
    normalized_title: String,
}

/// Lowercases, strips punctuation, collapses whitespace, and drops a
/// leading "SOURCE — " / "SOURCE - " attribution prefix, so the same
/// headline run by two outlets normalizes to (close to) the same string.
pub fn normalize_title(title: &str) -> String {
    let stripped_prefix = strip_source_prefix(title);
    let lowered = stripped_prefix.to_lowercase();
    let mut normalized = String::with_capacity(lowered.len());
    let mut last_was_space = false;
    for ch in lowered.chars() {
        if ch.is_alphanumeric() {
            normalized.push(ch);
            last_was_space = false;
        } else if !last_was_space {
            normalized.push(' ');
            last_was_space = true;
        }
    }
    normalized.trim().to_string()
}

fn strip_source_prefix(title: &str) -> &str {
    for sep in ["—", "-", ":"] {
        if let Some((prefix, rest)) = title.split_once(sep) {
            let word_count = prefix.split_whitespace().count();
            if word_count >= 1 && word_count <= 3 && prefix.chars().next().map(|c| c.is_uppercase()).unwrap_or(false) {
                let rest = rest.trim();
                if !rest.is_empty() {
                    return rest;
                }
            }
        }
    }
    title
}

fn tokens(normalized: &str) -> HashSet<&str> {
    normalized.split_whitespace().collect()
}

/// Token-Jaccard similarity between two already-normalized titles: size of
/// the intersection over size of the union. Two empty titles are defined
/// as maximally similar (1.0); one empty and one non-empty is 0.0.
pub fn title_similarity(a_normalized: &str, b_normalized: &str) -> f64 {
    let a = tokens(a_normalized);
    let b = tokens(b_normalized);
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(&b).count();
    let union = a.union(&b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Tracks duplicate groups across the lifetime of the engine. The
/// first-seen item in a group is its primary; later arrivals attach as
/// duplicates of that primary and never become primaries themselves.
pub struct DuplicateIndex {
    groups: Vec<DuplicateGroup>,
    item_to_group: HashMap<String, usize>,
    threshold: f64,
}

impl DuplicateIndex {
    pub fn new(threshold: f64) -> Self {
        Self {
            groups: Vec::new(),
            item_to_group: HashMap::new(),
            threshold,
        }
    }

    /// Assigns `item_id`/`title` to an existing group if its normalized
    /// title similarity to that group's primary exceeds the threshold,
    /// else opens a new singleton group with this item as primary. Returns
    /// the group index the item now belongs to.
    pub fn assign(&mut self, item_id: &str, title: &str) -> usize {
        if let Some(&idx) = self.item_to_group.get(item_id) {
            return idx;
        }
        let normalized = normalize_title(title);

        for (idx, group) in self.groups.iter_mut().enumerate() {
            if title_similarity(&normalized, &group.normalized_title) >= self.threshold {
                group.duplicate_ids.insert(item_id.to_string());
                self.item_to_group.insert(item_id.to_string(), idx);
                return idx;
            }
        }

        let idx = self.groups.len();
        self.groups.push(DuplicateGroup {
            primary_item_id: item_id.to_string(),
            duplicate_ids: HashSet::new(),
            normalized_title: normalized,
        });
        self.item_to_group.insert(item_id.to_string(), idx);
        idx
    }

    pub fn group_for(&self, item_id: &str) -> Option<&DuplicateGroup> {
        self.item_to_group.get(item_id).and_then(|idx| self.groups.get(*idx))
    }

    pub fn group_index_for(&self, item_id: &str) -> Option<usize> {
        self.item_to_group.get(item_id).copied()
    }
}

/// Alternate similarity path for a backend that can embed text: hands its
/// vectors to [`cosine_similarity`] instead of the Jaccard baseline. Not
/// wired into [`DuplicateIndex`]; Jaccard is the only implementation
/// exercised here.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Vec<f64>;
}

/// Cosine similarity between two vectors, scaled to `[-1, 1]`. Mismatched
/// lengths or a zero vector return 0.0.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod similarity_tests {
    use super::*;

    #[test]
    fn identical_vectors_have_similarity_one() {
        assert_eq!(cosine_similarity(&[1.0, 0.0, 0.0], &[1.0, 0.0, 0.0]), 1.0);
    }

    #[test]
    fn orthogonal_vectors_have_similarity_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]), 0.0);
    }

    #[test]
    fn opposite_vectors_have_similarity_negative_one() {
        assert_eq!(cosine_similarity(&[1.0, 0.0, 0.0], &[-1.0, 0.0, 0.0]), -1.0);
    }

    #[test]
    fn mismatched_lengths_return_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn title_similarity_on_normalized_strings_matches_token_jaccard() {
        assert_eq!(title_similarity("breaking news today", "breaking news today"), 1.0);
        assert_eq!(title_similarity("completely unrelated words", "breaking news today"), 0.0);
    }
}

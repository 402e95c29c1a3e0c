use std::collections::HashSet;

use newsroom_interfaces::Item;

use super::lexicon::{COUNTRY_ALIASES, KNOWN_TICKERS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Ticker,
    Country,
    Source,
}

/// `(kind, value)` pair extracted from item text. Equality is case-
/// normalized so "AAPL" from one extraction and "aapl" from another are
/// the same entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entity {
    pub kind: EntityKind,
    pub value: String,
}

impl Entity {
    fn new(kind: EntityKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into().to_lowercase(),
        }
    }
}

/// Lightweight pattern-based extractor over `title + summary`. Failures
/// here are impossible by construction (no fallible parsing is involved),
/// but the caller treats this as best-effort regardless: an empty result
/// is always a valid, non-poisoning outcome.
pub fn extract_entities(item: &Item) -> Vec<Entity> {
    let text = item.correlation_text();
    let mut entities = HashSet::new();

    for ticker in extract_tickers(&text) {
        entities.insert(Entity::new(EntityKind::Ticker, ticker));
    }
    for country in extract_countries(&text) {
        entities.insert(Entity::new(EntityKind::Country, country));
    }
    entities.insert(Entity::new(EntityKind::Source, item.source_name.clone()));

    entities.into_iter().collect()
}

fn extract_tickers(text: &str) -> Vec<String> {
    let mut found = Vec::new();
    for token in text.split_whitespace() {
        let candidate = token.trim_matches(|c: char| !c.is_alphanumeric() && c != '$');
        let candidate = candidate.strip_prefix('$').unwrap_or(candidate);
        if candidate.is_empty() || candidate.len() > 5 {
            continue;
        }
        if !candidate.chars().all(|c| c.is_ascii_uppercase()) {
            continue;
        }
        if KNOWN_TICKERS.contains(&candidate) {
            found.push(candidate.to_string());
        }
    }
    found
}

fn extract_countries(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut found = Vec::new();
    for (alias, canonical) in COUNTRY_ALIASES {
        if contains_word(&lower, alias) {
            found.push(canonical.to_string());
        }
    }
    found
}

/// Substring match gated on word boundaries, so a short alias like "uk"
/// doesn't fire inside "ukraine". The characters immediately surrounding
/// the match (if any) must be non-alphanumeric.
fn contains_word(haystack: &str, needle: &str) -> bool {
    let mut start = 0;
    while let Some(offset) = haystack[start..].find(needle) {
        let match_start = start + offset;
        let match_end = match_start + needle.len();
        let before_ok = haystack[..match_start].chars().next_back().map(|c| !c.is_alphanumeric()).unwrap_or(true);
        let after_ok = haystack[match_end..].chars().next().map(|c| !c.is_alphanumeric()).unwrap_or(true);
        if before_ok && after_ok {
            return true;
        }
        start = match_start + 1;
    }
    false
}

/// Two items are considered to meaningfully overlap when they share at
/// least `min_shared` entities. Used by clustering to decide membership.
pub fn shared_entity_count(a: &[Entity], b: &[Entity]) -> usize {
    let b_set: HashSet<&Entity> = b.iter().collect();
    a.iter().filter(|e| b_set.contains(e)).count()
}

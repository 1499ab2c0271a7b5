//! Per-session memory store (§4.7): `addMemory`/`getRelevantMemories`,
//! scored by keyword overlap × importance. Structured the way the donor
//! kernel's namespace-keyed `DashMap` store works, generalized from
//! namespace/key records to session-keyed `MemoryEntry` lists with
//! access-count bumping on every retrieval.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use browzer_types::{MemoryEntry, SessionId};

#[derive(Default)]
struct Metrics {
    additions: AtomicU64,
    queries: AtomicU64,
}

#[derive(Default)]
pub struct MemoryStore {
    by_session: DashMap<String, Vec<MemoryEntry>>,
    metrics: Metrics,
}

#[derive(Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct MemoryStoreStats {
    pub additions: u64,
    pub queries: u64,
    pub total_entries: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_memory(&self, session_id: &SessionId, entry: MemoryEntry) {
        self.by_session.entry(session_id.0.clone()).or_default().push(entry);
        self.metrics.additions.fetch_add(1, Ordering::Relaxed);
    }

    /// Scores every entry for `session_id` by `keyword_overlap(query, entry)
    /// * importance`, returns the top `limit`, and bumps `accessCount` /
    /// `lastAccessedAt` on every entry returned.
    pub fn get_relevant_memories(&self, session_id: &SessionId, query: &str, limit: usize) -> Vec<MemoryEntry> {
        self.metrics.queries.fetch_add(1, Ordering::Relaxed);
        let Some(mut entries) = self.by_session.get_mut(&session_id.0) else {
            return Vec::new();
        };

        let query_keywords = keywords(query);
        if query_keywords.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(f32, usize)> = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (overlap_score(&query_keywords, &entry.content) * entry.importance, index))
            .filter(|(score, _)| *score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);

        let mut result = Vec::with_capacity(scored.len());
        for (_, index) in scored {
            entries[index].touch();
            result.push(entries[index].clone());
        }
        result
    }

    pub fn all_for_session(&self, session_id: &SessionId) -> Vec<MemoryEntry> {
        self.by_session.get(&session_id.0).map(|v| v.clone()).unwrap_or_default()
    }

    pub fn stats(&self) -> MemoryStoreStats {
        let total_entries: u64 = self.by_session.iter().map(|e| e.value().len() as u64).sum();
        MemoryStoreStats {
            additions: self.metrics.additions.load(Ordering::Relaxed),
            queries: self.metrics.queries.load(Ordering::Relaxed),
            total_entries,
        }
    }
}

fn keywords(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_ascii_lowercase())
        .filter(|w| w.len() > 2)
        .collect()
}

fn overlap_score(query_keywords: &[String], content: &str) -> f32 {
    let content_keywords = keywords(content);
    if content_keywords.is_empty() {
        return 0.0;
    }
    let matches = query_keywords.iter().filter(|k| content_keywords.contains(k)).count();
    matches as f32 / query_keywords.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use browzer_types::MemoryType;

    #[test]
    fn ranks_by_overlap_times_importance() {
        let store = MemoryStore::new();
        let session = SessionId::new();
        store.add_memory(&session, MemoryEntry::new(MemoryType::Preference, "user prefers dark mode", "user", 0.9));
        store.add_memory(&session, MemoryEntry::new(MemoryType::Fact, "user lives in a house", "user", 0.9));

        let results = store.get_relevant_memories(&session, "dark mode preference", 5);
        assert_eq!(results.len(), 1);
        assert!(results[0].content.contains("dark mode"));
        assert_eq!(results[0].access_count, 1);
    }

    #[test]
    fn unrelated_session_returns_nothing() {
        let store = MemoryStore::new();
        let session = SessionId::new();
        let other = SessionId::new();
        store.add_memory(&session, MemoryEntry::new(MemoryType::Fact, "abc def ghi", "user", 0.5));
        assert!(store.get_relevant_memories(&other, "abc", 5).is_empty());
    }

    #[test]
    fn stats_track_additions_and_queries() {
        let store = MemoryStore::new();
        let session = SessionId::new();
        store.add_memory(&session, MemoryEntry::new(MemoryType::Fact, "hello world", "user", 0.5));
        store.get_relevant_memories(&session, "hello", 5);
        let stats = store.stats();
        assert_eq!(stats.additions, 1);
        assert_eq!(stats.queries, 1);
        assert_eq!(stats.total_entries, 1);
    }
}

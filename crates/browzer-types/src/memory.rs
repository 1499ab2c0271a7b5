//! Memory Entry data model (§3, §4.7).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::MemoryId;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MemoryType {
    Fact,
    Preference,
    Context,
    ToolUsage,
}

/// `{id, type, content, source, importance∈[0,1], timestamp, accessCount,
/// lastAccessedAt}` (§3 `Memory Entry`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub id: MemoryId,
    #[serde(rename = "type")]
    pub memory_type: MemoryType,
    pub content: String,
    pub source: String,
    pub importance: f32,
    pub timestamp: DateTime<Utc>,
    pub access_count: u32,
    pub last_accessed_at: Option<DateTime<Utc>>,
}

impl MemoryEntry {
    pub fn new(memory_type: MemoryType, content: impl Into<String>, source: impl Into<String>, importance: f32) -> Self {
        Self {
            id: MemoryId::new(),
            memory_type,
            content: content.into(),
            source: source.into(),
            importance: importance.clamp(0.0, 1.0),
            timestamp: Utc::now(),
            access_count: 0,
            last_accessed_at: None,
        }
    }

    pub fn touch(&mut self) {
        self.access_count += 1;
        self.last_accessed_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn importance_is_clamped() {
        let entry = MemoryEntry::new(MemoryType::Preference, "likes dark mode", "user", 1.8);
        assert_eq!(entry.importance, 1.0);
    }

    #[test]
    fn touch_bumps_access_count() {
        let mut entry = MemoryEntry::new(MemoryType::Fact, "x", "agent", 0.5);
        assert_eq!(entry.access_count, 0);
        entry.touch();
        assert_eq!(entry.access_count, 1);
        assert!(entry.last_accessed_at.is_some());
    }
}
